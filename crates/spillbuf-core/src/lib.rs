//! spillbuf-core: the wire contract shared by callers and callees.
//!
//! This crate owns the descriptor layout, the return-code table, the scalar
//! marshaling rules, and configuration. It performs no IO; the allocator,
//! raw descriptor access, and the spill manager live in `spillbuf-mem`.

#![forbid(unsafe_code)]

pub mod budget;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod prelude;
pub mod scalar;

pub use descriptor::{Descriptor32, Descriptor64, LengthWord, RawDescriptor, WireDescriptor};
pub use error::{check_code, Error, Result};
