//! spillbuf: length-delimited FFI buffers with transparent temp-file spill.
//!
//! Re-exports the workspace crates under one name:
//! - descriptor layout, return codes, scalar rules and configuration
//!   (`spillbuf-core`)
//! - caller-side allocation and the spill manager (`spillbuf-mem`)
//! - the `extern "C"` surface (`spillbuf-ffi`)
//! - the typed caller adapter (`spillbuf-host`)

pub use spillbuf_core::{budget, config, descriptor, error, prelude, scalar};
pub use spillbuf_core::{check_code, Error, Result};

pub use spillbuf_mem::{raw, BufferPool, MemoryBudgetImpl, OwnedBuffer, Payload, SpillHandle};
pub use spillbuf_mem::{SpillManager, SpillStorage, SpillTracker, TempFileStorage, Written};

pub use spillbuf_ffi as ffi;

pub use spillbuf_host::{DemoLib, PendingCall, Symbols};
