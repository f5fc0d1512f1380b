#![deny(unsafe_op_in_unsafe_fn)]
//! spillbuf-ffi: the `extern "C"` boundary.
//!
//! Buffer-taking functions return `0` on success and a negative code from
//! `spillbuf_core::error` on failure. Scalar functions return their value
//! directly and document their own overflow policy.
//!
//! Ownership: every descriptor belongs to the caller. When an output spills,
//! the spill file also belongs to the caller once the call returns; it can be
//! released with [`exports::spillbuf_release_spill`].

pub mod counter;
pub mod demo;
pub mod exports;
pub mod runtime;

pub use counter::{SharedCounter, Ticker};
