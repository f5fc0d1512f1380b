#![deny(unsafe_op_in_unsafe_fn)]
//! spillbuf-host: the calling side of the buffer protocol.
//!
//! [`DemoLib`] validates dynamically typed arguments, sizes and allocates the
//! descriptors, invokes the callee, maps negative return codes to errors, and
//! transparently recovers spilled results. Long-running calls can be moved
//! off the current task with [`DemoLib::sleep_async`].

pub mod client;
pub mod marshal;
pub mod pending;
pub mod symbols;

pub use client::DemoLib;
pub use pending::PendingCall;
pub use symbols::Symbols;
