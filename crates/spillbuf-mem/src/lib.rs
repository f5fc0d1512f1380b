#![deny(unsafe_op_in_unsafe_fn)]
//! spillbuf-mem: descriptor buffers, raw descriptor access, and the spill manager.
//!
//! Caller side: [`BufferPool`] hands out [`OwnedBuffer`]s whose bytes are
//! accounted against a hard [`MemoryBudgetImpl`]. Callee side: [`raw`] reads
//! and writes descriptors received through a pointer and spills oversized
//! results through a [`SpillManager`].

pub mod guard;
pub mod pool;
pub mod raw;
pub mod spill;
pub mod tracking;

pub use guard::{BudgetGuardImpl, MemoryBudgetImpl};
pub use pool::{BufferPool, OwnedBuffer, Payload};
pub use raw::Written;
pub use spill::{SpillHandle, SpillManager, SpillStorage, TempFileStorage};
pub use tracking::SpillTracker;
