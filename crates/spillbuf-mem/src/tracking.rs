//! Lightweight spill accounting.
//!
//! Counts are per manager. A spill created by one manager and released by
//! another shows up as created on the first and released on the second.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default, Debug)]
pub struct SpillTracker {
    created: AtomicU64,
    released: AtomicU64,
    bytes_spilled: AtomicU64,
}

impl SpillTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&self, bytes: usize) {
        self.created.fetch_add(1, Ordering::AcqRel);
        self.bytes_spilled
            .fetch_add(bytes as u64, Ordering::Relaxed);
        #[cfg(feature = "tracing")]
        tracing::trace!(
            bytes,
            created = self.created.load(Ordering::Relaxed),
            "spill created"
        );
    }

    pub fn record_released(&self) {
        self.released.fetch_add(1, Ordering::AcqRel);
    }

    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Acquire)
    }

    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Acquire)
    }

    pub fn bytes_spilled(&self) -> u64 {
        self.bytes_spilled.load(Ordering::Relaxed)
    }
}
