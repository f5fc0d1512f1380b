//! Atomic region budget and the guard each [`crate::OwnedBuffer`] carries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use spillbuf_core::budget::{BudgetGuard, MemoryBudget};

#[derive(Debug)]
struct Ledger {
    cap: usize,
    charged: AtomicUsize,
}

impl Ledger {
    fn charge(&self, bytes: usize) -> bool {
        self.charged
            .fetch_update(Ordering::AcqRel, Ordering::Relaxed, |cur| {
                cur.checked_add(bytes).filter(|next| *next <= self.cap)
            })
            .is_ok()
    }

    fn refund(&self, bytes: usize) {
        self.charged.fetch_sub(bytes, Ordering::AcqRel);
    }
}

/// Cap shared by every buffer a [`crate::BufferPool`] hands out. Clones
/// share one ledger.
#[derive(Clone)]
pub struct MemoryBudgetImpl {
    ledger: Arc<Ledger>,
}

impl MemoryBudgetImpl {
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            ledger: Arc::new(Ledger {
                cap: capacity_bytes,
                charged: AtomicUsize::new(0),
            }),
        }
    }

    /// No cap beyond what the allocator itself refuses.
    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }
}

/// Charge held for one region; refunded when the buffer is dropped.
#[derive(Debug)]
pub struct BudgetGuardImpl {
    ledger: Arc<Ledger>,
    bytes: usize,
    tag: &'static str,
}

impl Drop for BudgetGuardImpl {
    fn drop(&mut self) {
        if self.bytes > 0 {
            self.ledger.refund(std::mem::take(&mut self.bytes));
        }
    }
}

impl BudgetGuard for BudgetGuardImpl {
    fn bytes(&self) -> usize {
        self.bytes
    }
    fn tag(&self) -> &'static str {
        self.tag
    }
}

impl MemoryBudget for MemoryBudgetImpl {
    type Guard = BudgetGuardImpl;

    fn try_acquire(&self, bytes: usize, tag: &'static str) -> Option<Self::Guard> {
        // Zero-capacity regions are free and always granted.
        if bytes > 0 && !self.ledger.charge(bytes) {
            return None;
        }
        Some(BudgetGuardImpl {
            ledger: Arc::clone(&self.ledger),
            bytes,
            tag,
        })
    }

    fn capacity_bytes(&self) -> usize {
        self.ledger.cap
    }

    fn used_bytes(&self) -> usize {
        self.ledger.charged.load(Ordering::Relaxed)
    }
}
