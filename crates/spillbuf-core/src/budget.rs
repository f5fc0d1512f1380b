//! Accounting interface for caller-owned descriptor regions.
//!
//! `spillbuf-mem` provides the atomic implementation; keeping the traits here
//! lets the host crate talk about budgets without the allocator.

/// Proof that a region's bytes have been charged to a budget.
///
/// Dropping the value refunds the charge.
pub trait BudgetGuard: Send {
    /// Bytes this guard holds against its budget.
    fn bytes(&self) -> usize;
    /// Label of the allocation, e.g. `"filter_json.output"`.
    fn tag(&self) -> &'static str {
        "region"
    }
}

/// Upper bound on bytes held across all live descriptor regions.
///
/// A refused charge becomes [`crate::error::Error::AllocFailed`] at the pool.
pub trait MemoryBudget: Send + Sync + 'static {
    type Guard: BudgetGuard;

    /// Charge `bytes` for a region labelled `tag`, or `None` if the cap would be crossed.
    fn try_acquire(&self, bytes: usize, tag: &'static str) -> Option<Self::Guard>;

    fn capacity_bytes(&self) -> usize;

    /// Bytes charged right now. Racy under concurrent allocation.
    fn used_bytes(&self) -> usize;
}
