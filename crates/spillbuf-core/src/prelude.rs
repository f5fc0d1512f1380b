//! Convenient re-exports for downstream crates.

pub use crate::budget::{BudgetGuard, MemoryBudget};
pub use crate::config::SpillConfig;
pub use crate::descriptor::{
    Descriptor32, Descriptor64, LengthState, LengthWord, RawDescriptor, WireDescriptor,
    MIN_SPILL_CAPACITY,
};
pub use crate::error::{check_code, Error, Result};
pub use crate::scalar::OverflowPolicy;
