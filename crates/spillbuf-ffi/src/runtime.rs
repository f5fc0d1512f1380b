//! Process-wide state behind the exported functions.

use std::panic::{self, AssertUnwindSafe};

use once_cell::sync::Lazy;

use spillbuf_core::config::SpillConfig;
use spillbuf_core::error::{Result, ERR_COMPUTATION_FAILED};
use spillbuf_mem::SpillManager;

/// Configuration read once from the environment on first use.
pub static CONFIG: Lazy<SpillConfig> = Lazy::new(SpillConfig::from_env);

/// Spill manager used by every exported function.
pub static SPILL: Lazy<SpillManager> = Lazy::new(|| SpillManager::from_config(&CONFIG));

/// Run one boundary call, collapsing errors and panics into a return code.
pub(crate) fn boundary(op: &'static str, f: impl FnOnce() -> Result<i32>) -> i32 {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(code)) => code,
        Ok(Err(e)) => {
            tracing::warn!(op, code = e.code(), error = %e, "boundary call failed");
            e.code()
        }
        Err(_) => {
            tracing::error!(op, "panic caught at boundary");
            ERR_COMPUTATION_FAILED
        }
    }
}
