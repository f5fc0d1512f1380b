//! Typed adapter over a callee library.

use std::sync::Arc;

use serde_json::Value;

use spillbuf_core::config::SpillConfig;
use spillbuf_core::error::{check_code, Error, Result};
use spillbuf_mem::{BufferPool, MemoryBudgetImpl, OwnedBuffer, SpillManager};

use crate::marshal::{self, base64_capacity, output_capacity};
use crate::pending::PendingCall;
use crate::symbols::{BinaryBufferFn, Symbols, UnaryBufferFn};

/// Caller-side handle to the demo surface.
///
/// Cloning is cheap; clones share the buffer budget and spill manager.
#[derive(Clone)]
pub struct DemoLib {
    symbols: Symbols,
    pool: Arc<BufferPool>,
    spill: SpillManager,
}

impl DemoLib {
    /// Bind the in-process implementation, configured from the environment.
    pub fn linked() -> Self {
        Self::new(Symbols::linked(), &SpillConfig::from_env())
    }

    pub fn new(symbols: Symbols, cfg: &SpillConfig) -> Self {
        Self::with_parts(
            symbols,
            BufferPool::new(MemoryBudgetImpl::new(cfg.mem_cap_bytes)),
            SpillManager::from_config(cfg),
        )
    }

    pub fn with_parts(symbols: Symbols, pool: BufferPool, spill: SpillManager) -> Self {
        Self {
            symbols,
            pool: Arc::new(pool),
            spill,
        }
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    pub fn spill_manager(&self) -> &SpillManager {
        &self.spill
    }

    pub fn add_int32(&self, a: &Value, b: &Value) -> Result<i32> {
        let a = marshal::int32_arg("a", a)?;
        let b = marshal::int32_arg("b", b)?;
        Ok((self.symbols.add_int32)(a, b))
    }

    pub fn add_int64(&self, a: &Value, b: &Value) -> Result<i64> {
        let a = marshal::int64_arg("a", a)?;
        let b = marshal::int64_arg("b", b)?;
        Ok((self.symbols.add_int64)(a, b))
    }

    pub fn add_double(&self, a: &Value, b: &Value) -> Result<f64> {
        let a = marshal::double_arg("a", a)?;
        let b = marshal::double_arg("b", b)?;
        Ok((self.symbols.add_double)(a, b))
    }

    pub fn read_counter(&self) -> i32 {
        (self.symbols.read_counter)()
    }

    pub fn increment_counter(&self) -> i32 {
        (self.symbols.increment_counter)()
    }

    /// Start the background counter. `Ok(false)` means it was already running.
    pub fn spawn_thread(&self) -> Result<bool> {
        Ok(check_code((self.symbols.spawn_thread)())? == 1)
    }

    /// Block the current thread inside the callee.
    pub fn sleep(&self, seconds: &Value) -> Result<()> {
        let seconds = marshal::int32_arg("seconds", seconds)?;
        check_code((self.symbols.sleep_test)(seconds))?;
        Ok(())
    }

    /// Run the blocking sleep on a worker thread and resolve when it returns.
    ///
    /// Must be called from within a tokio runtime. The argument is validated
    /// before anything is dispatched.
    pub fn sleep_async(&self, seconds: &Value) -> Result<PendingCall<()>> {
        let seconds = marshal::int32_arg("seconds", seconds)?;
        let sleep_test = self.symbols.sleep_test;
        PendingCall::spawn("sleep_test", move || {
            check_code(sleep_test(seconds))?;
            Ok(())
        })
    }

    pub fn to_upper(&self, text: &str) -> Result<String> {
        let bytes = self.call_unary(
            "to_upper",
            self.symbols.to_upper,
            text.as_bytes(),
            output_capacity(text.len()),
        )?;
        String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
    }

    /// Drop top-level keys of `value` whose value is the string `disallowed`.
    pub fn filter_json(&self, value: &Value, disallowed: &str) -> Result<Value> {
        if !value.is_object() {
            return Err(Error::InvalidArgument(format!(
                "filter_json: expected a JSON object, found {value}"
            )));
        }
        let input = serde_json::to_vec(value).map_err(|e| Error::JsonEncode(e.to_string()))?;
        let cap = output_capacity(input.len());
        let input: OwnedBuffer = self.pool.alloc_with(&input, "filter_json.input")?;
        let disallowed: OwnedBuffer =
            self.pool.alloc_with(disallowed.as_bytes(), "filter_json.disallowed")?;
        let mut output: OwnedBuffer = self.pool.alloc(cap, "filter_json.output")?;

        let f: BinaryBufferFn = self.symbols.filter_json;
        // SAFETY: all three descriptors are live and distinct for the call.
        let code = unsafe { f(input.as_ptr(), disallowed.as_ptr(), output.as_mut_ptr()) };
        self.finish("filter_json", code, &output)?;
        output.read_json(&self.spill)
    }

    pub fn base64_encode(&self, text: &str) -> Result<String> {
        let bytes = self.call_unary(
            "base64_encode",
            self.symbols.base64_encode,
            text.as_bytes(),
            base64_capacity(text.len()),
        )?;
        String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
    }

    fn call_unary(
        &self,
        op: &'static str,
        f: UnaryBufferFn,
        input: &[u8],
        out_capacity: usize,
    ) -> Result<Vec<u8>> {
        let input: OwnedBuffer = self.pool.alloc_with(input, "input")?;
        let mut output: OwnedBuffer = self.pool.alloc(out_capacity, "output")?;
        // SAFETY: both descriptors are live and distinct for the call.
        let code = unsafe { f(input.as_ptr(), output.as_mut_ptr()) };
        self.finish(op, code, &output)?;
        output.read_bytes(&self.spill)
    }

    fn finish(&self, op: &'static str, code: i32, output: &OwnedBuffer) -> Result<()> {
        match check_code(code) {
            Ok(_) => {
                if output.is_spilled() {
                    tracing::debug!(op, "result spilled, recovering from file");
                }
                Ok(())
            }
            Err(e) => {
                tracing::debug!(op, code, error = %e, "callee returned an error");
                Err(e)
            }
        }
    }
}
