//! Argument validation and output sizing.
//!
//! Arguments arrive as JSON values. Numbers must be JSON numbers; anything
//! else is rejected before the callee is invoked. Integral targets accept
//! fractional input by truncating toward zero, but a value that does not fit
//! the target width is an error rather than a silent saturation.

use serde_json::Value;

use spillbuf_core::descriptor::MIN_SPILL_CAPACITY;
use spillbuf_core::error::{Error, Result};
use spillbuf_core::scalar::{truncate_i32, truncate_i64};

pub fn int32_arg(name: &str, v: &Value) -> Result<i32> {
    if let Some(i) = v.as_i64() {
        return i32::try_from(i)
            .map_err(|_| Error::InvalidArgument(format!("{name}: {i} out of range for int32")));
    }
    let f = finite_arg(name, v)?;
    if f.trunc() < i32::MIN as f64 || f.trunc() > i32::MAX as f64 {
        return Err(Error::InvalidArgument(format!(
            "{name}: {f} out of range for int32"
        )));
    }
    Ok(truncate_i32(f))
}

pub fn int64_arg(name: &str, v: &Value) -> Result<i64> {
    if let Some(i) = v.as_i64() {
        return Ok(i);
    }
    if v.is_u64() {
        return Err(Error::InvalidArgument(format!(
            "{name}: {v} out of range for int64"
        )));
    }
    let f = finite_arg(name, v)?;
    // 2^63 is exactly representable; anything at or above it does not fit.
    if f.trunc() < i64::MIN as f64 || f.trunc() >= i64::MAX as f64 {
        return Err(Error::InvalidArgument(format!(
            "{name}: {f} out of range for int64"
        )));
    }
    Ok(truncate_i64(f))
}

pub fn double_arg(name: &str, v: &Value) -> Result<f64> {
    v.as_f64()
        .ok_or_else(|| Error::InvalidArgument(format!("{name}: expected a number, found {v}")))
}

fn finite_arg(name: &str, v: &Value) -> Result<f64> {
    let f = double_arg(name, v)?;
    if !f.is_finite() {
        return Err(Error::InvalidArgument(format!("{name}: {f} is not finite")));
    }
    Ok(f)
}

/// Output capacity for a result expected to be about as long as its input.
///
/// Never below [`MIN_SPILL_CAPACITY`], so a spill path always fits.
pub fn output_capacity(input_len: usize) -> usize {
    input_len.max(MIN_SPILL_CAPACITY)
}

/// Output capacity for padded base64 of `input_len` bytes.
pub fn base64_capacity(input_len: usize) -> usize {
    output_capacity(input_len.div_ceil(3).saturating_mul(4))
}
