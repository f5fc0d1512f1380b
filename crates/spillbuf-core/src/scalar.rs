//! Scalar marshaling rules.
//!
//! Scalars cross the boundary by value. A floating-point value supplied for
//! an integer parameter is truncated toward zero, never rounded: `2.9 -> 2`,
//! `-2.9 -> -2`. NaN becomes 0 and values outside the target range saturate
//! to its bounds.
//!
//! Overflow of the operation itself is declared per function with
//! [`OverflowPolicy`].

use serde::{Deserialize, Serialize};

/// How a scalar-returning function treats results outside its type's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Two's-complement wrap-around.
    Wrap,
    /// Clamp to the type's minimum or maximum.
    Saturate,
    /// Return a documented sentinel value.
    Sentinel,
    /// IEEE-754 semantics (infinities, NaN).
    Ieee754,
}

/// Truncate toward zero into an `i32`.
pub fn truncate_i32(v: f64) -> i32 {
    v.trunc() as i32
}

/// Truncate toward zero into an `i64`.
pub fn truncate_i64(v: f64) -> i64 {
    v.trunc() as i64
}

/// Apply a policy to a 32-bit addition.
pub fn add_i32(a: i32, b: i32, policy: OverflowPolicy) -> i32 {
    match policy {
        OverflowPolicy::Wrap | OverflowPolicy::Ieee754 => a.wrapping_add(b),
        OverflowPolicy::Saturate => a.saturating_add(b),
        OverflowPolicy::Sentinel => a.checked_add(b).unwrap_or(i32::MIN),
    }
}

/// Apply a policy to a 64-bit addition.
pub fn add_i64(a: i64, b: i64, policy: OverflowPolicy) -> i64 {
    match policy {
        OverflowPolicy::Wrap | OverflowPolicy::Ieee754 => a.wrapping_add(b),
        OverflowPolicy::Saturate => a.saturating_add(b),
        OverflowPolicy::Sentinel => a.checked_add(b).unwrap_or(i64::MIN),
    }
}
