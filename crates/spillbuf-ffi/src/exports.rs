//! C-compatible API.
//!
//! Descriptor arguments are `*const/*mut WireDescriptor` (64-bit length
//! words). Every pointer must either be null (rejected with `ERR_NULL_PTR`)
//! or refer to a live descriptor whose region holds `capacity` bytes.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use once_cell::sync::{Lazy, OnceCell};

use serde_json::Value;

use spillbuf_core::descriptor::WireDescriptor;
use spillbuf_core::error::{Error, Result, ERR_INVALID_ARGUMENT, ERR_NONE};
use spillbuf_core::scalar::{self, OverflowPolicy};
use spillbuf_mem::{raw, SpillManager};

use crate::counter::{SharedCounter, Ticker};
use crate::demo;
use crate::runtime::{boundary, CONFIG, SPILL};

static COUNTER: Lazy<Arc<SharedCounter>> = Lazy::new(|| Arc::new(SharedCounter::new()));
static TICKER: OnceCell<Ticker> = OnceCell::new();

/// Overflow policy of [`add_int32`] and [`add_int64`].
pub const ADD_INT_POLICY: OverflowPolicy = OverflowPolicy::Wrap;

/// 32-bit addition. Overflow wraps (two's complement).
#[no_mangle]
pub extern "C" fn add_int32(a: i32, b: i32) -> i32 {
    scalar::add_i32(a, b, ADD_INT_POLICY)
}

/// 64-bit addition. Overflow wraps (two's complement).
#[no_mangle]
pub extern "C" fn add_int64(a: i64, b: i64) -> i64 {
    scalar::add_i64(a, b, ADD_INT_POLICY)
}

/// IEEE-754 double addition; overflow yields an infinity.
#[no_mangle]
pub extern "C" fn add_double(a: f64, b: f64) -> f64 {
    a + b
}

/// Block the calling thread for `seconds`. Returns 0, or
/// `ERR_INVALID_ARGUMENT` for a negative duration.
///
/// Meant to be driven from a caller-side worker thread, not a UI/main loop.
#[no_mangle]
pub extern "C" fn sleep_test(seconds: i32) -> i32 {
    if seconds < 0 {
        return ERR_INVALID_ARGUMENT;
    }
    tracing::debug!(seconds, "sleep_test start");
    thread::sleep(Duration::from_secs(seconds as u64));
    ERR_NONE
}

/// Current value of the shared counter.
#[no_mangle]
pub extern "C" fn read_counter() -> i32 {
    COUNTER.get()
}

/// Increment the shared counter and return the new value (wraps at `i32::MAX`).
#[no_mangle]
pub extern "C" fn increment_counter() -> i32 {
    COUNTER.increment()
}

/// Start the background worker that increments the shared counter.
///
/// Returns 1 when the worker was started by this call, 0 if it was already
/// running, and `ERR_COMPUTATION_FAILED` if the thread could not be spawned.
#[no_mangle]
pub extern "C" fn spawn_thread() -> i32 {
    boundary("spawn_thread", || {
        let mut started = false;
        TICKER.get_or_try_init(|| {
            started = true;
            let interval = Duration::from_millis(CONFIG.ticker_interval_ms);
            Ticker::start(Arc::clone(&COUNTER), interval)
                .map_err(|e| Error::Computation(format!("spawn ticker: {e}")))
        })?;
        Ok(i32::from(started))
    })
}

/// Upper-case the UTF-8 string in `input` into `output`.
///
/// # Safety
/// Both pointers must be null or refer to live descriptors; `output` must
/// not alias `input`.
#[no_mangle]
pub unsafe extern "C" fn to_upper(
    input: *const WireDescriptor,
    output: *mut WireDescriptor,
) -> i32 {
    // SAFETY: forwarded contract.
    boundary("to_upper", || unsafe { to_upper_with(input, output, &SPILL) })
}

/// Remove top-level keys of the JSON object in `input` whose value equals the
/// string in `disallowed`, writing the result to `output`.
///
/// # Safety
/// All pointers must be null or refer to live descriptors; `output` must not
/// alias the inputs.
#[no_mangle]
pub unsafe extern "C" fn filter_json(
    input: *const WireDescriptor,
    disallowed: *const WireDescriptor,
    output: *mut WireDescriptor,
) -> i32 {
    boundary("filter_json", || {
        // SAFETY: forwarded contract.
        unsafe { filter_json_with(input, disallowed, output, &SPILL) }
    })
}

/// Base64-encode (standard alphabet, padded) the bytes in `input`.
///
/// # Safety
/// Both pointers must be null or refer to live descriptors; `output` must
/// not alias `input`.
#[no_mangle]
pub unsafe extern "C" fn base64_encode(
    input: *const WireDescriptor,
    output: *mut WireDescriptor,
) -> i32 {
    // SAFETY: forwarded contract.
    boundary("base64_encode", || unsafe {
        base64_encode_with(input, output, &SPILL)
    })
}

/// Delete the spill file a descriptor refers to and reset its length to 0.
///
/// Returns 1 if a spill was released, 0 if the descriptor held inline data.
///
/// # Safety
/// `desc` must be null or refer to a live descriptor.
#[no_mangle]
pub unsafe extern "C" fn spillbuf_release_spill(desc: *mut WireDescriptor) -> i32 {
    boundary("release_spill", || {
        // SAFETY: forwarded contract.
        let released = unsafe { raw::release_spill(desc, &SPILL) }?;
        Ok(i32::from(released))
    })
}

/// Minimum output capacity that can carry a spill path.
#[no_mangle]
pub extern "C" fn spillbuf_min_spill_capacity() -> i64 {
    spillbuf_core::descriptor::MIN_SPILL_CAPACITY as i64
}

/// # Safety
/// See [`to_upper`].
pub unsafe fn to_upper_with(
    input: *const WireDescriptor,
    output: *mut WireDescriptor,
    spill: &SpillManager,
) -> Result<i32> {
    // SAFETY: forwarded contract.
    let text = unsafe { raw::descriptor_to_string(input, spill) }?;
    let upper = demo::to_upper(&text);
    // SAFETY: forwarded contract.
    unsafe { raw::str_to_descriptor(&upper, output, spill) }?;
    Ok(ERR_NONE)
}

/// # Safety
/// See [`filter_json`].
pub unsafe fn filter_json_with(
    input: *const WireDescriptor,
    disallowed: *const WireDescriptor,
    output: *mut WireDescriptor,
    spill: &SpillManager,
) -> Result<i32> {
    // SAFETY: forwarded contract.
    let value: Value = unsafe { raw::descriptor_to_json(input, spill) }?;
    // SAFETY: forwarded contract.
    let disallowed = unsafe { raw::descriptor_to_string(disallowed, spill) }?;
    let filtered = demo::filter_json(value, &disallowed)?;
    // SAFETY: forwarded contract.
    unsafe { raw::json_to_descriptor(&filtered, output, spill) }?;
    Ok(ERR_NONE)
}

/// # Safety
/// See [`base64_encode`].
pub unsafe fn base64_encode_with(
    input: *const WireDescriptor,
    output: *mut WireDescriptor,
    spill: &SpillManager,
) -> Result<i32> {
    // SAFETY: forwarded contract.
    let bytes = unsafe { raw::descriptor_to_bytes(input, spill) }?;
    let encoded = demo::base64_encode(&bytes);
    // SAFETY: forwarded contract.
    unsafe { raw::str_to_descriptor(&encoded, output, spill) }?;
    Ok(ERR_NONE)
}
