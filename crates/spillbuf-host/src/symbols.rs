//! Function table of a callee library.

use spillbuf_core::descriptor::WireDescriptor;
use spillbuf_ffi::exports;

/// `fn(input, output) -> code`
pub type UnaryBufferFn = unsafe extern "C" fn(*const WireDescriptor, *mut WireDescriptor) -> i32;

/// `fn(input, argument, output) -> code`
pub type BinaryBufferFn = unsafe extern "C" fn(
    *const WireDescriptor,
    *const WireDescriptor,
    *mut WireDescriptor,
) -> i32;

/// Entry points of a library implementing the demo surface.
///
/// Every pointer follows the `extern "C"` contract documented in
/// `spillbuf_ffi::exports`.
#[derive(Clone, Copy, Debug)]
pub struct Symbols {
    pub add_int32: extern "C" fn(i32, i32) -> i32,
    pub add_int64: extern "C" fn(i64, i64) -> i64,
    pub add_double: extern "C" fn(f64, f64) -> f64,
    pub sleep_test: extern "C" fn(i32) -> i32,
    pub read_counter: extern "C" fn() -> i32,
    pub increment_counter: extern "C" fn() -> i32,
    pub spawn_thread: extern "C" fn() -> i32,
    pub to_upper: UnaryBufferFn,
    pub filter_json: BinaryBufferFn,
    pub base64_encode: UnaryBufferFn,
    pub release_spill: unsafe extern "C" fn(*mut WireDescriptor) -> i32,
}

impl Symbols {
    /// The implementation statically linked into this process.
    pub fn linked() -> Self {
        Self {
            add_int32: exports::add_int32,
            add_int64: exports::add_int64,
            add_double: exports::add_double,
            sleep_test: exports::sleep_test,
            read_counter: exports::read_counter,
            increment_counter: exports::increment_counter,
            spawn_thread: exports::spawn_thread,
            to_upper: exports::to_upper,
            filter_json: exports::filter_json,
            base64_encode: exports::base64_encode,
            release_spill: exports::spillbuf_release_spill,
        }
    }
}
