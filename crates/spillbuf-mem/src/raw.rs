//! Callee-side access to descriptors received through a pointer.
//!
//! Readers copy the payload into Rust-owned memory; a spilled input is read
//! from its file and left in place (it still belongs to the caller).
//! Writers never write past `capacity`: a payload that does not fit is
//! spilled and the region receives the spill path instead.
//!
//! ## Safety
//!
//! Every function here requires that a non-null descriptor pointer refers to
//! a live, properly aligned `RawDescriptor<L>` whose `data` points to at
//! least `capacity` bytes that stay valid (and, for writers, writable and
//! unaliased) for the duration of the call.

use std::ptr;
use std::slice;

use serde::de::DeserializeOwned;
use serde::Serialize;

use spillbuf_core::descriptor::{LengthState, LengthWord, RawDescriptor};
use spillbuf_core::error::{Error, Result};

use crate::spill::SpillManager;

/// Outcome of writing a payload into a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Written {
    /// Payload stored in the caller's region.
    Inline(usize),
    /// Payload stored in a spill file whose path now occupies the region.
    Spilled { path_len: usize, payload_len: usize },
}

/// Copy the payload a descriptor refers to into a `Vec<u8>`.
///
/// # Safety
/// See the module-level safety section.
pub unsafe fn descriptor_to_bytes<L: LengthWord>(
    desc: *const RawDescriptor<L>,
    spill: &SpillManager,
) -> Result<Vec<u8>> {
    // SAFETY: caller guarantees a live descriptor when non-null.
    let desc = unsafe { desc.as_ref() }.ok_or(Error::NullPointer)?;
    match desc.state()? {
        LengthState::Inline(len) => {
            // SAFETY: state() checked len <= capacity and data non-null for capacity > 0.
            Ok(unsafe { region(desc, len) }.to_vec())
        }
        LengthState::Spilled { path_len } => {
            // SAFETY: as above, path_len <= capacity.
            let path = std::str::from_utf8(unsafe { region(desc, path_len) })
                .map_err(|_| Error::InvalidUtf8)?;
            spill.read_path(path)
        }
    }
}

/// Decode a descriptor's payload as UTF-8.
///
/// # Safety
/// See the module-level safety section.
pub unsafe fn descriptor_to_string<L: LengthWord>(
    desc: *const RawDescriptor<L>,
    spill: &SpillManager,
) -> Result<String> {
    // SAFETY: forwarded contract.
    let bytes = unsafe { descriptor_to_bytes(desc, spill) }?;
    String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
}

/// Decode a descriptor's payload as JSON.
///
/// # Safety
/// See the module-level safety section.
pub unsafe fn descriptor_to_json<L: LengthWord, T: DeserializeOwned>(
    desc: *const RawDescriptor<L>,
    spill: &SpillManager,
) -> Result<T> {
    // SAFETY: forwarded contract.
    let text = unsafe { descriptor_to_string(desc, spill) }?;
    serde_json::from_str(&text).map_err(|e| Error::JsonDecode(e.to_string()))
}

/// Store `bytes` in the descriptor, spilling when they exceed its capacity.
///
/// On error the descriptor's length is left untouched.
///
/// # Safety
/// See the module-level safety section.
pub unsafe fn bytes_to_descriptor<L: LengthWord>(
    bytes: &[u8],
    desc: *mut RawDescriptor<L>,
    spill: &SpillManager,
) -> Result<Written> {
    // SAFETY: caller guarantees a live, unaliased descriptor when non-null.
    let desc = unsafe { desc.as_mut() }.ok_or(Error::NullPointer)?;
    let cap = desc.capacity_bytes()?;

    if bytes.len() <= cap {
        let len = L::from_len(bytes.len()).ok_or(Error::BufferTooLarge {
            length: bytes.len() as i64,
            limit: L::max_len() as i64,
        })?;
        // SAFETY: bytes.len() <= capacity and data is valid for capacity bytes.
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), desc.data, bytes.len()) };
        desc.length = len;
        return Ok(Written::Inline(bytes.len()));
    }

    let handle = spill.spill(bytes)?;
    let path_len = handle.path().len();
    if path_len > cap {
        // The handle deletes the file when it drops here.
        return Err(Error::BufferTooSmall(format!(
            "spill path of {path_len} bytes does not fit capacity {cap}"
        )));
    }
    let marker = L::spill_marker(path_len).ok_or(Error::BufferTooLarge {
        length: path_len as i64,
        limit: L::max_len() as i64,
    })?;

    let path = handle.into_path();
    // SAFETY: path_len <= capacity.
    unsafe { ptr::copy_nonoverlapping(path.as_ptr(), desc.data, path_len) };
    desc.length = marker;
    Ok(Written::Spilled {
        path_len,
        payload_len: bytes.len(),
    })
}

/// Store a string in the descriptor.
///
/// # Safety
/// See the module-level safety section.
pub unsafe fn str_to_descriptor<L: LengthWord>(
    text: &str,
    desc: *mut RawDescriptor<L>,
    spill: &SpillManager,
) -> Result<Written> {
    // SAFETY: forwarded contract.
    unsafe { bytes_to_descriptor(text.as_bytes(), desc, spill) }
}

/// Serialize a value to compact JSON and store it in the descriptor.
///
/// # Safety
/// See the module-level safety section.
pub unsafe fn json_to_descriptor<L: LengthWord, T: Serialize + ?Sized>(
    value: &T,
    desc: *mut RawDescriptor<L>,
    spill: &SpillManager,
) -> Result<Written> {
    let bytes = serde_json::to_vec(value).map_err(|e| Error::JsonEncode(e.to_string()))?;
    // SAFETY: forwarded contract.
    unsafe { bytes_to_descriptor(&bytes, desc, spill) }
}

/// Delete the spill a descriptor refers to and reset its length.
///
/// Returns `false` when the descriptor was not spilled.
///
/// # Safety
/// See the module-level safety section.
pub unsafe fn release_spill<L: LengthWord>(
    desc: *mut RawDescriptor<L>,
    spill: &SpillManager,
) -> Result<bool> {
    // SAFETY: caller guarantees a live, unaliased descriptor when non-null.
    let desc = unsafe { desc.as_mut() }.ok_or(Error::NullPointer)?;
    match desc.state()? {
        LengthState::Inline(_) => Ok(false),
        LengthState::Spilled { path_len } => {
            // SAFETY: path_len <= capacity.
            let path = std::str::from_utf8(unsafe { region(desc, path_len) })
                .map_err(|_| Error::InvalidUtf8)?
                .to_string();
            spill.claim(path).release()?;
            desc.length = L::ZERO;
            Ok(true)
        }
    }
}

/// # Safety
/// `len <= capacity` and the descriptor passed `capacity_bytes()`.
unsafe fn region<L: LengthWord>(desc: &RawDescriptor<L>, len: usize) -> &[u8] {
    if len == 0 {
        return &[];
    }
    // SAFETY: per function contract.
    unsafe { slice::from_raw_parts(desc.data as *const u8, len) }
}
