//! Buffer descriptor layout.
//!
//! A descriptor travels across the boundary by reference:
//! [ capacity: L ][ length: L ][ data: *mut u8 ]
//!
//! `L` is the signed length word (`i32` or `i64`). The length field encodes:
//! - `0..=capacity`: `length` bytes of inline payload at `data`;
//! - `< 0`: spilled; `data` holds the UTF-8 spill path, `-length` bytes long.
//!
//! `capacity` is written once by the allocating side and never again.
//! Errors are not stored in the descriptor; they travel as return codes.

use std::fmt;
use std::ptr;

use crate::error::{Error, Result};

/// Smallest capacity that can carry a spill path on common platforms.
///
/// Outputs that may spill should be sized at least this large.
pub const MIN_SPILL_CAPACITY: usize = 256;

/// Signed fixed-width integer usable as a descriptor length word.
pub trait LengthWord: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    const BITS: u32;
    const ZERO: Self;

    fn to_i64(self) -> i64;

    /// Convert a non-negative byte count, if representable.
    fn from_len(len: usize) -> Option<Self>;

    /// Largest byte count a descriptor with this word can describe.
    fn max_len() -> usize;

    /// Encode "spilled, path is `path_len` bytes".
    fn spill_marker(path_len: usize) -> Option<Self> {
        let len = i64::try_from(path_len).ok()?;
        Self::from_i64(-len)
    }

    fn from_i64(v: i64) -> Option<Self>;
}

impl LengthWord for i32 {
    const BITS: u32 = 32;
    const ZERO: Self = 0;

    fn to_i64(self) -> i64 {
        self as i64
    }

    fn from_len(len: usize) -> Option<Self> {
        i32::try_from(len).ok()
    }

    fn max_len() -> usize {
        i32::MAX as usize
    }

    fn from_i64(v: i64) -> Option<Self> {
        i32::try_from(v).ok()
    }
}

impl LengthWord for i64 {
    const BITS: u32 = 64;
    const ZERO: Self = 0;

    fn to_i64(self) -> i64 {
        self
    }

    fn from_len(len: usize) -> Option<Self> {
        i64::try_from(len).ok()
    }

    fn max_len() -> usize {
        usize::try_from(i64::MAX).unwrap_or(usize::MAX)
    }

    fn from_i64(v: i64) -> Option<Self> {
        Some(v)
    }
}

/// Fixed-size record describing a caller-owned region.
#[repr(C)]
#[derive(Debug)]
pub struct RawDescriptor<L: LengthWord> {
    pub capacity: L,
    pub length: L,
    pub data: *mut u8,
}

pub type Descriptor32 = RawDescriptor<i32>;
pub type Descriptor64 = RawDescriptor<i64>;

/// Descriptor width used by the exported boundary.
pub type WireDescriptor = Descriptor64;

/// Decoded meaning of a descriptor's length field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthState {
    /// `len` bytes of payload live in the region.
    Inline(usize),
    /// The region holds a spill path of `path_len` bytes.
    Spilled { path_len: usize },
}

impl<L: LengthWord> RawDescriptor<L> {
    /// Descriptor over `data` with `length = 0`.
    pub fn new(capacity: L, data: *mut u8) -> Self {
        Self {
            capacity,
            length: L::ZERO,
            data,
        }
    }

    /// Descriptor with no region; only valid with zero capacity.
    pub fn empty() -> Self {
        Self::new(L::ZERO, ptr::null_mut())
    }

    /// Validated capacity in bytes.
    pub fn capacity_bytes(&self) -> Result<usize> {
        let cap = self.capacity.to_i64();
        if cap < 0 {
            return Err(Error::BufferTooSmall(format!("negative capacity {cap}")));
        }
        let cap = usize::try_from(cap).map_err(|_| Error::BufferTooLarge {
            length: cap,
            limit: L::max_len() as i64,
        })?;
        if cap > 0 && self.data.is_null() {
            return Err(Error::NullPointer);
        }
        Ok(cap)
    }

    /// Decode and validate the length field against the capacity.
    pub fn state(&self) -> Result<LengthState> {
        let cap = self.capacity_bytes()?;
        let len = self.length.to_i64();
        if len >= 0 {
            let len = len as u64;
            if len > cap as u64 {
                return Err(Error::BufferTooLarge {
                    length: len as i64,
                    limit: cap as i64,
                });
            }
            Ok(LengthState::Inline(len as usize))
        } else {
            let path_len = len.unsigned_abs();
            if path_len > cap as u64 {
                return Err(Error::BufferTooLarge {
                    length: len,
                    limit: cap as i64,
                });
            }
            Ok(LengthState::Spilled {
                path_len: path_len as usize,
            })
        }
    }

    pub fn is_spilled(&self) -> bool {
        self.length.to_i64() < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, offset_of, size_of};

    #[test]
    fn layout_is_capacity_length_pointer() {
        assert_eq!(offset_of!(Descriptor64, capacity), 0);
        assert_eq!(offset_of!(Descriptor64, length), 8);
        assert_eq!(offset_of!(Descriptor64, data), 16);
        assert_eq!(size_of::<Descriptor64>(), 16 + size_of::<*mut u8>());

        assert_eq!(offset_of!(Descriptor32, capacity), 0);
        assert_eq!(offset_of!(Descriptor32, length), 4);
        assert_eq!(offset_of!(Descriptor32, data), 8);
        assert_eq!(align_of::<Descriptor32>(), align_of::<*mut u8>().max(4));
    }

    #[test]
    fn inline_and_spilled_states() {
        let mut region = [0u8; 16];
        let mut d = Descriptor32::new(16, region.as_mut_ptr());
        assert_eq!(d.state().unwrap(), LengthState::Inline(0));

        d.length = 16;
        assert_eq!(d.state().unwrap(), LengthState::Inline(16));

        d.length = i32::spill_marker(10).unwrap();
        assert!(d.is_spilled());
        assert_eq!(d.state().unwrap(), LengthState::Spilled { path_len: 10 });
    }

    #[test]
    fn length_past_capacity_is_rejected() {
        let mut region = [0u8; 4];
        let mut d = Descriptor64::new(4, region.as_mut_ptr());
        d.length = 5;
        assert!(matches!(d.state(), Err(Error::BufferTooLarge { .. })));
        d.length = -5;
        assert!(matches!(d.state(), Err(Error::BufferTooLarge { .. })));
    }

    #[test]
    fn negative_capacity_and_null_region_are_rejected() {
        let d = Descriptor64::new(-1, ptr::null_mut());
        assert!(matches!(d.capacity_bytes(), Err(Error::BufferTooSmall(_))));

        let d = Descriptor64::new(8, ptr::null_mut());
        assert!(matches!(d.capacity_bytes(), Err(Error::NullPointer)));

        let d = Descriptor64::empty();
        assert_eq!(d.capacity_bytes().unwrap(), 0);
    }

    #[test]
    fn word_limits() {
        assert_eq!(i32::from_len(i32::MAX as usize), Some(i32::MAX));
        assert_eq!(i32::from_len(i32::MAX as usize + 1), None);
        assert_eq!(i32::spill_marker(7), Some(-7));
        assert_eq!(i64::spill_marker(7), Some(-7));
        assert_eq!(<i32 as LengthWord>::BITS, 32);
        assert_eq!(<i64 as LengthWord>::BITS, 64);
    }
}
