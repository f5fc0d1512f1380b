//! Caller-side buffer allocation built on top of the hard MemoryBudget.
//!
//! An [`OwnedBuffer`] owns a descriptor at a stable heap address plus the
//! region it describes. Its pointer is what crosses the boundary.

use std::ops::Deref;
use std::slice;

use serde::de::DeserializeOwned;
use serde::Serialize;

use spillbuf_core::budget::MemoryBudget;
use spillbuf_core::descriptor::{LengthState, LengthWord, RawDescriptor};
use spillbuf_core::error::{Error, Result};

use crate::guard::{BudgetGuardImpl, MemoryBudgetImpl};
use crate::spill::{SpillHandle, SpillManager};

/// Zeroed region plus its descriptor; returns its accounted bytes on drop.
#[derive(Debug)]
pub struct OwnedBuffer<L: LengthWord = i64> {
    desc: Box<RawDescriptor<L>>,
    // Never resized after allocation: `desc.data` points into it.
    region: Vec<u8>,
    _guard: BudgetGuardImpl,
}

// SAFETY: the descriptor's data pointer refers to `region`, which the buffer
// owns exclusively; moving the buffer to another thread moves both.
unsafe impl<L: LengthWord> Send for OwnedBuffer<L> {}

/// A decoded result. A spilled result carries the resource the caller now owns.
#[derive(Debug)]
pub enum Payload {
    Inline(Vec<u8>),
    Spilled(SpillHandle),
}

impl Payload {
    pub fn is_spilled(&self) -> bool {
        matches!(self, Payload::Spilled(_))
    }

    /// Read the payload; a spill is released once it has been read.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Payload::Inline(bytes) => Ok(bytes),
            Payload::Spilled(handle) => {
                let bytes = handle.read()?;
                handle.release()?;
                Ok(bytes)
            }
        }
    }
}

impl<L: LengthWord> OwnedBuffer<L> {
    /// Allocate a zeroed region of `capacity` bytes with `length = 0`.
    pub fn allocate(
        budget: &impl MemoryBudget<Guard = BudgetGuardImpl>,
        capacity: usize,
        tag: &'static str,
    ) -> Result<Self> {
        let word = L::from_len(capacity).ok_or_else(|| Error::AllocFailed {
            bytes: capacity,
            reason: format!("capacity does not fit a {}-bit length word", L::BITS),
        })?;

        let guard = budget
            .try_acquire(capacity, tag)
            .ok_or_else(|| Error::AllocFailed {
                bytes: capacity,
                reason: format!(
                    "budget exceeded for '{tag}': capacity {}, used {}",
                    budget.capacity_bytes(),
                    budget.used_bytes()
                ),
            })?;

        let mut region = Vec::new();
        region
            .try_reserve_exact(capacity)
            .map_err(|e| Error::AllocFailed {
                bytes: capacity,
                reason: e.to_string(),
            })?;
        region.resize(capacity, 0u8);

        let desc = Box::new(RawDescriptor::new(word, region.as_mut_ptr()));
        Ok(Self {
            desc,
            region,
            _guard: guard,
        })
    }

    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    /// Raw length field, including the spill marker.
    pub fn length_field(&self) -> i64 {
        self.desc.length.to_i64()
    }

    pub fn is_spilled(&self) -> bool {
        self.desc.is_spilled()
    }

    pub fn descriptor(&self) -> &RawDescriptor<L> {
        &self.desc
    }

    /// Pointer handed across the boundary. Valid while `self` is alive and
    /// not otherwise borrowed.
    pub fn as_mut_ptr(&mut self) -> *mut RawDescriptor<L> {
        &mut *self.desc
    }

    pub fn as_ptr(&self) -> *const RawDescriptor<L> {
        &*self.desc
    }

    /// Store `bytes` inline. Never spills: an oversized write fails and
    /// leaves the buffer untouched.
    ///
    /// The required size is reported in [`Error::CapacityExceeded`] rather
    /// than written into `length`; a length above capacity would make the
    /// descriptor unreadable ([`RawDescriptor::state`] rejects it), so the
    /// previous contents stay valid instead.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.capacity() {
            return Err(Error::CapacityExceeded {
                required: bytes.len(),
                capacity: self.capacity(),
            });
        }
        let len = L::from_len(bytes.len()).ok_or(Error::BufferTooLarge {
            length: bytes.len() as i64,
            limit: L::max_len() as i64,
        })?;
        self.region_mut()[..bytes.len()].copy_from_slice(bytes);
        self.desc.length = len;
        Ok(())
    }

    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.write_bytes(text.as_bytes())
    }

    pub fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value).map_err(|e| Error::JsonEncode(e.to_string()))?;
        self.write_bytes(&bytes)
    }

    /// Decode the current contents. A spill is claimed exactly once: the
    /// length resets to 0 and the returned handle owns the resource.
    pub fn read_payload(&mut self, spill: &SpillManager) -> Result<Payload> {
        match self.desc.state()? {
            LengthState::Inline(len) => Ok(Payload::Inline(self.region()[..len].to_vec())),
            LengthState::Spilled { path_len } => {
                let path = std::str::from_utf8(&self.region()[..path_len])
                    .map_err(|_| Error::InvalidUtf8)?
                    .to_string();
                self.desc.length = L::ZERO;
                Ok(Payload::Spilled(spill.claim(path)))
            }
        }
    }

    pub fn read_bytes(&mut self, spill: &SpillManager) -> Result<Vec<u8>> {
        self.read_payload(spill)?.into_bytes()
    }

    pub fn read_string(&mut self, spill: &SpillManager) -> Result<String> {
        String::from_utf8(self.read_bytes(spill)?).map_err(|_| Error::InvalidUtf8)
    }

    pub fn read_json<T: DeserializeOwned>(&mut self, spill: &SpillManager) -> Result<T> {
        let bytes = self.read_bytes(spill)?;
        serde_json::from_slice(&bytes).map_err(|e| Error::JsonDecode(e.to_string()))
    }

    // The region is only touched through `desc.data` so the pointer the
    // callee received stays valid across caller-side accesses.
    fn region(&self) -> &[u8] {
        // SAFETY: `desc.data` points at `region`'s `capacity` initialized bytes.
        unsafe { slice::from_raw_parts(self.desc.data, self.region.len()) }
    }

    fn region_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above; `&mut self` makes the access exclusive.
        unsafe { slice::from_raw_parts_mut(self.desc.data, self.region.len()) }
    }

    /// Forget the current contents. Does not release a pending spill; claim
    /// it with [`OwnedBuffer::read_payload`] first.
    pub fn reset(&mut self) {
        self.desc.length = L::ZERO;
    }
}

impl<L: LengthWord> Deref for OwnedBuffer<L> {
    type Target = [u8];
    /// The whole region, `capacity` bytes.
    fn deref(&self) -> &Self::Target {
        self.region()
    }
}

/// Allocation facade over a shared budget.
pub struct BufferPool<B: MemoryBudget = MemoryBudgetImpl> {
    budget: B,
}

impl<B: MemoryBudget<Guard = BudgetGuardImpl>> BufferPool<B> {
    pub fn new(budget: B) -> Self {
        Self { budget }
    }

    pub fn alloc<L: LengthWord>(&self, capacity: usize, tag: &'static str) -> Result<OwnedBuffer<L>> {
        OwnedBuffer::allocate(&self.budget, capacity, tag)
    }

    /// Allocate exactly `bytes.len()` and fill it.
    pub fn alloc_with<L: LengthWord>(&self, bytes: &[u8], tag: &'static str) -> Result<OwnedBuffer<L>> {
        let mut buf = self.alloc(bytes.len(), tag)?;
        buf.write_bytes(bytes)?;
        Ok(buf)
    }

    pub fn budget(&self) -> &B {
        &self.budget
    }
}
