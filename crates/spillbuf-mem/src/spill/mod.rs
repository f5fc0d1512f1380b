//! Spill manager for results that outgrow the caller's capacity.
//!
//! The callee writes the full payload to a spill file and stores the file's
//! path in the caller's region. From that moment the file belongs to the
//! caller, who claims it as a [`SpillHandle`] and must release it.

pub mod storage;

use std::fmt;
use std::sync::Arc;

use spillbuf_core::config::SpillConfig;
use spillbuf_core::error::{Error, Result};

use crate::tracking::SpillTracker;

pub use storage::{SpillStorage, TempFileStorage};

/// Creates and claims spill resources on one storage backend.
#[derive(Clone)]
pub struct SpillManager {
    storage: Arc<dyn SpillStorage>,
    tracker: Arc<SpillTracker>,
}

impl SpillManager {
    pub fn new(storage: Arc<dyn SpillStorage>) -> Self {
        Self {
            storage,
            tracker: Arc::new(SpillTracker::new()),
        }
    }

    /// Manager over temp files in the configured spill directory.
    pub fn from_config(cfg: &SpillConfig) -> Self {
        Self::new(Arc::new(TempFileStorage::from_config(cfg)))
    }

    /// Write `bytes` to a new spill resource.
    ///
    /// The returned handle deletes the resource when dropped; call
    /// [`SpillHandle::into_path`] to hand it to the other side instead.
    pub fn spill(&self, bytes: &[u8]) -> Result<SpillHandle> {
        let path = self.storage.create(bytes)?;
        self.tracker.record_created(bytes.len());
        #[cfg(feature = "tracing")]
        tracing::debug!(%path, bytes = bytes.len(), "spilled payload");
        Ok(SpillHandle {
            path: Some(path),
            storage: Arc::clone(&self.storage),
            tracker: Arc::clone(&self.tracker),
        })
    }

    /// Take ownership of a spill resource found in a descriptor.
    pub fn claim(&self, path: String) -> SpillHandle {
        SpillHandle {
            path: Some(path),
            storage: Arc::clone(&self.storage),
            tracker: Arc::clone(&self.tracker),
        }
    }

    /// Read a spill resource without taking ownership of it.
    pub fn read_path(&self, path: &str) -> Result<Vec<u8>> {
        self.storage.read(path)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.storage.exists(path)
    }

    pub fn tracker(&self) -> &SpillTracker {
        &self.tracker
    }
}

impl fmt::Debug for SpillManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpillManager")
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

/// Owned spill resource. Released exactly once: explicitly through
/// [`SpillHandle::release`] or implicitly on drop.
pub struct SpillHandle {
    path: Option<String>,
    storage: Arc<dyn SpillStorage>,
    tracker: Arc<SpillTracker>,
}

impl SpillHandle {
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or_default()
    }

    /// Read the full payload.
    pub fn read(&self) -> Result<Vec<u8>> {
        self.storage.read(self.path())
    }

    pub fn read_string(&self) -> Result<String> {
        String::from_utf8(self.read()?).map_err(|_| Error::InvalidUtf8)
    }

    /// Delete the resource, surfacing storage errors.
    pub fn release(mut self) -> Result<()> {
        match self.path.take() {
            Some(path) => self.delete(&path),
            None => Ok(()),
        }
    }

    /// Give up ownership without deleting; the path now belongs to whoever
    /// receives it.
    pub fn into_path(mut self) -> String {
        self.path.take().unwrap_or_default()
    }

    fn delete(&self, path: &str) -> Result<()> {
        self.storage.delete(path)?;
        self.tracker.record_released();
        #[cfg(feature = "tracing")]
        tracing::debug!(%path, "released spill");
        Ok(())
    }
}

impl Drop for SpillHandle {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(_e) = self.delete(&path) {
                #[cfg(feature = "tracing")]
                tracing::warn!(%path, error = %_e, "failed to release spill on drop");
            }
        }
    }
}

impl fmt::Debug for SpillHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpillHandle")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
