//! Spill storage backends.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use spillbuf_core::config::SpillConfig;
use spillbuf_core::error::{Error, Result};

/// Abstract storage for spill payloads.
///
/// Paths are UTF-8 strings because they travel inside descriptor regions.
pub trait SpillStorage: Send + Sync {
    /// Persist `bytes` under a fresh, non-colliding path and return it.
    fn create(&self, bytes: &[u8]) -> Result<String>;

    /// Read the whole payload stored at `path`.
    fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Delete a path. Idempotent (no error if the path doesn't exist).
    fn delete(&self, path: &str) -> Result<()>;

    fn exists(&self, path: &str) -> bool;
}

/// Spill files in a (preferably memory-backed) temp directory.
///
/// Files get random names from `tempfile` and owner-only permissions on unix.
#[derive(Debug, Clone)]
pub struct TempFileStorage {
    dir: PathBuf,
    prefix: String,
}

impl TempFileStorage {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(cfg: &SpillConfig) -> Self {
        Self::new(cfg.resolved_spill_dir(), cfg.spill_prefix.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SpillStorage for TempFileStorage {
    fn create(&self, bytes: &[u8]) -> Result<String> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::SpillWrite(format!("mkdir: {e}")))?;

        let mut file = tempfile::Builder::new()
            .prefix(&self.prefix)
            .tempfile_in(&self.dir)
            .map_err(|e| Error::SpillWrite(format!("create: {e}")))?;
        file.write_all(bytes)
            .map_err(|e| Error::SpillWrite(format!("write: {e}")))?;
        file.flush()
            .map_err(|e| Error::SpillWrite(format!("flush: {e}")))?;

        // Until `keep` succeeds the NamedTempFile deletes itself on drop.
        let (_, path) = file
            .keep()
            .map_err(|e| Error::SpillWrite(format!("persist: {e}")))?;

        match path.into_os_string().into_string() {
            Ok(s) => Ok(s),
            Err(os) => {
                let _ = fs::remove_file(&os);
                Err(Error::SpillWrite("spill path is not valid UTF-8".into()))
            }
        }
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| Error::SpillRead(format!("{path}: {e}")))
    }

    fn delete(&self, path: &str) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::SpillWrite(format!("delete {path}: {e}"))),
        }
    }

    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}
