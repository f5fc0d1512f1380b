//! Runtime configuration that callers and callees can serialize/deserialize.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpillConfig {
    /// Directory for spill files. `None` means the platform temp directory.
    pub spill_dir: Option<PathBuf>,

    /// File name prefix for spill files.
    pub spill_prefix: String,

    /// Hard cap (bytes) on caller-side buffers allocated through a pool.
    pub mem_cap_bytes: usize,

    /// Tick period of the background counter worker.
    pub ticker_interval_ms: u64,
}

impl Default for SpillConfig {
    fn default() -> Self {
        Self {
            spill_dir: None,
            spill_prefix: "spillbuf-".to_string(),
            mem_cap_bytes: 64 * 1024 * 1024, // 64 MiB default
            ticker_interval_ms: 1_000,
        }
    }
}

impl SpillConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `SPILLBUF_SPILL_DIR`: directory for spill files
    /// - `SPILLBUF_SPILL_PREFIX`: spill file name prefix
    /// - `SPILLBUF_MEM_CAP_BYTES`: caller-side buffer cap in bytes
    /// - `SPILLBUF_TICKER_INTERVAL_MS`: background counter tick period
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SpillConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(s) = lookup("SPILLBUF_SPILL_DIR") {
            if !s.trim().is_empty() {
                cfg.spill_dir = Some(PathBuf::from(s));
            }
        }

        if let Some(s) = lookup("SPILLBUF_SPILL_PREFIX") {
            cfg.spill_prefix = s;
        }

        if let Some(s) = lookup("SPILLBUF_MEM_CAP_BYTES") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.mem_cap_bytes = v;
            }
        }

        if let Some(s) = lookup("SPILLBUF_TICKER_INTERVAL_MS") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.ticker_interval_ms = v.max(1);
            }
        }

        cfg
    }

    /// Directory spill files are created in.
    pub fn resolved_spill_dir(&self) -> PathBuf {
        self.spill_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("SPILLBUF_SPILL_DIR", "/dev/shm/spill"),
            ("SPILLBUF_SPILL_PREFIX", "demo-"),
            ("SPILLBUF_MEM_CAP_BYTES", "4096"),
            ("SPILLBUF_TICKER_INTERVAL_MS", "0"),
        ]
        .into_iter()
        .collect();
        let cfg = SpillConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.spill_dir, Some(PathBuf::from("/dev/shm/spill")));
        assert_eq!(cfg.spill_prefix, "demo-");
        assert_eq!(cfg.mem_cap_bytes, 4096);
        assert_eq!(cfg.ticker_interval_ms, 1);
    }

    #[test]
    fn unparsable_values_keep_defaults() {
        let cfg = SpillConfig::from_lookup(|k| match k {
            "SPILLBUF_MEM_CAP_BYTES" => Some("lots".into()),
            "SPILLBUF_SPILL_DIR" => Some("  ".into()),
            _ => None,
        });
        assert_eq!(cfg, SpillConfig::default());
        assert_eq!(cfg.resolved_spill_dir(), std::env::temp_dir());
    }
}
