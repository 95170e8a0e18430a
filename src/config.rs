//! Configuration Module
//!
//! Construction options for a cache instance, loadable from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CacheError, Result};
use crate::persist::WriteMode;

/// Default time-to-live applied to every entry (one hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Default directory holding persisted snapshot files.
pub const DEFAULT_DIRECTORY: &str = "__local_cache__";

/// Options identifying and configuring one cache instance.
///
/// Two instances built from options with the same `name` and `persisted = true`
/// share one snapshot file but keep independent in-memory state.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Cache name, restricted to ASCII alphanumeric characters
    pub name: String,
    /// Whether entries are written through to a snapshot file
    pub persisted: bool,
    /// Time-to-live applied uniformly to every entry created by this instance
    pub ttl: Duration,
    /// Directory the snapshot file lives in
    pub directory: PathBuf,
    /// How the snapshot file is rewritten
    pub write_mode: WriteMode,
}

impl CacheOptions {
    /// Creates memory-only options with the default TTL.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            persisted: false,
            ttl: DEFAULT_TTL,
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            write_mode: WriteMode::default(),
        }
    }

    pub fn with_persisted(mut self, persisted: bool) -> Self {
        self.persisted = persisted;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    /// Creates options for `name` from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMO_CACHE_DIR` - Snapshot directory (default: `__local_cache__`)
    /// - `MEMO_CACHE_TTL_MS` - Entry TTL in milliseconds (default: 3600000)
    /// - `MEMO_CACHE_PERSISTED` - `true`/`1` to persist (default: false)
    pub fn from_env(name: impl Into<String>) -> Self {
        Self::from_lookup(name, |key| env::var(key).ok())
    }

    fn from_lookup(name: impl Into<String>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::new(name);

        if let Some(dir) = lookup("MEMO_CACHE_DIR").filter(|v| !v.is_empty()) {
            options.directory = PathBuf::from(dir);
        }
        if let Some(ttl_ms) = lookup("MEMO_CACHE_TTL_MS").and_then(|v| v.parse::<u64>().ok()) {
            options.ttl = Duration::from_millis(ttl_ms);
        }
        if let Some(persisted) = lookup("MEMO_CACHE_PERSISTED") {
            options.persisted = matches!(persisted.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        options
    }

    /// Checks the options, failing immediately on an invalid name.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)
    }

    /// Path of the snapshot file these options point at.
    pub fn snapshot_path(&self) -> PathBuf {
        self.directory.join(format!("__{}__.json", self.name))
    }
}

/// Rejects empty names and names containing anything but ASCII letters and digits.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CacheError::InvalidName(name.to_string()));
    }
    Ok(())
}
