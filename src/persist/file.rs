//! File Snapshot Store Module
//!
//! Snapshot backends: the `SnapshotStore` seam and its file implementation.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::CacheOptions;
use crate::error::{CacheError, Result};
use crate::persist::Snapshot;

// == Snapshot Store ==
/// Backend holding the shared snapshot of one named cache.
pub trait SnapshotStore: Send + fmt::Debug {
    /// Reads the current snapshot. A backend with no snapshot yet yields `Ok(None)`.
    fn load(&self) -> Result<Option<Snapshot>>;

    /// Replaces the stored snapshot with `snapshot`.
    fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Human-readable location, used in logs.
    fn describe(&self) -> String;
}

/// How [`FileSnapshotStore`] rewrites its file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate and rewrite in place. Readers can observe a partial file.
    #[default]
    Overwrite,
    /// Write a sibling temp file, then rename it over the snapshot.
    AtomicRename,
}

// == File Snapshot Store ==
/// One JSON file per cache name. No locking and no fsync.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
    write_mode: WriteMode,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>, write_mode: WriteMode) -> Self {
        Self {
            path: path.into(),
            write_mode,
        }
    }

    /// Opens the file backend `options` point at.
    pub fn from_options(options: &CacheOptions) -> Self {
        Self::new(options.snapshot_path(), options.write_mode)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(&self.path, e)),
        };

        let snapshot = serde_json::from_slice(&bytes).map_err(|source| CacheError::CorruptSnapshot {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CacheError::io(parent, e))?;
        }

        let bytes = serde_json::to_vec(snapshot)?;
        match self.write_mode {
            WriteMode::Overwrite => {
                fs::write(&self.path, &bytes).map_err(|e| CacheError::io(&self.path, e))?;
            }
            WriteMode::AtomicRename => {
                let temp = self.temp_path();
                fs::write(&temp, &bytes).map_err(|e| CacheError::io(&temp, e))?;
                fs::rename(&temp, &self.path).map_err(|e| CacheError::io(&self.path, e))?;
            }
        }

        debug!(path = %self.path.display(), entries = snapshot.len(), "Snapshot written");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
