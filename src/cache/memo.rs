//! Memo Cache Module
//!
//! Memoizing cache combining the in-memory entry store, TTL expiration and the
//! optional shared snapshot.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{CacheKey, CacheStats, CallArgs, EntryStore};
use crate::config::{validate_name, CacheOptions};
use crate::error::{CacheError, Result};
use crate::persist::{merge_snapshot, FileSnapshotStore, Snapshot, SnapshotStore};

// == Memo Cache ==
/// Memoizes results of deterministic targets for a fixed TTL.
///
/// A persisted cache reconciles with its snapshot on every miss and before
/// every write, so independent instances sharing a name see each other's
/// results. Values are held as JSON and decoded on every hit: callers always
/// receive their own copy.
///
/// Result types must round-trip through `serde_json` unchanged, otherwise a
/// hit can differ from the value returned by the original miss.
#[derive(Debug)]
pub struct MemoCache {
    name: String,
    ttl: Duration,
    store: EntryStore,
    backend: Option<Box<dyn SnapshotStore>>,
    stats: CacheStats,
}

impl MemoCache {
    // == Constructor ==
    /// Creates a cache from `options`, persisted to a file when requested.
    ///
    /// Fails immediately if the name is not alphanumeric.
    pub fn new(options: CacheOptions) -> Result<Self> {
        options.validate()?;
        let backend: Option<Box<dyn SnapshotStore>> = if options.persisted {
            Some(Box::new(FileSnapshotStore::from_options(&options)))
        } else {
            None
        };

        Ok(Self {
            name: options.name,
            ttl: options.ttl,
            store: EntryStore::new(),
            backend,
            stats: CacheStats::new(),
        })
    }

    /// Creates a persisted cache on top of any snapshot backend.
    pub fn with_store(
        name: impl Into<String>,
        ttl: Duration,
        backend: impl SnapshotStore + 'static,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;

        Ok(Self {
            name,
            ttl,
            store: EntryStore::new(),
            backend: Some(Box::new(backend)),
            stats: CacheStats::new(),
        })
    }

    // == Get ==
    /// Returns the cached result of `target(args)`, computing it on a miss.
    ///
    /// `compute` runs only on a miss and must call the target with exactly
    /// the arguments described by `args`.
    pub fn get<T, F>(&mut self, target: &str, args: &CallArgs, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        self.try_get(target, args, || Ok::<T, CacheError>(compute()))
    }

    /// Like [`get`](Self::get) for fallible targets.
    ///
    /// A target error is returned unchanged and nothing is stored.
    pub fn try_get<T, E, F>(&mut self, target: &str, args: &CallArgs, compute: F) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let key = CacheKey::derive(target, args)?;
        if let Some(value) = self.lookup(&key)? {
            return Ok(value);
        }

        let value = compute()?;
        self.store_computed(key, &value)?;
        Ok(value)
    }

    /// Sweeps, then looks `key` up locally and, failing that, in the snapshot.
    pub(crate) fn lookup<T: DeserializeOwned>(&mut self, key: &CacheKey) -> Result<Option<T>> {
        let now = Utc::now();
        self.sweep(now);

        if !self.store.contains_key(key) {
            self.merge_from_backend(now)?;
        }

        match self.store.get(key, now) {
            Some(entry) => {
                let value = T::deserialize(&entry.value)?;
                self.stats.record_hit();
                debug!(cache = %self.name, key = %key, "Cache hit");
                Ok(Some(value))
            }
            None => {
                self.stats.record_miss();
                debug!(cache = %self.name, key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Stores a freshly computed value and writes the merged state through.
    pub(crate) fn store_computed<T: Serialize>(&mut self, key: CacheKey, value: &T) -> Result<()> {
        let encoded = serde_json::to_value(value)?;
        let now = Utc::now();

        // The snapshot may have moved since the read path merged it.
        self.merge_from_backend(now)?;
        self.store.put(key, encoded, self.ttl, now);
        self.stats.record_computation();

        self.write_snapshot()
    }

    // == Invalidate ==
    /// Removes the entry for `target(args)` locally and from the snapshot.
    ///
    /// Returns whether an entry was removed.
    pub fn invalidate(&mut self, target: &str, args: &CallArgs) -> Result<bool> {
        let key = CacheKey::derive(target, args)?;
        self.merge_from_backend(Utc::now())?;

        let removed = self.store.remove(&key).is_some();
        if removed {
            self.write_snapshot()?;
            info!(cache = %self.name, key = %key, "Entry invalidated");
        }
        Ok(removed)
    }

    // == Flush ==
    /// Drops every entry. A persisted cache also rewrites its snapshot empty.
    ///
    /// Other instances only notice on their next merge, and keep any local
    /// copies they already hold.
    pub fn flush(&mut self) -> Result<()> {
        let dropped = self.store.len();
        self.store.clear();
        self.write_snapshot()?;

        info!(cache = %self.name, dropped, "Cache flushed");
        Ok(())
    }

    // == Inspection ==
    /// Whether a fresh entry for `target(args)` is held in memory.
    ///
    /// The snapshot is not consulted.
    pub fn contains(&self, target: &str, args: &CallArgs) -> Result<bool> {
        let key = CacheKey::derive(target, args)?;
        Ok(self.store.get(&key, Utc::now()).is_some())
    }

    /// Number of entries held in memory, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.store.len());
        stats
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_persisted(&self) -> bool {
        self.backend.is_some()
    }

    // == Snapshot Sync ==
    fn sweep(&mut self, now: DateTime<Utc>) {
        let removed = self.store.sweep_expired(now);
        if removed > 0 {
            self.stats.record_swept(removed);
            debug!(cache = %self.name, removed, "Expired entries swept");
        }
    }

    fn merge_from_backend(&mut self, now: DateTime<Utc>) -> Result<()> {
        let Some(backend) = &self.backend else {
            return Ok(());
        };
        let Some(snapshot) = backend.load()? else {
            return Ok(());
        };

        let outcome = merge_snapshot(&mut self.store, snapshot, now);
        self.stats.record_imported(outcome.imported);
        if outcome.imported > 0 {
            debug!(
                cache = %self.name,
                imported = outcome.imported,
                kept_local = outcome.kept_local,
                stale = outcome.stale,
                "Merged snapshot"
            );
        }
        Ok(())
    }

    fn write_snapshot(&mut self) -> Result<()> {
        let Some(backend) = &self.backend else {
            return Ok(());
        };

        backend.save(&Snapshot::from_store(&self.store))?;
        self.stats.record_snapshot_write();
        Ok(())
    }
}
