//! Entry Store Module
//!
//! In-memory map of cache keys to entries with lazy TTL expiration.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::cache::{CacheEntry, CacheKey};

// == Entry Store ==
/// In-memory storage owned by a single cache instance.
///
/// Expired entries are not evicted proactively; they stay until the next
/// [`sweep_expired`](EntryStore::sweep_expired) but are never returned by
/// [`get`](EntryStore::get).
#[derive(Debug, Default, Clone)]
pub struct EntryStore {
    entries: HashMap<CacheKey, CacheEntry>,
}

impl EntryStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Returns the entry for `key` if present and not expired at `now`.
    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<&CacheEntry> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
    }

    /// Returns the entry for `key` regardless of its expiration.
    pub fn peek(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    // == Put ==
    /// Stores `value` under `key`, expiring `ttl` after `now`.
    ///
    /// Any prior entry is overwritten unconditionally.
    pub fn put(&mut self, key: CacheKey, value: Value, ttl: Duration, now: DateTime<Utc>) {
        self.entries.insert(key, CacheEntry::new(value, ttl, now));
    }

    /// Stores a fully-formed entry, overwriting any prior one.
    pub fn insert(&mut self, key: CacheKey, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    // == Sweep Expired ==
    /// Removes every entry expired at `now`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Remove ==
    /// Removes the entry for `key` whether or not it has expired.
    pub fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.remove(key)
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains_key(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CacheKey, &CacheEntry)> {
        self.entries.iter()
    }

    // == Length ==
    /// Number of physically held entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
