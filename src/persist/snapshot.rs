//! Snapshot Module
//!
//! Snapshot codec and the latest-expiration-wins merge policy.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::cache::{CacheEntry, CacheKey, EntryStore};

// == Snapshot ==
/// Full serialized state of one cache instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Cached values by key
    pub items: BTreeMap<CacheKey, Value>,
    /// Expiration instants by key
    pub expirations: BTreeMap<CacheKey, DateTime<Utc>>,
}

impl Snapshot {
    /// Captures every entry held by `store`, expired or not.
    pub fn from_store(store: &EntryStore) -> Self {
        let mut snapshot = Self::default();
        for (key, entry) in store.iter() {
            snapshot.items.insert(key.clone(), entry.value.clone());
            snapshot.expirations.insert(key.clone(), entry.expires_at);
        }
        snapshot
    }

    /// Number of recorded expirations.
    pub fn len(&self) -> usize {
        self.expirations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expirations.is_empty()
    }

    /// Number of entries still valid at `now`.
    pub fn live_count(&self, now: DateTime<Utc>) -> usize {
        self.expirations.values().filter(|at| **at > now).count()
    }
}

// == Merge ==
/// What a merge did with each snapshot entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Entries copied into the local store
    pub imported: usize,
    /// Entries already expired at merge time
    pub stale: usize,
    /// Entries skipped because the local copy expires no earlier
    pub kept_local: usize,
    /// Expirations with no matching item
    pub orphaned: usize,
}

/// Latest-expiration-wins: an incoming entry replaces the local one only if
/// there is no local entry or the incoming one expires strictly later.
///
/// Every entry is written with `now + ttl`, so with a shared TTL a later
/// expiration stands in for a later write.
pub fn should_import(local: Option<&CacheEntry>, incoming_expires_at: DateTime<Utc>) -> bool {
    match local {
        None => true,
        Some(entry) => incoming_expires_at > entry.expires_at,
    }
}

/// Imports the still-valid entries of `snapshot` into `store` under
/// [`should_import`].
pub fn merge_snapshot(store: &mut EntryStore, snapshot: Snapshot, now: DateTime<Utc>) -> MergeOutcome {
    let Snapshot {
        mut items,
        expirations,
    } = snapshot;
    let mut outcome = MergeOutcome::default();

    for (key, expires_at) in expirations {
        if expires_at <= now {
            outcome.stale += 1;
            continue;
        }
        if !should_import(store.peek(&key), expires_at) {
            outcome.kept_local += 1;
            continue;
        }
        match items.remove(&key) {
            Some(value) => {
                store.insert(key, CacheEntry { value, expires_at });
                outcome.imported += 1;
            }
            None => {
                warn!(key = %key, "Snapshot has an expiration without a matching item, skipping");
                outcome.orphaned += 1;
            }
        }
    }

    outcome
}
