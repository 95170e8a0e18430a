//! Cache Entry Module
//!
//! Defines the structure for individual memoized results with an expiration time.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

// == Cache Entry ==
/// A stored result and the wall-clock instant it stops being valid.
///
/// Entries are replaced wholesale on refresh and never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The stored value, kept in its JSON form
    pub value: Value,
    /// Expiration instant
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry that expires `ttl` after `now`.
    pub fn new(value: Value, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            value,
            expires_at: expiration_after(now, ttl),
        }
    }

    // == Is Expired ==
    /// An entry is expired once its expiration instant lies strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

// == Utility Functions ==
/// Returns `now + ttl`, saturating at the largest representable instant.
pub fn expiration_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
