//! Cache Statistics Module
//!
//! Tracks per-instance counters: hits, misses, target computations, and snapshot traffic.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache activity for one instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from memory, including after a snapshot merge
    pub hits: u64,
    /// Lookups that had to invoke the target
    pub misses: u64,
    /// Successful target invocations whose result was stored
    pub computations: u64,
    /// Entries imported from the shared snapshot
    pub imported: u64,
    /// Times the snapshot file was rewritten
    pub snapshot_writes: u64,
    /// Entries removed by expiration sweeps
    pub expired_swept: u64,
    /// Current number of entries in memory
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_computation(&mut self) {
        self.computations += 1;
    }

    pub fn record_imported(&mut self, count: usize) {
        self.imported += count as u64;
    }

    pub fn record_snapshot_write(&mut self) {
        self.snapshot_writes += 1;
    }

    pub fn record_swept(&mut self, count: usize) {
        self.expired_swept += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_counters_accumulate() {
        let mut stats = CacheStats::new();
        stats.record_imported(3);
        stats.record_imported(2);
        stats.record_swept(4);
        stats.record_snapshot_write();
        stats.record_computation();

        assert_eq!(stats.imported, 5);
        assert_eq!(stats.expired_swept, 4);
        assert_eq!(stats.snapshot_writes, 1);
        assert_eq!(stats.computations, 1);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = CacheStats::new();
        stats.set_total_entries(42);
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"total_entries\":42"));
    }
}
