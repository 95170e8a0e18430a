//! Memo Cache - memoizing TTL cache with an optional shared snapshot
//!
//! Wraps deterministic functions, expires results after a fixed TTL, and lets
//! independent instances sharing a persisted cache name pick up each other's
//! results through a snapshot file.

pub mod cache;
pub mod config;
pub mod error;
pub mod memoize;
pub mod persist;

pub use cache::{CacheKey, CacheStats, CallArgs, MemoCache};
pub use config::CacheOptions;
pub use error::{CacheError, Result};
pub use memoize::{shared, Memoized, SharedCache, TryMemoized};
pub use persist::{FileSnapshotStore, Snapshot, SnapshotStore, WriteMode};
