//! Cache Module
//!
//! Key derivation, in-memory entry storage with TTL expiration, and the
//! memoizing cache built on top of them.

mod entry;
mod key;
mod memo;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{expiration_after, CacheEntry};
pub use key::{CacheKey, CallArgs, KEY_DELIMITER};
pub use memo::MemoCache;
pub use stats::CacheStats;
pub use store::EntryStore;
