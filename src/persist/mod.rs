//! Persistence Module
//!
//! Shared snapshot of a cache instance and the merge policy used to reconcile
//! independent in-memory caches through it.
//!
//! Backends sit behind [`SnapshotStore`]. The file backend takes no lock, so
//! two processes writing the same snapshot can lose each other's entries: the
//! merge-before-write step only narrows that window.

mod file;
mod snapshot;

pub use file::{FileSnapshotStore, SnapshotStore, WriteMode};
pub use snapshot::{merge_snapshot, should_import, MergeOutcome, Snapshot};
