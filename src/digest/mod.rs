//! Grouping, ranking and persisting normalized articles.

pub mod ranker;
pub mod snapshot;

pub use ranker::{CategoryGroup, RankedCategories, Ranker, DEFAULT_MAX_ITEMS};
pub use snapshot::{write_atomic, Snapshot, SnapshotWriter};
