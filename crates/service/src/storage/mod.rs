//! Storage abstractions for the record stores
//!
//! Every store keeps its whole dataset in one snapshot behind a
//! [`SnapshotPort`]. The port only knows how to read and write a complete
//! snapshot; [`SnapshotTable`] adds the load-mutate-save cycle, the
//! per-store lock and the recovery rules shared by all stores.

pub mod snapshot;
pub mod json_file;
pub mod in_memory;

pub use in_memory::InMemorySnapshot;
pub use json_file::JsonFileSnapshot;
pub use snapshot::{LockedSnapshot, Record, Snapshot, SnapshotPort, SnapshotTable, StorageError};
