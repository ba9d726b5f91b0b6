//! Domain Entities
//!
//! - `Snapshot` - The parsed top-level statements of the watched script
//! - `SnapshotStore` - Holds the two most recent snapshots

mod snapshot;

pub use snapshot::{Snapshot, SnapshotStore, SNAPSHOT_CAPACITY};
