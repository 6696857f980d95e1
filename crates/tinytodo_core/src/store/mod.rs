//! Entity graph storage and PDP snapshots.

pub mod entity_store;
pub mod snapshot;

pub use entity_store::{EntityStore, StoreError, StoreResult};
pub use snapshot::{AttrValue, EntityRecord, EntitySnapshot, SnapshotError};
