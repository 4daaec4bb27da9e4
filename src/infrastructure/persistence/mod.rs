//! Durable storage implementations.

mod file_snapshot_store;

pub use file_snapshot_store::FileSnapshotStore;
