//! Data-access traits implemented by the infrastructure layer.

mod edge_store;
mod snapshot_store;
mod upstream;

pub use edge_store::{CacheError, CacheResult, EdgeStore};
pub use snapshot_store::SnapshotStore;
pub use upstream::{DirectoryPayload, PayloadSource, UpstreamClient};

#[cfg(test)]
pub use edge_store::MockEdgeStore;
#[cfg(test)]
pub use snapshot_store::MockSnapshotStore;
#[cfg(test)]
pub use upstream::{MockPayloadSource, MockUpstreamClient};
