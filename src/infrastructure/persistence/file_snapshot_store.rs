//! File-backed implementation of the persistent snapshot cache.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::entities::CacheRecord;
use crate::domain::error::DirectoryError;
use crate::domain::repositories::SnapshotStore;

/// Stores the directory cache record as a single JSON document on disk.
///
/// Writes go to a sibling temp file first and are renamed over the
/// destination, so snapshot and stamp always replace the previous record
/// together and a crashed write leaves the old record intact.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn read(&self) -> Result<Option<CacheRecord>, DirectoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot cache at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(DirectoryError::StoreCorrupt(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        match serde_json::from_slice::<CacheRecord>(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                // Corrupt data is a cache miss, not an error the loader sees.
                warn!(
                    "Snapshot cache at {} is corrupt, treating as absent: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    async fn write(&self, record: &CacheRecord) -> Result<(), DirectoryError> {
        let bytes = serde_json::to_vec(record)
            .map_err(|e| DirectoryError::StoreCorrupt(format!("failed to serialize record: {e}")))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DirectoryError::StoreCorrupt(format!(
                    "failed to create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes).await.map_err(|e| {
            DirectoryError::StoreCorrupt(format!("failed to write {}: {}", temp.display(), e))
        })?;

        tokio::fs::rename(&temp, &self.path).await.map_err(|e| {
            DirectoryError::StoreCorrupt(format!(
                "failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!(
            "Stored snapshot cache: {} entries, hash {}",
            record.entries.len(),
            record.stamp.content_hash
        );

        Ok(())
    }
}
