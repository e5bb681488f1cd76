//! Filesystem-backed keyed store.
//!
//! One JSON envelope file per key under `{base}/{run_id}/{stage_id}.json`,
//! stamped with a wall-clock write time so TTLs survive process restarts.
//! Values must be JSON text; the orchestrator's stored envelopes always are.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vasari_error::{StoreError, StoreErrorKind};
use vasari_interface::{StageStore, StoreKey};

/// Persisted envelope for one key.
#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    stored_at: DateTime<Utc>,
    ttl_seconds: u64,
    payload: JsonValue,
}

impl FileEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.stored_at);
        age.num_seconds() >= 0 && age.num_seconds() as u64 > self.ttl_seconds
    }
}

/// Durable keyed store backed by the filesystem.
///
/// Writes are atomic (temp file + rename). Expired entries are removed on
/// read. A run interrupted between stages resumes from these files on the
/// next invocation, even from a different process.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a filesystem store rooted at `base_dir`.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    #[tracing::instrument(skip(base_dir))]
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_dir = base_dir.into();

        std::fs::create_dir_all(&base_dir).map_err(|e| {
            StoreError::new(StoreErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_dir.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_dir.display(), "Created filesystem store");
        Ok(Self { base_dir })
    }

    /// The file path holding a key's envelope.
    fn entry_path(&self, key: &StoreKey) -> PathBuf {
        self.base_dir
            .join(key.run_id.as_str())
            .join(format!("{}.json", key.stage_id))
    }
}

#[async_trait]
impl StageStore for FileStore {
    #[tracing::instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.entry_path(key);

        let contents = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::new(StoreErrorKind::Read(format!(
                    "{}: {}",
                    path.display(),
                    e
                ))));
            }
        };

        let entry: FileEntry = serde_json::from_slice(&contents)
            .map_err(|e| StoreError::new(StoreErrorKind::Codec(e.to_string())))?;

        if entry.is_expired(Utc::now()) {
            tracing::debug!(path = %path.display(), "Entry expired, removing");
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!(error = %e, "Failed to remove expired entry");
            }
            return Ok(None);
        }

        let payload = serde_json::to_vec(&entry.payload)
            .map_err(|e| StoreError::new(StoreErrorKind::Codec(e.to_string())))?;
        Ok(Some(payload))
    }

    #[tracing::instrument(skip(self, value), fields(key = %key, size = value.len()))]
    async fn set(&self, key: &StoreKey, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError> {
        let payload: JsonValue = serde_json::from_slice(&value).map_err(|e| {
            StoreError::new(StoreErrorKind::Codec(format!(
                "value is not JSON text: {}",
                e
            )))
        })?;

        let entry = FileEntry {
            stored_at: Utc::now(),
            ttl_seconds: ttl.as_secs(),
            payload,
        };

        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::new(StoreErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let contents = serde_json::to_vec_pretty(&entry)
            .map_err(|e| StoreError::new(StoreErrorKind::Codec(e.to_string())))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &contents).await.map_err(|e| {
            StoreError::new(StoreErrorKind::Write(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StoreError::new(StoreErrorKind::Write(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::debug!(path = %path.display(), ttl_seconds = ttl.as_secs(), "Stored entry");
        Ok(())
    }
}
