//! In-memory keyed store with TTL expiry.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use vasari_error::StoreError;
use vasari_interface::{StageStore, StoreKey};

/// Store entry with value and expiration.
#[derive(Debug, Clone)]
struct MemoryEntry {
    value: Vec<u8>,
    created_at: Instant,
    ttl: Duration,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// In-process keyed store.
///
/// Entries expire on read. Intended for tests and single-process runs;
/// nothing survives the process.
///
/// # Example
///
/// ```
/// use vasari_store::MemoryStore;
/// use vasari_interface::{StageStore, StoreKey};
/// use vasari_core::RunId;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), vasari_error::StoreError> {
/// let store = MemoryStore::new();
/// let key = StoreKey::new(RunId::new("run-1"), "outline");
///
/// store.set(&key, b"payload".to_vec(), Duration::from_secs(60)).await?;
/// assert!(store.get(&key).await?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StageStore for MemoryStore {
    #[tracing::instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>, StoreError> {
        let mut entries = self.entries.lock().await;
        let text_key = key.to_string();

        match entries.get(&text_key) {
            Some(entry) if entry.is_expired() => {
                tracing::debug!("Entry expired, removing");
                entries.remove(&text_key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self, value), fields(key = %key, size = value.len()))]
    async fn set(&self, key: &StoreKey, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value,
                created_at: Instant::now(),
                ttl,
            },
        );
        Ok(())
    }
}
