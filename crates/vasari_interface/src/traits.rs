//! Capability traits for the completion service and the keyed store.

use crate::StoreKey;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use vasari_error::{CompletionError, StoreError};

/// The external text-generation capability the pipeline calls.
///
/// Implementations map their transport failures onto
/// [`CompletionErrorKind`](vasari_error::CompletionErrorKind) so the call
/// controller can distinguish retryable from permanent failures. Model
/// identity, temperature, and other provider knobs are implementation
/// configuration.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generate text for a prompt within a size budget.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, CompletionError>;

    /// Backend name (e.g. "http", "scripted").
    fn backend_name(&self) -> &'static str;
}

/// Durable keyed store holding per-stage state with TTL expiry.
///
/// Keys are namespaced by run (`{run_id}:{stage_id}`); an expired entry
/// reads as absent. At most one current value exists per key and a write
/// overwrites unconditionally, so concurrent runs of the same run id are
/// last-write-wins.
#[async_trait]
pub trait StageStore: Send + Sync {
    /// Read the current value for a key, if present and unexpired.
    async fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write a value with a time-to-live, replacing any existing entry.
    async fn set(&self, key: &StoreKey, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: CompletionBackend + ?Sized> CompletionBackend for Arc<T> {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, CompletionError> {
        (**self).complete(prompt, max_tokens).await
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}

#[async_trait]
impl<T: StageStore + ?Sized> StageStore for Arc<T> {
    async fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &StoreKey, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError> {
        (**self).set(key, value, ttl).await
    }
}
