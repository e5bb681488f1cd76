//! Store keys and the persisted value envelope.

use serde::{Deserialize, Serialize};
use vasari_core::{Record, RunId};
use vasari_error::{StoreError, StoreErrorKind};

/// Addresses one stage's state within one run.
///
/// # Examples
///
/// ```
/// use vasari_interface::StoreKey;
/// use vasari_core::RunId;
///
/// let key = StoreKey::new(RunId::new("run-1"), "outline");
/// assert_eq!(format!("{}", key), "run-1:outline");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{}:{}", run_id, stage_id)]
pub struct StoreKey {
    /// The run namespace
    pub run_id: RunId,
    /// The stage within the run
    pub stage_id: String,
}

impl StoreKey {
    /// Create a key for a stage within a run.
    pub fn new(run_id: RunId, stage_id: impl Into<String>) -> Self {
        Self {
            run_id,
            stage_id: stage_id.into(),
        }
    }
}

/// Why a stage was persisted without executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The stage's applicability predicate returned false
    NotApplicable,
    /// A dependency of the stage was itself skipped
    DependencySkipped,
}

/// The envelope persisted for a completed or skipped stage.
///
/// Keeping the skip reason in the sentinel lets a resumed run report the
/// same status the original run recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredValue {
    /// A schema-validated result record
    Record {
        /// The extracted record
        record: Record,
    },
    /// The skip sentinel
    Skipped {
        /// Why the stage did not execute
        reason: SkipReason,
    },
}

impl StoredValue {
    /// Serialize the envelope for storage.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(self)
            .map_err(|e| StoreError::new(StoreErrorKind::Codec(e.to_string())))
    }

    /// Decode an envelope read back from storage.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the bytes are not a valid envelope.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        serde_json::from_slice(bytes)
            .map_err(|e| StoreError::new(StoreErrorKind::Codec(e.to_string())))
    }

    /// The record, if this envelope holds one.
    pub fn record(&self) -> Option<&Record> {
        match self {
            StoredValue::Record { record } => Some(record),
            StoredValue::Skipped { .. } => None,
        }
    }

    /// Whether this envelope is the skip sentinel.
    pub fn is_skipped(&self) -> bool {
        matches!(self, StoredValue::Skipped { .. })
    }
}
