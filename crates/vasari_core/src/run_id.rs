//! Run identifiers for namespacing pipeline executions.

use serde::{Deserialize, Serialize};

/// Opaque identifier namespacing one pipeline execution's store keys.
///
/// A `RunId` is immutable once created. All store keys written during a run
/// are prefixed with it, so two runs never read each other's state.
///
/// # Examples
///
/// ```
/// use vasari_core::RunId;
///
/// let explicit = RunId::new("nightly-guide-42");
/// assert_eq!(explicit.as_str(), "nightly-guide-42");
///
/// let generated = RunId::generate();
/// assert!(!generated.as_str().is_empty());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[display("{}", _0)]
pub struct RunId(String);

impl RunId {
    /// Create a run id from a caller-supplied string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random run id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RunId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RunId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
