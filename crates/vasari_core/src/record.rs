//! Schema-validated records extracted from completion responses.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use vasari_error::{JsonError, VasariResult};

/// A structured record recovered from free text and validated against a
/// [`Schema`](crate::Schema).
///
/// Records are produced by the extractor and owned by the orchestrator once
/// persisted; dependent stages receive them read-only. Field access goes
/// through [`Record::get_path`] with dotted paths, mirroring how prompt
/// templates reference them.
///
/// # Examples
///
/// ```
/// use vasari_core::Record;
/// use serde_json::json;
///
/// let record = Record::new(json!({"meta": {"author": "Anon"}, "items": [1, 2]}));
/// assert_eq!(record.get_path("meta.author"), Some(&json!("Anon")));
/// assert_eq!(record.get_path("meta.missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(JsonValue);

impl Record {
    /// Wrap an already-validated JSON value.
    pub fn new(value: JsonValue) -> Self {
        Self(value)
    }

    /// The underlying JSON value.
    pub fn value(&self) -> &JsonValue {
        &self.0
    }

    /// Consume the record, returning the underlying JSON value.
    pub fn into_value(self) -> JsonValue {
        self.0
    }

    /// Navigate a dotted key path into the record.
    ///
    /// Returns `None` if any segment is absent or the intermediate value is
    /// not an object.
    pub fn get_path(&self, path: &str) -> Option<&JsonValue> {
        let mut current = &self.0;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current)
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns a `JsonError` if serialization fails.
    pub fn to_compact(&self) -> VasariResult<String> {
        serde_json::to_string(&self.0)
            .map_err(|e| JsonError::new(format!("Failed to serialize record: {}", e)).into())
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a `JsonError` if serialization fails.
    pub fn to_pretty(&self) -> VasariResult<String> {
        serde_json::to_string_pretty(&self.0)
            .map_err(|e| JsonError::new(format!("Failed to serialize record: {}", e)).into())
    }
}

impl From<JsonValue> for Record {
    fn from(value: JsonValue) -> Self {
        Self(value)
    }
}
