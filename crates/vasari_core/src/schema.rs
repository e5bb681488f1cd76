//! Schema descriptors for stage outputs.
//!
//! A schema is a pure-data declaration of the keys a stage's extracted
//! record must contain. Validation happens once, at the extractor boundary;
//! downstream code accesses fields by contract instead of defensive
//! `.get(key)` checks.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Declares the required and optional keys of a stage's output record.
///
/// Nested schemas describe the shape of sub-objects. A key with a nested
/// schema is validated recursively whenever it is present; a required key
/// must additionally be present and non-null itself.
///
/// # Examples
///
/// ```
/// use vasari_core::Schema;
/// use serde_json::json;
///
/// let schema = Schema::new(["title", "items"])
///     .with_optional(["subtitle"])
///     .with_nested("meta", Schema::new(["author"]));
///
/// let complete = json!({"title": "X", "items": [1, 2, 3]});
/// assert!(schema.missing_paths(&complete).is_empty());
///
/// let partial = json!({"title": "X", "meta": {}});
/// assert_eq!(schema.missing_paths(&partial), vec!["items", "meta.author"]);
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct Schema {
    /// Keys that must be present and non-null
    #[serde(default)]
    required: Vec<String>,

    /// Keys that may be absent without failing validation
    #[serde(default)]
    optional: Vec<String>,

    /// Schemas for sub-objects, keyed by field name
    #[serde(default)]
    nested: BTreeMap<String, Schema>,
}

impl Schema {
    /// Create a schema from its required keys.
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            optional: Vec::new(),
            nested: BTreeMap::new(),
        }
    }

    /// Add optional keys.
    pub fn with_optional<I, S>(mut self, optional: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional.extend(optional.into_iter().map(Into::into));
        self
    }

    /// Add a nested schema for a sub-object key.
    pub fn with_nested(mut self, key: impl Into<String>, schema: Schema) -> Self {
        self.nested.insert(key.into(), schema);
        self
    }

    /// Collect the dotted paths of required keys that are absent or null.
    ///
    /// An empty result means the value satisfies the schema. Nested schemas
    /// recurse into sub-objects that are present; a required sub-object that
    /// is absent reports its own path, not its children.
    pub fn missing_paths(&self, value: &JsonValue) -> Vec<String> {
        let mut missing = Vec::new();
        self.collect_missing(value, "", &mut missing);
        missing
    }

    fn collect_missing(&self, value: &JsonValue, prefix: &str, missing: &mut Vec<String>) {
        for key in &self.required {
            let path = join_path(prefix, key);
            match value.get(key) {
                None | Some(JsonValue::Null) => missing.push(path),
                Some(child) => {
                    if let Some(nested) = self.nested.get(key) {
                        nested.collect_missing(child, &path, missing);
                    }
                }
            }
        }

        // Nested schemas under non-required keys apply whenever the key is
        // present; an absent optional sub-object is not a violation
        for (key, nested) in &self.nested {
            if self.required.contains(key) {
                continue;
            }
            if let Some(child) = value.get(key)
                && !child.is_null()
            {
                nested.collect_missing(child, &join_path(prefix, key), missing);
            }
        }
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_schema_complete() {
        let schema = Schema::new(["title", "items"]);
        let value = json!({"title": "X", "items": [1, 2, 3]});
        assert!(schema.missing_paths(&value).is_empty());
    }

    #[test]
    fn test_flat_schema_missing_key() {
        let schema = Schema::new(["title", "items"]);
        let value = json!({"title": "X"});
        assert_eq!(schema.missing_paths(&value), vec!["items"]);
    }

    #[test]
    fn test_null_counts_as_missing() {
        let schema = Schema::new(["title"]);
        let value = json!({"title": null});
        assert_eq!(schema.missing_paths(&value), vec!["title"]);
    }

    #[test]
    fn test_nested_required_path() {
        let schema = Schema::new(["meta"]).with_nested("meta", Schema::new(["author", "year"]));
        let value = json!({"meta": {"author": "Anon"}});
        assert_eq!(schema.missing_paths(&value), vec!["meta.year"]);
    }

    #[test]
    fn test_absent_required_subobject_reports_own_path() {
        let schema = Schema::new(["meta"]).with_nested("meta", Schema::new(["author"]));
        let value = json!({});
        assert_eq!(schema.missing_paths(&value), vec!["meta"]);
    }

    #[test]
    fn test_optional_subobject_validated_when_present() {
        let schema = Schema::new(["title"])
            .with_optional(["meta"])
            .with_nested("meta", Schema::new(["author"]));

        let without = json!({"title": "X"});
        assert!(schema.missing_paths(&without).is_empty());

        let with_incomplete = json!({"title": "X", "meta": {}});
        assert_eq!(schema.missing_paths(&with_incomplete), vec!["meta.author"]);
    }

    #[test]
    fn test_non_object_value_misses_everything() {
        let schema = Schema::new(["title", "items"]);
        let value = json!([1, 2, 3]);
        assert_eq!(schema.missing_paths(&value), vec!["title", "items"]);
    }

    #[test]
    fn test_schema_from_toml() {
        let schema: Schema = toml::from_str(
            r#"
            required = ["title", "items"]
            optional = ["subtitle"]

            [nested.meta]
            required = ["author"]
            "#,
        )
        .unwrap();

        assert_eq!(schema.required().len(), 2);
        assert!(schema.nested().contains_key("meta"));
    }
}
