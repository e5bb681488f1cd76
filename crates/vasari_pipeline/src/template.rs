//! Prompt template resolution.
//!
//! Manifest-declared prompts reference run parameters and dependency
//! records with `{{...}}` placeholders:
//!
//! - `{{params.topic}}` — a run parameter
//! - `{{outline}}` — a dependency's whole record as compact JSON
//! - `{{outline.meta.title}}` — a field inside a dependency record

use crate::GatheredInputs;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use vasari_error::{PipelineError, PipelineErrorKind, VasariResult};

/// Resolve `{{...}}` placeholders against run parameters and gathered
/// dependency records.
///
/// # Errors
///
/// Returns an error if a placeholder references an unknown parameter or a
/// path absent from the gathered records; a prompt is never sent with an
/// unresolved hole in it.
///
/// # Examples
///
/// ```
/// use vasari_pipeline::{resolve_template, GatheredInputs};
/// use vasari_core::Record;
/// use serde_json::json;
/// use std::collections::BTreeMap;
///
/// let mut inputs = GatheredInputs::new();
/// inputs.insert("outline", Record::new(json!({"title": "Lisbon"})));
/// let params = BTreeMap::from([("tone".to_string(), json!("breezy"))]);
///
/// let prompt = resolve_template(
///     "Expand {{outline.title}} in a {{params.tone}} tone.",
///     &params,
///     &inputs,
/// ).unwrap();
/// assert_eq!(prompt, "Expand Lisbon in a breezy tone.");
/// ```
pub fn resolve_template(
    template: &str,
    params: &BTreeMap<String, JsonValue>,
    inputs: &GatheredInputs,
) -> VasariResult<String> {
    let re = regex::Regex::new(r"\{\{([^}]+)\}\}").map_err(|e| {
        PipelineError::new(PipelineErrorKind::Template(format!(
            "Invalid template regex: {}",
            e
        )))
    })?;

    let mut result = template.to_string();

    for cap in re.captures_iter(template) {
        let placeholder = &cap[0];
        let reference = cap[1].trim();

        let value = lookup_reference(reference, params, inputs).ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::Template(format!(
                "Reference '{}' not found in parameters or gathered inputs",
                reference
            )))
        })?;

        result = result.replace(placeholder, &render_value(&value)?);
    }

    Ok(result)
}

/// Look up a placeholder reference, in parameters (`params.` prefix) or in
/// gathered dependency records.
pub(crate) fn lookup_reference(
    reference: &str,
    params: &BTreeMap<String, JsonValue>,
    inputs: &GatheredInputs,
) -> Option<JsonValue> {
    if let Some(param_path) = reference.strip_prefix("params.") {
        let (key, rest) = match param_path.split_once('.') {
            Some((key, rest)) => (key, Some(rest)),
            None => (param_path, None),
        };
        let mut current = params.get(key)?;
        if let Some(rest) = rest {
            for segment in rest.split('.') {
                current = current.get(segment)?;
            }
        }
        return Some(current.clone());
    }

    inputs.get_path(reference).cloned()
}

/// Convert a resolved value to its prompt text form.
fn render_value(value: &JsonValue) -> VasariResult<String> {
    Ok(match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => "null".to_string(),
        other => serde_json::to_string(other).map_err(|e| {
            PipelineError::new(PipelineErrorKind::Template(format!(
                "Failed to serialize referenced value: {}",
                e
            )))
        })?,
    })
}
