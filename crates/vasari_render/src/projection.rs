//! Pure projections from records to output representations.

use crate::RenderPlan;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};
use vasari_core::Record;
use vasari_error::{RenderError, RenderErrorKind};

/// Marker emitted for a key path the record does not contain.
pub const NOT_AVAILABLE: &str = "(not available)";

/// The output representations a record can be projected into.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RenderTarget {
    /// Pretty-printed JSON of the whole record
    Structured,
    /// Labeled text blocks from the plan's narrative sections
    Narrative,
    /// Fixed-column CSV rows from the plan's tabular projection
    Tabular,
}

impl RenderTarget {
    /// Artifact filename for this target.
    pub fn filename(&self) -> &'static str {
        match self {
            RenderTarget::Structured => "record.json",
            RenderTarget::Narrative => "narrative.md",
            RenderTarget::Tabular => "rows.csv",
        }
    }
}

/// Project a record into the requested targets.
///
/// Missing key paths degrade the affected field to [`NOT_AVAILABLE`];
/// the render itself only fails if the record cannot be serialized at all.
///
/// # Errors
///
/// Returns a `RenderError` if JSON serialization fails.
///
/// # Examples
///
/// ```
/// use vasari_core::Record;
/// use vasari_render::{render, NarrativeSection, RenderPlan, RenderTarget};
/// use serde_json::json;
/// use std::collections::BTreeSet;
///
/// let record = Record::new(json!({"title": "Guide"}));
/// let plan = RenderPlan::default()
///     .with_narrative([NarrativeSection::new("Title", "title")]);
///
/// let outputs = render(
///     &record,
///     &plan,
///     &BTreeSet::from([RenderTarget::Narrative]),
/// ).unwrap();
/// assert!(outputs[&RenderTarget::Narrative].contains("Guide"));
/// ```
pub fn render(
    record: &Record,
    plan: &RenderPlan,
    targets: &BTreeSet<RenderTarget>,
) -> Result<BTreeMap<RenderTarget, String>, RenderError> {
    let mut outputs = BTreeMap::new();

    for target in targets {
        let blob = match target {
            RenderTarget::Structured => serde_json::to_string_pretty(record.value())
                .map_err(|e| RenderError::new(RenderErrorKind::Serialization(e.to_string())))?,
            RenderTarget::Narrative => render_narrative(record, plan),
            RenderTarget::Tabular => render_tabular(record, plan),
        };
        outputs.insert(*target, blob);
    }

    Ok(outputs)
}

/// Walk the plan's sections into labeled text blocks.
fn render_narrative(record: &Record, plan: &RenderPlan) -> String {
    let mut blocks = Vec::new();

    for section in plan.narrative() {
        let body = match record.get_path(section.path()) {
            Some(value) => format_value(value),
            None => NOT_AVAILABLE.to_string(),
        };
        blocks.push(format!("## {}\n\n{}", section.label(), body));
    }

    blocks.join("\n\n")
}

/// Flatten the designated list path into CSV rows.
fn render_tabular(record: &Record, plan: &RenderPlan) -> String {
    let Some(tabular) = plan.tabular() else {
        return String::new();
    };

    let mut lines = vec![tabular.columns().join(",")];

    let rows = record
        .get_path(tabular.path())
        .and_then(JsonValue::as_array)
        .cloned()
        .unwrap_or_default();

    for row in &rows {
        let cells: Vec<String> = tabular
            .columns()
            .iter()
            .map(|column| match row.get(column) {
                Some(value) => csv_escape(&format_scalar(value)),
                None => NOT_AVAILABLE.to_string(),
            })
            .collect();
        lines.push(cells.join(","));
    }

    lines.join("\n")
}

/// Human-readable form for a narrative block.
fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| format!("- {}", format_scalar(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        JsonValue::Object(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

/// Single-line form for list elements and table cells.
fn format_scalar(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn csv_escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NarrativeSection, TabularPlan};
    use serde_json::json;

    fn all_targets() -> BTreeSet<RenderTarget> {
        BTreeSet::from([
            RenderTarget::Structured,
            RenderTarget::Narrative,
            RenderTarget::Tabular,
        ])
    }

    #[test]
    fn test_structured_is_pretty_json() {
        let record = Record::new(json!({"title": "Guide"}));
        let outputs = render(
            &record,
            &RenderPlan::default(),
            &BTreeSet::from([RenderTarget::Structured]),
        )
        .unwrap();
        assert!(outputs[&RenderTarget::Structured].contains("\"title\": \"Guide\""));
    }

    #[test]
    fn test_narrative_blocks_in_plan_order() {
        let record = Record::new(json!({"title": "Guide", "summary": "Short."}));
        let plan = RenderPlan::default().with_narrative([
            NarrativeSection::new("Summary", "summary"),
            NarrativeSection::new("Title", "title"),
        ]);

        let outputs = render(&record, &plan, &BTreeSet::from([RenderTarget::Narrative])).unwrap();
        let narrative = &outputs[&RenderTarget::Narrative];
        assert!(narrative.find("## Summary").unwrap() < narrative.find("## Title").unwrap());
    }

    #[test]
    fn test_missing_path_degrades_to_marker() {
        let record = Record::new(json!({"title": "Guide"}));
        let plan =
            RenderPlan::default().with_narrative([NarrativeSection::new("Author", "meta.author")]);

        let outputs = render(&record, &plan, &all_targets()).unwrap();
        assert!(outputs[&RenderTarget::Narrative].contains(NOT_AVAILABLE));
    }

    #[test]
    fn test_tabular_rows_and_header() {
        let record = Record::new(json!({
            "items": [
                {"name": "Alpha", "blurb": "first"},
                {"name": "Beta"}
            ]
        }));
        let plan =
            RenderPlan::default().with_tabular(TabularPlan::new("items", ["name", "blurb"]));

        let outputs = render(&record, &plan, &BTreeSet::from([RenderTarget::Tabular])).unwrap();
        let lines: Vec<&str> = outputs[&RenderTarget::Tabular].lines().collect();
        assert_eq!(lines[0], "name,blurb");
        assert_eq!(lines[1], "Alpha,first");
        assert_eq!(lines[2], format!("Beta,{}", NOT_AVAILABLE));
    }

    #[test]
    fn test_csv_cells_with_commas_are_quoted() {
        let record = Record::new(json!({"items": [{"name": "a, b"}]}));
        let plan = RenderPlan::default().with_tabular(TabularPlan::new("items", ["name"]));

        let outputs = render(&record, &plan, &BTreeSet::from([RenderTarget::Tabular])).unwrap();
        assert!(outputs[&RenderTarget::Tabular].contains("\"a, b\""));
    }

    #[test]
    fn test_array_value_renders_as_bullets() {
        let record = Record::new(json!({"items": ["one", "two"]}));
        let plan = RenderPlan::default().with_narrative([NarrativeSection::new("Items", "items")]);

        let outputs = render(&record, &plan, &BTreeSet::from([RenderTarget::Narrative])).unwrap();
        assert!(outputs[&RenderTarget::Narrative].contains("- one"));
    }
}
