//! Declarative render plans.

use serde::{Deserialize, Serialize};

/// One labeled block in the narrative projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct NarrativeSection {
    /// Heading shown above the block
    label: String,
    /// Dotted key path into the record
    path: String,
}

impl NarrativeSection {
    /// Create a section from a label and a key path.
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// Flattens a list-valued key path into fixed-column rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct TabularPlan {
    /// Dotted key path to the list
    path: String,
    /// Column keys read from each list element
    columns: Vec<String>,
}

impl TabularPlan {
    /// Create a tabular plan from a list path and its columns.
    pub fn new<I, S>(path: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// How a stage's record should be projected.
///
/// Authored per stage, usually in the pipeline manifest:
///
/// ```toml
/// [stages.outline.render]
/// narrative = [
///   { label = "Title", path = "title" },
///   { label = "Summary", path = "summary" },
/// ]
/// tabular = { path = "items", columns = ["name", "blurb"] }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_getters::Getters)]
pub struct RenderPlan {
    /// Ordered narrative sections; empty means no narrative projection
    #[serde(default)]
    narrative: Vec<NarrativeSection>,

    /// Tabular projection, if any
    #[serde(default)]
    tabular: Option<TabularPlan>,
}

impl RenderPlan {
    /// A plan with narrative sections.
    pub fn with_narrative<I>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = NarrativeSection>,
    {
        self.narrative.extend(sections);
        self
    }

    /// A plan with a tabular projection.
    pub fn with_tabular(mut self, tabular: TabularPlan) -> Self {
        self.tabular = Some(tabular);
        self
    }
}
