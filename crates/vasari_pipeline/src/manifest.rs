//! TOML pipeline manifests.
//!
//! A pipeline can be declared as data instead of code:
//!
//! ```toml
//! [pipeline]
//! name = "city-guide"
//! description = "Multi-stage travel guide generation"
//!
//! [params]
//! city = "Lisbon"
//!
//! [toc]
//! order = ["outline", "chapters"]
//!
//! [stages.outline]
//! prompt = "Outline a travel guide to {{params.city}}. Output ONLY valid JSON."
//!
//! [stages.outline.schema]
//! required = ["title", "chapters"]
//!
//! [stages.chapters]
//! prompt = "Expand {{outline.title}} chapter by chapter."
//! depends_on = ["outline"]
//! when = "outline.chapters"
//!
//! [stages.chapters.budget]
//! initial = 4096
//! ```
//!
//! Prompts are `{{...}}` templates over run parameters and dependency
//! records; `when` guards applicability on a key path being present and
//! truthy.

use crate::template::{lookup_reference, resolve_template};
use crate::{Pipeline, StageSpec};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use vasari_core::{BudgetPolicy, Schema};
use vasari_error::{ManifestError, ManifestErrorKind, VasariError, VasariResult};
use vasari_render::RenderPlan;

/// Pipeline metadata from the `[pipeline]` section.
#[derive(Debug, Clone, Deserialize)]
struct PipelineMeta {
    name: String,
    description: String,
}

/// Stage order from the `[toc]` section.
#[derive(Debug, Clone, Deserialize)]
struct Toc {
    order: Vec<String>,
}

/// One `[stages.<id>]` table.
#[derive(Debug, Clone, Deserialize)]
struct StageDoc {
    prompt: String,
    #[serde(default)]
    depends_on: Vec<String>,
    #[serde(default)]
    schema: Schema,
    #[serde(default)]
    budget: BudgetPolicy,
    #[serde(default)]
    when: Option<String>,
    #[serde(default)]
    render: RenderPlan,
}

/// Raw manifest document.
#[derive(Debug, Clone, Deserialize)]
struct ManifestDoc {
    pipeline: PipelineMeta,
    toc: Toc,
    #[serde(default)]
    params: BTreeMap<String, JsonValue>,
    stages: BTreeMap<String, StageDoc>,
}

/// A pipeline loaded from a TOML manifest.
#[derive(Debug)]
pub struct PipelineManifest {
    name: String,
    description: String,
    params: BTreeMap<String, JsonValue>,
    pipeline: Pipeline,
}

impl PipelineManifest {
    /// Load a manifest from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is invalid,
    /// or validation fails (empty order, missing stages, bad
    /// dependencies).
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file<P: AsRef<Path>>(path: P) -> VasariResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ManifestError::new(ManifestErrorKind::FileRead(e.to_string())))?;
        content.parse()
    }

    /// The pipeline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description of what this pipeline produces.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Run parameters declared in the manifest.
    pub fn params(&self) -> &BTreeMap<String, JsonValue> {
        &self.params
    }

    /// The validated pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

impl FromStr for PipelineManifest {
    type Err = VasariError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let doc: ManifestDoc = toml::from_str(content)
            .map_err(|e| ManifestError::new(ManifestErrorKind::TomlParse(e.to_string())))?;

        if doc.toc.order.is_empty() {
            return Err(ManifestError::new(ManifestErrorKind::EmptyToc).into());
        }
        for id in &doc.toc.order {
            if !doc.stages.contains_key(id) {
                return Err(
                    ManifestError::new(ManifestErrorKind::MissingStage(id.clone())).into(),
                );
            }
        }
        for id in doc.stages.keys() {
            if !doc.toc.order.contains(id) {
                return Err(
                    ManifestError::new(ManifestErrorKind::UnlistedStage(id.clone())).into(),
                );
            }
        }

        let mut specs = Vec::with_capacity(doc.toc.order.len());
        for id in &doc.toc.order {
            let stage = &doc.stages[id];
            if stage.prompt.trim().is_empty() {
                return Err(
                    ManifestError::new(ManifestErrorKind::EmptyPrompt(id.clone())).into(),
                );
            }

            let template = stage.prompt.clone();
            let params = doc.params.clone();
            let mut builder = StageSpec::builder(id.clone())
                .depends_on(stage.depends_on.iter().cloned())
                .prompt(move |inputs| resolve_template(&template, &params, inputs))
                .schema(stage.schema.clone())
                .budget(stage.budget.clone())
                .render_plan(stage.render.clone());

            if let Some(when) = &stage.when {
                let when = when.clone();
                let params = doc.params.clone();
                builder = builder.applicable_when(move |inputs| {
                    match lookup_reference(&when, &params, inputs) {
                        Some(JsonValue::Null) | None => false,
                        Some(JsonValue::Bool(flag)) => flag,
                        Some(_) => true,
                    }
                });
            }

            specs.push(builder.build()?);
        }

        let pipeline = Pipeline::new(specs)?;
        tracing::debug!(
            name = %doc.pipeline.name,
            stages = pipeline.stages().len(),
            "Loaded pipeline manifest"
        );

        Ok(Self {
            name: doc.pipeline.name,
            description: doc.pipeline.description,
            params: doc.params,
            pipeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatheredInputs;
    use serde_json::json;
    use vasari_core::Record;
    use vasari_error::VasariErrorKind;

    const VALID: &str = r#"
        [pipeline]
        name = "city-guide"
        description = "Guide generation"

        [params]
        city = "Lisbon"

        [toc]
        order = ["outline", "chapters"]

        [stages.outline]
        prompt = "Outline a guide to {{params.city}}."

        [stages.outline.schema]
        required = ["title", "chapters"]

        [stages.chapters]
        prompt = "Expand {{outline.title}}."
        depends_on = ["outline"]
        when = "outline.chapters"

        [stages.chapters.budget]
        initial = 4096
        max_attempts = 4
    "#;

    #[test]
    fn test_valid_manifest_loads() {
        let manifest: PipelineManifest = VALID.parse().unwrap();
        assert_eq!(manifest.name(), "city-guide");
        assert_eq!(manifest.pipeline().stages().len(), 2);

        let chapters = &manifest.pipeline().stages()[1];
        assert_eq!(chapters.depends_on(), ["outline"]);
        assert_eq!(*chapters.budget().initial(), 4096);
        assert_eq!(*chapters.budget().max_attempts(), 4);
    }

    #[test]
    fn test_prompt_template_uses_params() {
        let manifest: PipelineManifest = VALID.parse().unwrap();
        let outline = &manifest.pipeline().stages()[0];
        let prompt = outline.build_prompt(&GatheredInputs::new()).unwrap();
        assert_eq!(prompt, "Outline a guide to Lisbon.");
    }

    #[test]
    fn test_when_guard_checks_path() {
        let manifest: PipelineManifest = VALID.parse().unwrap();
        let chapters = &manifest.pipeline().stages()[1];

        let mut with_chapters = GatheredInputs::new();
        with_chapters.insert(
            "outline",
            Record::new(json!({"title": "X", "chapters": ["intro"]})),
        );
        assert!(chapters.is_applicable(&with_chapters));

        let mut without = GatheredInputs::new();
        without.insert("outline", Record::new(json!({"title": "X", "chapters": null})));
        assert!(!chapters.is_applicable(&without));

        let mut flagged_off = GatheredInputs::new();
        flagged_off.insert(
            "outline",
            Record::new(json!({"title": "X", "chapters": false})),
        );
        assert!(!chapters.is_applicable(&flagged_off));
    }

    #[test]
    fn test_empty_order_rejected() {
        let content = r#"
            [pipeline]
            name = "p"
            description = "d"

            [toc]
            order = []

            [stages.a]
            prompt = "x"
        "#;
        let err = content.parse::<PipelineManifest>().unwrap_err();
        assert!(matches!(err.kind(), VasariErrorKind::Manifest(_)));
    }

    #[test]
    fn test_order_referencing_missing_stage_rejected() {
        let content = r#"
            [pipeline]
            name = "p"
            description = "d"

            [toc]
            order = ["ghost"]
        "#;
        // No [stages] table at all also fails the parse; give it one
        let content = format!("{content}\n[stages.other]\nprompt = \"x\"\n");
        assert!(content.parse::<PipelineManifest>().is_err());
    }

    #[test]
    fn test_defined_but_unlisted_stage_rejected() {
        let content = r#"
            [pipeline]
            name = "p"
            description = "d"

            [toc]
            order = ["a"]

            [stages.a]
            prompt = "x"

            [stages.orphan]
            prompt = "y"
        "#;
        assert!(content.parse::<PipelineManifest>().is_err());
    }

    #[test]
    fn test_empty_prompt_rejected() {
        let content = r#"
            [pipeline]
            name = "p"
            description = "d"

            [toc]
            order = ["a"]

            [stages.a]
            prompt = "   "
        "#;
        assert!(content.parse::<PipelineManifest>().is_err());
    }

    #[test]
    fn test_forward_dependency_rejected_at_load() {
        let content = r#"
            [pipeline]
            name = "p"
            description = "d"

            [toc]
            order = ["a", "b"]

            [stages.a]
            prompt = "x"
            depends_on = ["b"]

            [stages.b]
            prompt = "y"
        "#;
        let err = content.parse::<PipelineManifest>().unwrap_err();
        assert!(matches!(err.kind(), VasariErrorKind::Pipeline(_)));
    }
}
