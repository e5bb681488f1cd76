//! Stage declarations and their gathered inputs.

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use vasari_core::{BudgetPolicy, Record, Schema};
use vasari_error::{PipelineError, PipelineErrorKind, VasariResult};
use vasari_render::RenderPlan;

/// Builds a stage's prompt from its gathered dependency records.
pub type PromptBuilder = Box<dyn Fn(&GatheredInputs) -> VasariResult<String> + Send + Sync>;

/// Decides whether a stage applies given its gathered dependency records.
pub type Applicability = Box<dyn Fn(&GatheredInputs) -> bool + Send + Sync>;

/// The dependency records available to one stage, keyed by stage id.
///
/// Cross-stage data flows through these values — stages share no process
/// state. Only a stage's declared dependencies appear here.
#[derive(Debug, Clone, Default)]
pub struct GatheredInputs {
    records: BTreeMap<String, Record>,
}

impl GatheredInputs {
    /// Create an empty input set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency record.
    pub fn insert(&mut self, stage_id: impl Into<String>, record: Record) {
        self.records.insert(stage_id.into(), record);
    }

    /// The record for a dependency, if gathered.
    pub fn record(&self, stage_id: &str) -> Option<&Record> {
        self.records.get(stage_id)
    }

    /// Navigate a `stage_id.path.to.field` reference.
    ///
    /// A bare `stage_id` resolves to the dependency's whole record.
    pub fn get_path(&self, reference: &str) -> Option<&JsonValue> {
        let (stage_id, rest) = match reference.split_once('.') {
            Some((stage_id, rest)) => (stage_id, Some(rest)),
            None => (reference, None),
        };

        let record = self.records.get(stage_id)?;
        match rest {
            Some(path) => record.get_path(path),
            None => Some(record.value()),
        }
    }

    /// Whether any dependency records were gathered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Declares one unit of pipeline work: its dependencies, how to build its
/// prompt, the schema its output must satisfy, its size budget, and an
/// optional applicability guard.
///
/// The set of stages is fixed at pipeline construction.
pub struct StageSpec {
    id: String,
    depends_on: Vec<String>,
    prompt_builder: PromptBuilder,
    schema: Schema,
    budget: BudgetPolicy,
    applicability: Option<Applicability>,
    render_plan: RenderPlan,
}

impl StageSpec {
    /// Start building a stage with the given id.
    pub fn builder(id: impl Into<String>) -> StageSpecBuilder {
        StageSpecBuilder::new(id)
    }

    /// The stage id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ids of the stages whose records this stage consumes, in order.
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    /// The schema the stage's output must satisfy.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The stage's size budget policy.
    pub fn budget(&self) -> &BudgetPolicy {
        &self.budget
    }

    /// How the stage's record is rendered to artifacts.
    pub fn render_plan(&self) -> &RenderPlan {
        &self.render_plan
    }

    /// Build the prompt from gathered inputs.
    ///
    /// # Errors
    ///
    /// Propagates the prompt builder's error (typically a template
    /// resolution failure).
    pub fn build_prompt(&self, inputs: &GatheredInputs) -> VasariResult<String> {
        (self.prompt_builder)(inputs)
    }

    /// Evaluate the applicability guard; stages without one always apply.
    pub fn is_applicable(&self, inputs: &GatheredInputs) -> bool {
        match &self.applicability {
            Some(guard) => guard(inputs),
            None => true,
        }
    }
}

impl std::fmt::Debug for StageSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageSpec")
            .field("id", &self.id)
            .field("depends_on", &self.depends_on)
            .field("prompt_builder", &"<closure>")
            .field("schema", &self.schema)
            .field("budget", &self.budget)
            .field("applicability", &self.applicability.as_ref().map(|_| "<closure>"))
            .field("render_plan", &self.render_plan)
            .finish()
    }
}

/// Builder for [`StageSpec`].
///
/// Hand-rolled because the prompt builder and applicability guard are
/// closures.
pub struct StageSpecBuilder {
    id: String,
    depends_on: Vec<String>,
    prompt_builder: Option<PromptBuilder>,
    schema: Schema,
    budget: BudgetPolicy,
    applicability: Option<Applicability>,
    render_plan: RenderPlan,
}

impl StageSpecBuilder {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            depends_on: Vec::new(),
            prompt_builder: None,
            schema: Schema::default(),
            budget: BudgetPolicy::default(),
            applicability: None,
            render_plan: RenderPlan::default(),
        }
    }

    /// Declare the stages whose records this stage consumes.
    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set the prompt builder.
    pub fn prompt<F>(mut self, builder: F) -> Self
    where
        F: Fn(&GatheredInputs) -> VasariResult<String> + Send + Sync + 'static,
    {
        self.prompt_builder = Some(Box::new(builder));
        self
    }

    /// Set a fixed prompt that ignores gathered inputs.
    pub fn prompt_text(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.prompt(move |_| Ok(text.clone()))
    }

    /// Set the output schema.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the size budget policy.
    pub fn budget(mut self, budget: BudgetPolicy) -> Self {
        self.budget = budget;
        self
    }

    /// Set the applicability guard.
    pub fn applicable_when<F>(mut self, guard: F) -> Self
    where
        F: Fn(&GatheredInputs) -> bool + Send + Sync + 'static,
    {
        self.applicability = Some(Box::new(guard));
        self
    }

    /// Set the render plan.
    pub fn render_plan(mut self, plan: RenderPlan) -> Self {
        self.render_plan = plan;
        self
    }

    /// Build the stage.
    ///
    /// # Errors
    ///
    /// Returns an error if no prompt builder was configured or the budget
    /// policy is invalid.
    pub fn build(self) -> Result<StageSpec, PipelineError> {
        let prompt_builder = self.prompt_builder.ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::PromptAssembly {
                stage: self.id.clone(),
                message: "no prompt builder configured".to_string(),
            })
        })?;

        self.budget.validate().map_err(|message| {
            PipelineError::new(PipelineErrorKind::InvalidBudget {
                stage: self.id.clone(),
                message,
            })
        })?;

        Ok(StageSpec {
            id: self.id,
            depends_on: self.depends_on,
            prompt_builder,
            schema: self.schema,
            budget: self.budget,
            applicability: self.applicability,
            render_plan: self.render_plan,
        })
    }
}
