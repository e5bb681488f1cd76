//! Pipeline construction and the run loop.

use crate::{CompletionController, GatheredInputs, StageSpec};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use vasari_core::RunId;
use vasari_error::{PipelineError, PipelineErrorKind, VasariResult};
use vasari_interface::{
    CompletionBackend, RunReport, SkipReason, StageReport, StageStatus, StageStore, StoreKey,
    StoredValue,
};
use vasari_render::ArtifactWriter;

/// A validated, ordered set of stages.
///
/// Construction fails fast: ids must be unique and every dependency must
/// name a stage declared earlier in the list. No run starts on a malformed
/// pipeline.
#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<StageSpec>,
}

impl Pipeline {
    /// Validate and seal a stage list.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty list, a duplicate id, or a dependency
    /// that is unknown or not declared earlier.
    pub fn new(stages: Vec<StageSpec>) -> Result<Self, PipelineError> {
        if stages.is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::EmptyPipeline));
        }

        let mut earlier: HashSet<&str> = HashSet::new();
        for stage in &stages {
            if earlier.contains(stage.id()) {
                return Err(PipelineError::new(PipelineErrorKind::DuplicateStage(
                    stage.id().to_string(),
                )));
            }

            for dependency in stage.depends_on() {
                if earlier.contains(dependency.as_str()) {
                    continue;
                }
                let kind = if stages.iter().any(|s| s.id() == dependency.as_str()) {
                    PipelineErrorKind::ForwardDependency {
                        stage: stage.id().to_string(),
                        dependency: dependency.clone(),
                    }
                } else {
                    PipelineErrorKind::UnknownDependency {
                        stage: stage.id().to_string(),
                        dependency: dependency.clone(),
                    }
                };
                return Err(PipelineError::new(kind));
            }

            earlier.insert(stage.id());
        }

        Ok(Self { stages })
    }

    /// The stages in declared order.
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }
}

/// Executes pipelines against a completion backend and a keyed store.
///
/// Stages run strictly sequentially within one `run()`; later stages
/// consume earlier outputs. All store keys are namespaced by run id, so
/// distinct runs never contend. Two concurrent `run()` calls for the
/// *same* run id race on store writes under last-write-wins semantics;
/// callers needing at-most-one execution must serialize per run id
/// externally.
///
/// Interruption between stages is safe: persisted stages stay durable and
/// the next `run()` resumes after them. A stage that started but never
/// persisted is retried from scratch.
pub struct PipelineRunner<B, S> {
    backend: B,
    store: S,
    controller: CompletionController,
    writer: Option<ArtifactWriter>,
    ttl: Duration,
}

impl<B: CompletionBackend, S: StageStore> PipelineRunner<B, S> {
    /// Create a runner with a day-long default TTL and no artifact output.
    pub fn new(backend: B, store: S) -> Self {
        Self {
            backend,
            store,
            controller: CompletionController::new(),
            writer: None,
            ttl: Duration::from_secs(24 * 60 * 60),
        }
    }

    /// Write artifacts for each completed stage.
    pub fn with_writer(mut self, writer: ArtifactWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Override the TTL applied to persisted stage values.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Override the call controller (backoff tuning).
    pub fn with_controller(mut self, controller: CompletionController) -> Self {
        self.controller = controller;
        self
    }

    /// Execute pending stages of a pipeline under a run id.
    ///
    /// Already-persisted stages are reported from the store without
    /// re-execution. A completion failure halts the run at that stage and
    /// is recorded in the report; invoking `run()` again with the same run
    /// id resumes exactly there.
    ///
    /// # Errors
    ///
    /// Store failures are fatal and returned as errors — stage completion
    /// cannot be trusted without confirmed persistence. Completion
    /// failures are not errors at this level; they mark the stage `Failed`
    /// in the report.
    #[tracing::instrument(skip(self, pipeline), fields(run_id = %run_id, stage_count = pipeline.stages().len()))]
    pub async fn run(&self, run_id: &RunId, pipeline: &Pipeline) -> VasariResult<RunReport> {
        let mut reports: Vec<StageReport> = Vec::new();
        let mut seen: BTreeMap<String, StoredValue> = BTreeMap::new();
        let mut halted = false;

        for stage in pipeline.stages() {
            if halted {
                reports.push(StageReport::new(stage.id(), StageStatus::Pending));
                continue;
            }

            let key = StoreKey::new(run_id.clone(), stage.id());

            // Resume path: a non-expired entry means the stage already ran
            // (or was skipped) in an earlier invocation
            if let Some(bytes) = self.store.get(&key).await? {
                let value = StoredValue::from_bytes(&bytes)?;
                let status = match &value {
                    StoredValue::Record { .. } => StageStatus::Completed,
                    StoredValue::Skipped { reason } => StageStatus::from(*reason),
                };
                tracing::info!(stage = stage.id(), status = %status, "Stage already persisted, not re-executing");
                seen.insert(stage.id().to_string(), value);
                reports.push(StageReport::new(stage.id(), status));
                continue;
            }

            // Gather dependency records; a skipped dependency cascades
            let mut inputs = GatheredInputs::new();
            let mut skipped_dependency = None;
            for dependency in stage.depends_on() {
                match seen.get(dependency) {
                    Some(StoredValue::Record { record }) => {
                        inputs.insert(dependency.clone(), record.clone());
                    }
                    Some(StoredValue::Skipped { .. }) => {
                        skipped_dependency = Some(dependency.clone());
                        break;
                    }
                    None => {
                        return Err(PipelineError::new(
                            PipelineErrorKind::MissingDependencyValue {
                                stage: stage.id().to_string(),
                                dependency: dependency.clone(),
                            },
                        )
                        .into());
                    }
                }
            }

            if let Some(dependency) = skipped_dependency {
                tracing::info!(
                    stage = stage.id(),
                    dependency = %dependency,
                    "Dependency was skipped, skipping stage"
                );
                self.persist_skip(&key, SkipReason::DependencySkipped, &mut seen, stage.id())
                    .await?;
                reports.push(StageReport::new(stage.id(), StageStatus::SkippedByDependency));
                continue;
            }

            if !stage.is_applicable(&inputs) {
                tracing::info!(stage = stage.id(), "Stage not applicable, skipping");
                self.persist_skip(&key, SkipReason::NotApplicable, &mut seen, stage.id())
                    .await?;
                reports.push(StageReport::new(
                    stage.id(),
                    StageStatus::SkippedByApplicability,
                ));
                continue;
            }

            let prompt = match stage.build_prompt(&inputs) {
                Ok(prompt) => prompt,
                Err(e) => {
                    tracing::error!(stage = stage.id(), error = %e, "Prompt assembly failed");
                    reports.push(StageReport::failed(stage.id(), e.to_string()));
                    halted = true;
                    continue;
                }
            };

            tracing::info!(stage = stage.id(), "Executing stage");
            match self
                .controller
                .call(&self.backend, &prompt, stage.schema(), stage.budget())
                .await
            {
                Ok(record) => {
                    let value = StoredValue::Record {
                        record: record.clone(),
                    };
                    self.store.set(&key, value.to_bytes()?, self.ttl).await?;
                    seen.insert(stage.id().to_string(), value);

                    if let Some(writer) = &self.writer
                        && let Err(e) = writer
                            .write(run_id, stage.id(), &record, stage.render_plan())
                            .await
                    {
                        // Artifacts never gate stage completion
                        tracing::error!(
                            stage = stage.id(),
                            error = %e,
                            "Artifact write failed, continuing"
                        );
                    }

                    reports.push(StageReport::new(stage.id(), StageStatus::Completed));
                }
                Err(e) => {
                    tracing::error!(stage = stage.id(), error = %e, "Stage failed, halting run");
                    reports.push(StageReport::failed(stage.id(), e.to_string()));
                    halted = true;
                }
            }
        }

        let report = RunReport::from_stages(run_id.clone(), reports);
        tracing::info!(overall = %report.overall, "Run finished");
        Ok(report)
    }

    async fn persist_skip(
        &self,
        key: &StoreKey,
        reason: SkipReason,
        seen: &mut BTreeMap<String, StoredValue>,
        stage_id: &str,
    ) -> VasariResult<()> {
        let value = StoredValue::Skipped { reason };
        self.store.set(key, value.to_bytes()?, self.ttl).await?;
        seen.insert(stage_id.to_string(), value);
        Ok(())
    }

    /// The completion backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The keyed store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(id: &str, deps: &[&str]) -> StageSpec {
        StageSpec::builder(id)
            .depends_on(deps.iter().copied())
            .prompt_text("prompt")
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        let err = Pipeline::new(Vec::new()).unwrap_err();
        assert_eq!(err.kind, PipelineErrorKind::EmptyPipeline);
    }

    #[test]
    fn test_duplicate_stage_rejected() {
        let err = Pipeline::new(vec![stage("a", &[]), stage("a", &[])]).unwrap_err();
        assert_eq!(err.kind, PipelineErrorKind::DuplicateStage("a".to_string()));
    }

    #[test]
    fn test_forward_dependency_rejected() {
        let err = Pipeline::new(vec![stage("a", &["b"]), stage("b", &[])]).unwrap_err();
        assert!(matches!(
            err.kind,
            PipelineErrorKind::ForwardDependency { .. }
        ));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let err = Pipeline::new(vec![stage("a", &["ghost"])]).unwrap_err();
        assert!(matches!(
            err.kind,
            PipelineErrorKind::UnknownDependency { .. }
        ));
    }

    #[test]
    fn test_valid_chain_accepted() {
        let pipeline =
            Pipeline::new(vec![stage("a", &[]), stage("b", &["a"]), stage("c", &["a", "b"])])
                .unwrap();
        assert_eq!(pipeline.stages().len(), 3);
    }
}
