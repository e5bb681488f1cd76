//! Durable artifact output.

use crate::{render, RenderPlan, RenderTarget};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use vasari_core::{Record, RunId};
use vasari_error::{RenderError, RenderErrorKind};

/// Writes rendered artifacts under one directory per run, one subdirectory
/// per stage.
///
/// The structured form is always written; narrative and tabular forms are
/// written when the stage's plan declares them.
///
/// # Example layout
///
/// ```text
/// out/
/// └── nightly-42/
///     ├── outline/
///     │   ├── record.json
///     │   └── narrative.md
///     └── chapters/
///         ├── record.json
///         └── rows.csv
/// ```
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    out_dir: PathBuf,
}

impl ArtifactWriter {
    /// Create a writer rooted at `out_dir`.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    #[tracing::instrument(skip(out_dir))]
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self, RenderError> {
        let out_dir = out_dir.into();

        std::fs::create_dir_all(&out_dir).map_err(|e| {
            RenderError::new(RenderErrorKind::Io(format!(
                "{}: {}",
                out_dir.display(),
                e
            )))
        })?;

        tracing::info!(path = %out_dir.display(), "Created artifact directory");
        Ok(Self { out_dir })
    }

    /// The output directory root.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Render a stage's record and write the artifacts.
    ///
    /// Returns the paths written.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or any file write fails. Callers on
    /// the pipeline path log this and continue; artifacts never gate stage
    /// completion.
    #[tracing::instrument(skip(self, record, plan), fields(run_id = %run_id, stage_id))]
    pub async fn write(
        &self,
        run_id: &RunId,
        stage_id: &str,
        record: &Record,
        plan: &RenderPlan,
    ) -> Result<Vec<PathBuf>, RenderError> {
        let mut targets = BTreeSet::from([RenderTarget::Structured]);
        if !plan.narrative().is_empty() {
            targets.insert(RenderTarget::Narrative);
        }
        if plan.tabular().is_some() {
            targets.insert(RenderTarget::Tabular);
        }

        let outputs = render(record, plan, &targets)?;

        let stage_dir = self.out_dir.join(run_id.as_str()).join(stage_id);
        tokio::fs::create_dir_all(&stage_dir).await.map_err(|e| {
            RenderError::new(RenderErrorKind::Io(format!(
                "{}: {}",
                stage_dir.display(),
                e
            )))
        })?;

        let mut written = Vec::new();
        for (target, blob) in &outputs {
            let path = stage_dir.join(target.filename());
            tokio::fs::write(&path, blob).await.map_err(|e| {
                RenderError::new(RenderErrorKind::Io(format!("{}: {}", path.display(), e)))
            })?;
            written.push(path);
        }

        tracing::debug!(
            artifacts = written.len(),
            path = %stage_dir.display(),
            "Wrote stage artifacts"
        );
        Ok(written)
    }
}
