//! Pipeline execution command handlers.

use std::path::{Path, PathBuf};
use std::time::Duration;
use vasari_client::HttpCompletion;
use vasari_core::RunId;
use vasari_error::VasariResult;
use vasari_interface::RunReport;
use vasari_pipeline::{PipelineManifest, PipelineRunner};
use vasari_render::ArtifactWriter;
use vasari_store::FileStore;

/// Options for a pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    manifest: PathBuf,
    run_id: Option<String>,
    out: PathBuf,
    store_dir: PathBuf,
    ttl: Duration,
    endpoint: Option<String>,
}

impl RunOptions {
    /// Assemble run options from CLI arguments.
    pub fn new(
        manifest: PathBuf,
        run_id: Option<String>,
        out: PathBuf,
        store_dir: PathBuf,
        ttl_seconds: u64,
        endpoint: Option<String>,
    ) -> Self {
        Self {
            manifest,
            run_id,
            out,
            store_dir,
            ttl: Duration::from_secs(ttl_seconds),
            endpoint,
        }
    }
}

/// Execute a pipeline manifest and print the per-stage outcome.
///
/// # Errors
///
/// Returns an error if the manifest is invalid, the backend cannot be
/// configured, or the store fails. A stage failure is not an error here;
/// it is recorded in the returned report.
pub async fn run_pipeline(options: RunOptions) -> VasariResult<RunReport> {
    let manifest = PipelineManifest::from_file(&options.manifest)?;

    let run_id = match &options.run_id {
        Some(id) => RunId::new(id.clone()),
        None => RunId::generate(),
    };

    let backend = match &options.endpoint {
        Some(endpoint) => HttpCompletion::new(endpoint.clone()),
        None => HttpCompletion::from_env()?,
    };

    let store = FileStore::new(&options.store_dir)?;
    let writer = ArtifactWriter::new(&options.out)?;

    tracing::info!(
        pipeline = manifest.name(),
        run_id = %run_id,
        stages = manifest.pipeline().stages().len(),
        "Starting run"
    );

    let runner = PipelineRunner::new(backend, store)
        .with_writer(writer)
        .with_ttl(options.ttl);
    let report = runner.run(&run_id, manifest.pipeline()).await?;

    println!("pipeline: {}", manifest.name());
    println!("run:      {}", report.run_id);
    for stage in &report.stages {
        match &stage.error {
            Some(error) => println!("  {:<24} {}  ({})", stage.stage_id, stage.status, error),
            None => println!("  {:<24} {}", stage.stage_id, stage.status),
        }
    }
    println!("overall:  {}", report.overall);

    Ok(report)
}

/// Load and validate a manifest without executing anything.
///
/// # Errors
///
/// Returns an error describing the first problem found in the manifest.
pub fn validate_manifest(path: &Path) -> VasariResult<()> {
    let manifest = PipelineManifest::from_file(path)?;

    println!("pipeline: {}", manifest.name());
    println!("          {}", manifest.description());
    for stage in manifest.pipeline().stages() {
        if stage.depends_on().is_empty() {
            println!("  {}", stage.id());
        } else {
            println!("  {} (after {})", stage.id(), stage.depends_on().join(", "));
        }
    }

    Ok(())
}
