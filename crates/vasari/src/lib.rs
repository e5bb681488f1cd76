//! Vasari - Resumable Content-Generation Pipelines
//!
//! Vasari runs chains of stages, each calling a remote text-completion
//! service to produce part of a larger artifact. Its job is reliability
//! against an unreliable generator: responses wrapped in prose or cut off
//! mid-stream are recovered where possible, retried at a grown size budget
//! where not, and every completed stage is persisted so a re-invoked run
//! resumes instead of re-spending completion calls.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vasari::{FileStore, HttpCompletion, PipelineManifest, PipelineRunner, RunId};
//!
//! #[tokio::main]
//! async fn main() -> vasari::VasariResult<()> {
//!     let manifest = PipelineManifest::from_file("guide.toml")?;
//!     let backend = HttpCompletion::from_env()?;
//!     let store = FileStore::new("./state")?;
//!
//!     let runner = PipelineRunner::new(backend, store);
//!     let report = runner.run(&RunId::new("nightly-42"), manifest.pipeline()).await?;
//!     println!("{}", report.overall);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Vasari is organized as a workspace with focused crates:
//!
//! - `vasari_core` - Core data types (RunId, Schema, Record, BudgetPolicy)
//! - `vasari_interface` - CompletionBackend and StageStore trait seams
//! - `vasari_error` - Error types
//! - `vasari_extract` - Structured record extraction from free text
//! - `vasari_store` - Keyed store backends (memory, filesystem)
//! - `vasari_render` - Artifact rendering (JSON, narrative text, CSV)
//! - `vasari_pipeline` - Stage orchestration, retries, manifests
//! - `vasari_client` - Completion backend implementations
//!
//! This crate (`vasari`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use vasari_core::*;
pub use vasari_error::*;
pub use vasari_interface::*;

pub use vasari_client::{HttpCompletion, ScriptedCompletion};
pub use vasari_extract::extract_record;
pub use vasari_pipeline::{
    CompletionController, GatheredInputs, Pipeline, PipelineManifest, PipelineRunner, StageSpec,
    StageSpecBuilder, resolve_template,
};
pub use vasari_render::{
    ArtifactWriter, NarrativeSection, RenderPlan, RenderTarget, TabularPlan, render,
};
pub use vasari_store::{FileStore, MemoryStore};
