//! Stage orchestration for the Vasari generation pipeline.
//!
//! This crate sequences pre-declared stages against a completion backend
//! and a keyed store: already-complete stages are read back instead of
//! re-executed, inapplicable stages are skipped (and the skip cascades to
//! their dependents), and a failed completion halts the run where a later
//! invocation with the same run id will resume it.
//!
//! # Example
//!
//! ```rust,ignore
//! use vasari_core::RunId;
//! use vasari_pipeline::{PipelineManifest, PipelineRunner};
//! use vasari_store::FileStore;
//! use vasari_client::HttpCompletion;
//!
//! # async fn example() -> vasari_error::VasariResult<()> {
//! let manifest = PipelineManifest::from_file("guide.toml")?;
//! let backend = HttpCompletion::from_env()?;
//! let store = FileStore::new("./state")?;
//!
//! let runner = PipelineRunner::new(backend, store);
//! let report = runner.run(&RunId::new("nightly-42"), manifest.pipeline()).await?;
//! println!("{}", report.overall);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod controller;
mod manifest;
mod runner;
mod stage;
mod template;

pub use controller::CompletionController;
pub use manifest::PipelineManifest;
pub use runner::{Pipeline, PipelineRunner};
pub use stage::{Applicability, GatheredInputs, PromptBuilder, StageSpec, StageSpecBuilder};
pub use template::resolve_template;
