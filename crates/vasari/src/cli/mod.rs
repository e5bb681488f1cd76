//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the
//! vasari binary.

mod commands;
mod run;

pub use commands::{Cli, Commands};
pub use run::{RunOptions, run_pipeline, validate_manifest};
