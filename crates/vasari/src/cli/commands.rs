//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vasari - resumable multi-stage content generation
#[derive(Parser, Debug)]
#[command(name = "vasari")]
#[command(about = "Resumable multi-stage content generation over completion backends", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a pipeline from a TOML manifest
    Run {
        /// Path to the pipeline manifest
        #[arg(long)]
        manifest: PathBuf,

        /// Run identifier; re-using one resumes that run (random if omitted)
        #[arg(long)]
        run_id: Option<String>,

        /// Directory for rendered artifacts
        #[arg(long, default_value = "./out")]
        out: PathBuf,

        /// Directory for durable stage state
        #[arg(long, default_value = "./state")]
        store_dir: PathBuf,

        /// TTL in seconds for persisted stage values
        #[arg(long, default_value = "86400")]
        ttl: u64,

        /// Completion endpoint URL (defaults to VASARI_COMPLETIONS_URL)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Check a manifest without executing anything
    Validate {
        /// Path to the pipeline manifest
        #[arg(long)]
        manifest: PathBuf,
    },
}
