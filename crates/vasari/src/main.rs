//! Vasari CLI binary.
//!
//! This binary provides command-line access to Vasari's functionality:
//! - Execute pipeline manifests against a completion endpoint
//! - Validate manifests without executing anything

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, RunOptions, run_pipeline, validate_manifest};
    use vasari_interface::RunStatus;

    // Load .env before reading backend configuration
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Execute the requested command
    match cli.command {
        Commands::Run {
            manifest,
            run_id,
            out,
            store_dir,
            ttl,
            endpoint,
        } => {
            let report = run_pipeline(RunOptions::new(
                manifest, run_id, out, store_dir, ttl, endpoint,
            ))
            .await?;

            if report.overall == RunStatus::Failed {
                if let Some(stage) = report.failing_stage() {
                    eprintln!(
                        "run halted at stage '{}': {}",
                        stage.stage_id,
                        stage.error.as_deref().unwrap_or("unknown error")
                    );
                }
                // Re-invoking with the same run id resumes at the failed stage
                std::process::exit(2);
            }
        }

        Commands::Validate { manifest } => {
            validate_manifest(&manifest)?;
        }
    }

    Ok(())
}
