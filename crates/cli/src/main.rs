//! # Telemetry Hub CLI
//!
//! Command-line entry point.
//!
//! Loads `.env`, sets up logging, then runs `serve`, `validate` or `info`.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use observability::LoggingConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_serve, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry Hub starting"
    );

    let result = match &cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
///
/// Metrics are installed later by `serve`, once the configuration is known.
fn init_logging(cli: &Cli) -> Result<()> {
    let config = LoggingConfig::for_verbosity(cli.quiet, cli.verbose)
        .with_format(cli.log_format.into());
    observability::init_logging(&config)
}
