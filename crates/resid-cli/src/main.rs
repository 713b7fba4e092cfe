//! resid CLI - Merchant residual tracker
//!
//! Usage:
//!   resid init                      Initialize database
//!   resid import --file CSV         Import an export (auto-detects processor)
//!   resid metrics --processor p     Monthly retention/growth metrics
//!   resid forecast                  Project revenue three months ahead

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Import {
            file,
            processor,
            month,
        } => commands::cmd_import(
            &cli.db,
            &file,
            processor.as_deref(),
            month.as_deref(),
            cli.json,
        ),
        Commands::Metrics {
            processor,
            start,
            end,
        } => commands::cmd_metrics(
            &cli.db,
            processor.as_deref(),
            start.as_deref(),
            end.as_deref(),
            cli.json,
        ),
        Commands::Top {
            processor,
            month,
            count,
        } => commands::cmd_top(
            &cli.db,
            processor.as_deref(),
            month.as_deref(),
            count,
            cli.json,
        ),
        Commands::Concentration { processor, month } => {
            commands::cmd_concentration(&cli.db, processor.as_deref(), month.as_deref(), cli.json)
        }
        Commands::Cohort { processor } => {
            commands::cmd_cohort(&cli.db, processor.as_deref(), cli.json)
        }
        Commands::AtRisk { processor } => {
            commands::cmd_at_risk(&cli.db, processor.as_deref(), cli.json)
        }
        Commands::Forecast { processor } => {
            commands::cmd_forecast(&cli.db, processor.as_deref(), cli.json)
        }
        Commands::Status => commands::cmd_status(&cli.db),
        Commands::Reset { yes } => commands::cmd_reset(&cli.db, yes),
    }
}
