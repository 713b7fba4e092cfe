//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// resid - Track merchant residuals across payment processors
#[derive(Parser)]
#[command(name = "resid")]
#[command(about = "Merchant residual ingestion and metrics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "resid.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import a processor export (CSV or XLSX)
    Import {
        /// File to import
        #[arg(short, long)]
        file: PathBuf,

        /// Processor (auto-detected from the filename if not specified)
        #[arg(short, long)]
        processor: Option<String>,

        /// Month for sheets without a month column (any accepted format)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Monthly retention/attrition/growth metrics
    Metrics {
        /// Processor scope (all processors if not specified)
        #[arg(short, long)]
        processor: Option<String>,

        /// First displayed month (YYYY-MM); retention stays anchored to
        /// the month before
        #[arg(long)]
        start: Option<String>,

        /// Last displayed month (YYYY-MM)
        #[arg(long)]
        end: Option<String>,
    },

    /// Top merchants by revenue for one month
    Top {
        #[arg(short, long)]
        processor: Option<String>,

        /// Target month (defaults to the latest month in scope)
        #[arg(short, long)]
        month: Option<String>,

        /// How many merchants to list
        #[arg(short, long, default_value_t = 10)]
        count: usize,
    },

    /// Top-10 revenue concentration for one month
    Concentration {
        #[arg(short, long)]
        processor: Option<String>,

        #[arg(short, long)]
        month: Option<String>,
    },

    /// New and lost merchants between the two most recent months
    Cohort {
        #[arg(short, long)]
        processor: Option<String>,
    },

    /// Merchants with declining revenue
    AtRisk {
        #[arg(short, long)]
        processor: Option<String>,
    },

    /// Project revenue three months ahead
    Forecast {
        #[arg(short, long)]
        processor: Option<String>,
    },

    /// Show record counts and month spans
    Status,

    /// Delete all records (schema is preserved)
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
