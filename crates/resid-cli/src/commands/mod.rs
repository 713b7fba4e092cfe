//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `import` - File import
//! - `metrics` - Monthly metric series
//! - `analyze` - Top merchants, concentration, cohort, at-risk, forecast
//! - `status` - Init/status/reset commands and shared utilities

pub mod analyze;
pub mod import;
pub mod metrics;
pub mod status;

pub use analyze::{cmd_at_risk, cmd_cohort, cmd_concentration, cmd_forecast, cmd_top};
pub use import::cmd_import;
pub use metrics::cmd_metrics;
pub use status::{cmd_init, cmd_reset, cmd_status};

use std::path::Path;

use anyhow::{Context, Result};
use resid_core::{CanonicalRecord, Database, Processor};

/// Open the database, creating it if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    Database::new(&db_path.to_string_lossy())
        .with_context(|| format!("Failed to open database: {}", db_path.display()))
}

/// Parse an optional processor scope argument
pub fn parse_scope(processor: Option<&str>) -> Result<Option<Processor>> {
    processor
        .map(|s| {
            s.parse::<Processor>().map_err(|_| {
                anyhow::anyhow!(
                    "Unknown processor: {}. Expected one of: {}",
                    s,
                    Processor::all()
                        .iter()
                        .map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
        })
        .transpose()
}

/// Records for a scope, with the scope label for display
pub fn scoped_records(
    db: &Database,
    processor: Option<&str>,
) -> Result<(Vec<CanonicalRecord>, String)> {
    let scope = parse_scope(processor)?;
    let records = db.list_records(scope, None, None)?;
    let label = scope.map(|p| p.to_string()).unwrap_or_else(|| "all".into());
    Ok((records, label))
}

/// Target month for single-month analyzers: explicit or latest in scope
pub fn target_month(
    db: &Database,
    processor: Option<&str>,
    month: Option<&str>,
) -> Result<String> {
    if let Some(month) = month {
        return resid_core::resolve_month(month)
            .ok_or_else(|| anyhow::anyhow!("Unparseable month: {}", month));
    }
    let scope = parse_scope(processor)?;
    db.distinct_months(scope)?
        .pop()
        .ok_or_else(|| anyhow::anyhow!("No records in scope; import something first"))
}
