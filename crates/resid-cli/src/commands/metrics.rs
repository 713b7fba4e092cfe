//! Metrics command implementation

use std::path::Path;

use anyhow::Result;
use resid_core::monthly_metrics_windowed;

use super::{open_db, scoped_records};

/// Normalize a window bound to canonical `YYYY-MM`; any accepted month
/// format works, garbage is an error rather than a silently empty window
fn resolve_bound(value: Option<&str>) -> Result<Option<String>> {
    value
        .map(|v| {
            resid_core::resolve_month(v)
                .ok_or_else(|| anyhow::anyhow!("Unparseable month: {}", v))
        })
        .transpose()
}

pub fn cmd_metrics(
    db_path: &Path,
    processor: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    json: bool,
) -> Result<()> {
    let start = resolve_bound(start)?;
    let end = resolve_bound(end)?;

    let db = open_db(db_path)?;
    let (records, label) = scoped_records(&db, processor)?;
    let series = monthly_metrics_windowed(&records, start.as_deref(), end.as_deref());

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    if series.is_empty() {
        println!("No metrics for scope '{}' in the requested window", label);
        return Ok(());
    }

    println!("📈 Monthly metrics ({})", label);
    println!(
        "   {:<8} {:>12} {:>9} {:>9} {:>6} {:>6} {:>10} {:>10}",
        "Month", "Revenue", "Accounts", "Retained", "Lost", "New", "Retention", "MoM"
    );
    for m in &series {
        let mom = m
            .mom_revenue_change_percent
            .map(|p| format!("{:+.1}%", p))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:<8} {:>12.2} {:>9} {:>9} {:>6} {:>6} {:>9.1}% {:>10}",
            m.month,
            m.total_revenue,
            m.total_accounts,
            m.retained_accounts,
            m.lost_accounts,
            m.new_accounts,
            m.retention_rate,
            mom
        );
    }
    Ok(())
}
