//! Import command implementation

use std::path::Path;

use anyhow::{Context, Result};
use resid_core::import_file;

use super::{open_db, parse_scope};

pub fn cmd_import(
    db_path: &Path,
    file: &Path,
    processor: Option<&str>,
    month: Option<&str>,
    json: bool,
) -> Result<()> {
    let processor = parse_scope(processor)?;

    let outcome = import_file(file, processor, month)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    let db = open_db(db_path)?;
    let stats = db.upsert_records(&outcome.records)?;
    tracing::debug!(
        "Upserted {} records: {:?}",
        outcome.records.len(),
        stats
    );

    if json {
        let summary = serde_json::json!({
            "success": outcome.success,
            "records": outcome.records.len(),
            "inserted": stats.inserted,
            "superseded": stats.superseded,
            "kept_existing": stats.kept_existing,
            "errors": outcome.errors,
            "warnings": outcome.warnings,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("📥 Imported {}", file.display());
    println!(
        "   {} records ({} new, {} superseded, {} unchanged)",
        outcome.records.len(),
        stats.inserted,
        stats.superseded,
        stats.kept_existing
    );

    for warning in &outcome.warnings {
        println!("   ⚠️  {}", warning);
    }
    for error in &outcome.errors {
        println!("   ❌ {}", error);
    }

    if !outcome.success {
        anyhow::bail!("Import produced no accepted records");
    }
    Ok(())
}
