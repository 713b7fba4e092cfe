//! Init/status/reset command implementations

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use super::open_db;

pub fn cmd_init(db_path: &Path) -> Result<()> {
    let db = open_db(db_path)?;
    println!("✅ Database initialized at {}", db.path());
    Ok(())
}

pub fn cmd_status(db_path: &Path) -> Result<()> {
    println!();
    println!("📊 resid Status");
    println!("   ─────────────────────────────────────────────");
    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = std::fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
        return Ok(());
    }

    let db = open_db(db_path)?;
    let summary = db.processor_summary()?;
    if summary.is_empty() {
        println!("   No records imported yet");
        return Ok(());
    }

    println!();
    println!(
        "   {:<12} {:>8}  {:<9} {:<9}",
        "Processor", "Records", "First", "Last"
    );
    for (processor, count, first, last) in &summary {
        println!(
            "   {:<12} {:>8}  {:<9} {:<9}",
            processor.as_str(),
            count,
            first,
            last
        );
    }
    Ok(())
}

pub fn cmd_reset(db_path: &Path, yes: bool) -> Result<()> {
    if !yes {
        print!("Delete ALL records from {}? [y/N] ", db_path.display());
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Aborted");
            return Ok(());
        }
    }

    let db = open_db(db_path)?;
    db.reset()?;
    println!("🗑️  All records deleted");
    Ok(())
}
