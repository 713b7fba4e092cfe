//! Analyzer command implementations (top, concentration, cohort, at-risk,
//! forecast)

use std::path::Path;

use anyhow::Result;
use resid_core::{
    at_risk_merchants, cohort_change, forecast_revenue, monthly_metrics, revenue_concentration,
    top_merchants,
};

use super::{open_db, scoped_records, target_month};

pub fn cmd_top(
    db_path: &Path,
    processor: Option<&str>,
    month: Option<&str>,
    count: usize,
    json: bool,
) -> Result<()> {
    let db = open_db(db_path)?;
    let month = target_month(&db, processor, month)?;
    let (records, label) = scoped_records(&db, processor)?;
    let top = top_merchants(&records, &month, count);

    if json {
        println!("{}", serde_json::to_string_pretty(&top)?);
        return Ok(());
    }

    println!("🏆 Top {} merchants for {} ({})", count, month, label);
    for (rank, m) in top.iter().enumerate() {
        println!(
            "   {:>2}. {:<30} {:>12.2}  {:>5.1}%",
            rank + 1,
            m.merchant_name,
            m.revenue,
            m.percent_of_total
        );
    }
    Ok(())
}

pub fn cmd_concentration(
    db_path: &Path,
    processor: Option<&str>,
    month: Option<&str>,
    json: bool,
) -> Result<()> {
    let db = open_db(db_path)?;
    let month = target_month(&db, processor, month)?;
    let (records, label) = scoped_records(&db, processor)?;
    let report = revenue_concentration(&records, &month);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("🎯 Revenue concentration for {} ({})", month, label);
    println!(
        "   Top {} merchants hold {:.1}% of revenue ({} risk)",
        report.top_merchants.len(),
        report.concentration_percent,
        report.risk
    );
    Ok(())
}

pub fn cmd_cohort(db_path: &Path, processor: Option<&str>, json: bool) -> Result<()> {
    let db = open_db(db_path)?;
    let (records, label) = scoped_records(&db, processor)?;

    let change = match cohort_change(&records) {
        Some(change) => change,
        None => {
            println!("Need at least two months of data for scope '{}'", label);
            return Ok(());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&change)?);
        return Ok(());
    }

    println!(
        "🔁 Cohort change {} → {} ({})",
        change.previous_month, change.current_month, label
    );
    println!("   New merchants: {}", change.new_merchants.len());
    for m in &change.new_merchants {
        println!("      + {} ({:.2})", m.merchant_name, m.revenue);
    }
    println!("   Lost merchants: {}", change.lost_merchants.len());
    for m in &change.lost_merchants {
        println!("      - {} ({:.2})", m.merchant_name, m.revenue);
    }
    Ok(())
}

pub fn cmd_at_risk(db_path: &Path, processor: Option<&str>, json: bool) -> Result<()> {
    let db = open_db(db_path)?;
    let (records, label) = scoped_records(&db, processor)?;
    let risks = at_risk_merchants(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&risks)?);
        return Ok(());
    }

    if risks.is_empty() {
        println!("No at-risk merchants for scope '{}'", label);
        return Ok(());
    }

    println!("🚨 At-risk merchants ({})", label);
    for r in &risks {
        println!(
            "   [{}] {:<30} {:>10.2} → {:>10.2}  ({:+.1}%)",
            r.risk_level, r.merchant_name, r.previous_revenue, r.current_revenue, r.decline_percent
        );
    }
    Ok(())
}

pub fn cmd_forecast(db_path: &Path, processor: Option<&str>, json: bool) -> Result<()> {
    let db = open_db(db_path)?;
    let (records, label) = scoped_records(&db, processor)?;
    let series = monthly_metrics(&records);
    let forecast = forecast_revenue(&series);

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(());
    }

    if forecast.is_empty() {
        println!("No data to forecast for scope '{}'", label);
        return Ok(());
    }

    println!("🔮 Revenue forecast ({})", label);
    for p in &forecast {
        println!(
            "   {}  {:>12.2}  ({} confidence)",
            p.month, p.forecast_revenue, p.confidence
        );
    }
    Ok(())
}
