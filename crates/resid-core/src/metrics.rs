//! Month-over-month metrics
//!
//! Walks canonical records for one processor scope in chronological order
//! and derives retention, attrition and growth by comparing consecutive
//! months' merchant cohorts. Gaps in the data are bridged (each month is
//! compared to the previous month *present*, not the calendar-adjacent
//! one).

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::models::{CanonicalRecord, MonthlyMetric};

/// Group records by canonical month, preserving record order within a month
fn by_month<'a>(records: &'a [CanonicalRecord]) -> BTreeMap<&'a str, Vec<&'a CanonicalRecord>> {
    let mut groups: BTreeMap<&str, Vec<&CanonicalRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.month.as_str()).or_default().push(record);
    }
    groups
}

/// Compute the ordered metric series over every month present in `records`.
///
/// The caller is responsible for scoping: pass records for one processor,
/// or the full set for the "All" pseudo-scope (cohorts are keyed by
/// processor-qualified merchant id, so ids from different processors never
/// collide).
pub fn monthly_metrics(records: &[CanonicalRecord]) -> Vec<MonthlyMetric> {
    let groups = by_month(records);
    let mut series = Vec::with_capacity(groups.len());

    let mut prev_cohort: Option<HashSet<String>> = None;
    let mut prev_revenue: Option<f64> = None;

    for (month, month_records) in groups {
        let cohort: HashSet<String> = month_records.iter().map(|r| r.cohort_id()).collect();
        let total_accounts = cohort.len();
        // A merchant with multiple branch rows contributes the sum of its
        // rows, never the max.
        let total_revenue: f64 = month_records.iter().map(|r| r.revenue()).sum();

        let (retained, lost, new, retention_rate, attrition_rate) = match &prev_cohort {
            Some(prev) => {
                let retained = cohort.intersection(prev).count();
                let lost = prev.difference(&cohort).count();
                let new = cohort.difference(prev).count();
                let prev_size = prev.len();
                let (retention, attrition) = if prev_size == 0 {
                    (0.0, 0.0)
                } else {
                    (
                        retained as f64 / prev_size as f64 * 100.0,
                        lost as f64 / prev_size as f64 * 100.0,
                    )
                };
                (retained, lost, new, retention, attrition)
            }
            // First month in a series: everything is new by definition
            None => (0, 0, total_accounts, 100.0, 0.0),
        };

        let (mom_change, mom_change_percent) = match prev_revenue {
            Some(prev) => {
                let change = total_revenue - prev;
                let percent = if prev == 0.0 {
                    0.0
                } else {
                    change / prev * 100.0
                };
                (Some(change), Some(percent))
            }
            None => (None, None),
        };

        let revenue_per_account = if total_accounts == 0 {
            0.0
        } else {
            total_revenue / total_accounts as f64
        };

        series.push(MonthlyMetric {
            month: month.to_string(),
            total_revenue,
            total_accounts,
            retained_accounts: retained,
            lost_accounts: lost,
            new_accounts: new,
            retention_rate,
            attrition_rate,
            revenue_per_account,
            mom_revenue_change: mom_change,
            mom_revenue_change_percent: mom_change_percent,
            net_account_growth: new as i64 - lost as i64,
        });

        prev_cohort = Some(cohort);
        prev_revenue = Some(total_revenue);
    }

    series
}

/// Compute metrics for a display window with a correct retention baseline.
///
/// Naively computing over a sub-window makes the window's first month look
/// like 100% new accounts. If the dataset has a month immediately before
/// the window (by data order, not calendar adjacency), it is prepended as
/// an anchor, the series is computed over [anchor, ...window], and the
/// anchor's entry is stripped from the output. Without a prior month (or
/// with no `start`, the all-time view) computation runs directly over the
/// window.
pub fn monthly_metrics_windowed(
    records: &[CanonicalRecord],
    start: Option<&str>,
    end: Option<&str>,
) -> Vec<MonthlyMetric> {
    let months: Vec<&str> = by_month(records).into_keys().collect();
    if months.is_empty() {
        return Vec::new();
    }

    let in_window = |m: &str| {
        start.map_or(true, |s| m >= s) && end.map_or(true, |e| m <= e)
    };

    let first_displayed = months.iter().position(|m| in_window(m));
    let first_displayed = match first_displayed {
        Some(i) => i,
        None => return Vec::new(),
    };

    // Anchor: the month immediately before the window's first displayed
    // month, when the caller actually restricted the start.
    let anchor: Option<&str> = match start {
        Some(_) if first_displayed > 0 => Some(months[first_displayed - 1]),
        _ => None,
    };
    if let Some(anchor) = anchor {
        debug!("Using {} as retention anchor for window start", anchor);
    }

    let scoped: Vec<CanonicalRecord> = records
        .iter()
        .filter(|r| in_window(&r.month) || anchor == Some(r.month.as_str()))
        .cloned()
        .collect();

    let mut series = monthly_metrics(&scoped);
    if let Some(anchor) = anchor {
        series.retain(|m| m.month != anchor);
    }
    series
}
