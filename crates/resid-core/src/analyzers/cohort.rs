//! Cohort change and at-risk detection
//!
//! Both analyzers compare the most recent months present in the (possibly
//! window-filtered) record set. A merchant absent from the current month is
//! full churn (-100%), not excluded.

use std::collections::HashMap;

use super::types::{AtRiskMerchant, CohortChange, MerchantRef, RiskLevel};
use crate::models::CanonicalRecord;

/// Flag merchants at a decline of at least this much (percent)
const FLAG_DECLINE: f64 = 5.0;

/// Per-merchant revenue for one month, keyed by processor-qualified id,
/// preserving first-seen order
struct MonthRoster {
    order: Vec<String>,
    merchants: HashMap<String, RosterEntry>,
}

struct RosterEntry {
    merchant_id: String,
    merchant_name: String,
    revenue: f64,
}

fn roster(records: &[CanonicalRecord], month: &str) -> MonthRoster {
    let mut order = Vec::new();
    let mut merchants: HashMap<String, RosterEntry> = HashMap::new();
    for record in records.iter().filter(|r| r.month == month) {
        let key = record.cohort_id();
        match merchants.get_mut(&key) {
            Some(entry) => entry.revenue += record.revenue(),
            None => {
                order.push(key.clone());
                merchants.insert(
                    key,
                    RosterEntry {
                        merchant_id: record.merchant_id.clone(),
                        merchant_name: record.merchant_name.clone(),
                        revenue: record.revenue(),
                    },
                );
            }
        }
    }
    MonthRoster { order, merchants }
}

/// The most recent months present in the record set, oldest first
fn recent_months(records: &[CanonicalRecord], n: usize) -> Vec<String> {
    let mut months: Vec<String> = records.iter().map(|r| r.month.clone()).collect();
    months.sort();
    months.dedup();
    let skip = months.len().saturating_sub(n);
    months.split_off(skip)
}

/// New and lost merchants between the two most recent months present.
///
/// Returns None when fewer than two months of data exist.
pub fn cohort_change(records: &[CanonicalRecord]) -> Option<CohortChange> {
    let months = recent_months(records, 2);
    let [previous_month, current_month] = <[String; 2]>::try_from(months).ok()?;

    let previous = roster(records, &previous_month);
    let current = roster(records, &current_month);

    let new_merchants = current
        .order
        .iter()
        .filter(|key| !previous.merchants.contains_key(*key))
        .filter_map(|key| current.merchants.get(key))
        .map(|e| MerchantRef {
            merchant_id: e.merchant_id.clone(),
            merchant_name: e.merchant_name.clone(),
            revenue: e.revenue,
        })
        .collect();

    let lost_merchants = previous
        .order
        .iter()
        .filter(|key| !current.merchants.contains_key(*key))
        .filter_map(|key| previous.merchants.get(key))
        .map(|e| MerchantRef {
            merchant_id: e.merchant_id.clone(),
            merchant_name: e.merchant_name.clone(),
            revenue: e.revenue,
        })
        .collect();

    Some(CohortChange {
        previous_month,
        current_month,
        new_merchants,
        lost_merchants,
    })
}

/// Merchants whose revenue declined at least 5% vs. the previous month.
///
/// Tiers escalate to high at a 25% decline or two consecutive declining
/// months, and to critical at a 50% decline or two consecutive declines
/// with at least 20% in the latest. The two-consecutive check needs a
/// third month of history; with only two months it never fires. Output is
/// sorted worst decline first.
pub fn at_risk_merchants(records: &[CanonicalRecord]) -> Vec<AtRiskMerchant> {
    let months = recent_months(records, 3);
    if months.len() < 2 {
        return Vec::new();
    }

    let current_month = &months[months.len() - 1];
    let previous_month = &months[months.len() - 2];
    let before = if months.len() == 3 {
        Some(roster(records, &months[0]))
    } else {
        None
    };

    let current = roster(records, current_month);
    let previous = roster(records, previous_month);

    let mut flagged = Vec::new();
    for key in &previous.order {
        let prev = match previous.merchants.get(key) {
            Some(e) => e,
            None => continue,
        };
        if prev.revenue <= 0.0 {
            continue;
        }

        // Absent in the current month means full churn, not exclusion
        let current_revenue = current.merchants.get(key).map(|e| e.revenue).unwrap_or(0.0);
        let decline_percent = (current_revenue - prev.revenue) / prev.revenue * 100.0;
        if decline_percent > -FLAG_DECLINE {
            continue;
        }

        let mut consecutive_declines = 1;
        if let Some(before) = &before {
            if let Some(earlier) = before.merchants.get(key) {
                if prev.revenue < earlier.revenue {
                    consecutive_declines = 2;
                }
            }
        }

        let risk_level = if decline_percent <= -50.0
            || (consecutive_declines >= 2 && decline_percent <= -20.0)
        {
            RiskLevel::Critical
        } else if decline_percent <= -25.0 || consecutive_declines >= 2 {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        };

        flagged.push(AtRiskMerchant {
            merchant_id: prev.merchant_id.clone(),
            merchant_name: prev.merchant_name.clone(),
            current_revenue,
            previous_revenue: prev.revenue,
            decline_percent,
            consecutive_declines,
            risk_level,
        });
    }

    flagged.sort_by(|a, b| {
        a.decline_percent
            .partial_cmp(&b.decline_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    flagged
}
