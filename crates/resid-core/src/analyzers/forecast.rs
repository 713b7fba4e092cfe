//! Linear revenue forecast
//!
//! Ordinary least-squares regression of total revenue against a 0-based
//! month index over the trailing months of the metric series, projected
//! three months ahead. Confidence tiers come from R-squared and decay with
//! projection distance.

use tracing::debug;

use super::types::{Confidence, ForecastPoint};
use crate::models::MonthlyMetric;
use crate::month::add_months;

/// Regression window: at most this many trailing months
const WINDOW: usize = 6;

/// Months projected ahead
const HORIZON: u32 = 3;

/// Least-squares fit over (0-based index, revenue) points.
/// Returns (slope, intercept, r_squared).
fn linear_fit(ys: &[f64]) -> (f64, f64, f64) {
    let n = ys.len() as f64;
    let sum_x: f64 = (0..ys.len()).map(|i| i as f64).sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = ys.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_xx: f64 = (0..ys.len()).map(|i| (i * i) as f64).sum();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom == 0.0 {
        // Single point: flat projection
        let intercept = ys.first().copied().unwrap_or(0.0);
        return (0.0, intercept, 1.0);
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let mean_y = sum_y / n;
    let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = ys
        .iter()
        .enumerate()
        .map(|(i, y)| (y - (intercept + slope * i as f64)).powi(2))
        .sum();

    // Zero variance is a perfectly flat series, not an undefined fit
    let r_squared = if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot };

    (slope, intercept, r_squared)
}

fn confidence(r_squared: f64, months_out: u32) -> Confidence {
    match months_out {
        1 if r_squared > 0.7 => Confidence::High,
        1 | 2 if r_squared > 0.5 => Confidence::Medium,
        _ => Confidence::Low,
    }
}

/// Project total revenue three months past the end of the metric series.
///
/// Uses the trailing six months at most. An empty series yields no
/// forecast.
pub fn forecast_revenue(series: &[MonthlyMetric]) -> Vec<ForecastPoint> {
    let tail_start = series.len().saturating_sub(WINDOW);
    let tail = &series[tail_start..];
    if tail.is_empty() {
        return Vec::new();
    }

    let revenues: Vec<f64> = tail.iter().map(|m| m.total_revenue).collect();
    let (slope, intercept, r_squared) = linear_fit(&revenues);
    debug!(
        "Forecast fit over {} months: slope {:.2}, r2 {:.3}",
        revenues.len(),
        slope,
        r_squared
    );

    let last_month = &tail[tail.len() - 1].month;
    let last_index = revenues.len() as f64 - 1.0;

    (1..=HORIZON)
        .map(|k| {
            let month = add_months(last_month, k)
                .unwrap_or_else(|| format!("{}+{}", last_month, k));
            ForecastPoint {
                month,
                forecast_revenue: intercept + slope * (last_index + k as f64),
                confidence: confidence(r_squared, k),
            }
        })
        .collect()
}
