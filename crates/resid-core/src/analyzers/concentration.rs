//! Revenue concentration risk

use super::top_merchants::top_merchants;
use super::types::{ConcentrationReport, ConcentrationRisk};
use crate::models::CanonicalRecord;

/// How many merchants the concentration ratio considers
const TOP_COUNT: usize = 10;

/// Share of one month's revenue held by the top-10 merchants.
///
/// Tiers: below 25% is low, 25–40% (inclusive) is medium, above 40% is
/// high. Exactly 25 is already medium; exactly 40 is still medium.
pub fn revenue_concentration(records: &[CanonicalRecord], month: &str) -> ConcentrationReport {
    let top = top_merchants(records, month, TOP_COUNT);
    let concentration_percent: f64 = top.iter().map(|m| m.percent_of_total).sum();

    let risk = if concentration_percent > 40.0 {
        ConcentrationRisk::High
    } else if concentration_percent >= 25.0 {
        ConcentrationRisk::Medium
    } else {
        ConcentrationRisk::Low
    };

    ConcentrationReport {
        month: month.to_string(),
        top_merchants: top,
        concentration_percent,
        risk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Figures, Processor};

    fn record(id: usize, net: f64) -> CanonicalRecord {
        CanonicalRecord {
            processor: Processor::Tsys,
            month: "2024-01".to_string(),
            merchant_id: id.to_string(),
            merchant_name: format!("Merchant {}", id),
            branch_id: None,
            figures: Figures::Standard {
                net: Some(net),
                sales_amount: None,
                income: None,
                expenses: None,
            },
        }
    }

    /// Build a population where the top 10 hold exactly `top_share` percent:
    /// 10 equal heavy merchants plus enough equal light ones for the rest.
    fn population(top_share: f64) -> Vec<CanonicalRecord> {
        let mut records: Vec<CanonicalRecord> =
            (0..10).map(|i| record(i, top_share / 10.0)).collect();
        let remainder = 100.0 - top_share;
        records.extend((10..110).map(|i| record(i, remainder / 100.0)));
        records
    }

    #[test]
    fn test_boundary_exactly_25_is_medium() {
        let report = revenue_concentration(&population(25.0), "2024-01");
        assert!((report.concentration_percent - 25.0).abs() < 1e-6);
        assert_eq!(report.risk, ConcentrationRisk::Medium);
    }

    #[test]
    fn test_boundary_exactly_40_is_medium() {
        let report = revenue_concentration(&population(40.0), "2024-01");
        assert!((report.concentration_percent - 40.0).abs() < 1e-6);
        assert_eq!(report.risk, ConcentrationRisk::Medium);
    }

    #[test]
    fn test_below_25_is_low() {
        let report = revenue_concentration(&population(20.0), "2024-01");
        assert_eq!(report.risk, ConcentrationRisk::Low);
    }

    #[test]
    fn test_above_40_is_high() {
        let report = revenue_concentration(&population(60.0), "2024-01");
        assert_eq!(report.risk, ConcentrationRisk::High);
    }

    #[test]
    fn test_small_population_is_fully_concentrated() {
        let records = vec![record(1, 100.0), record(2, 50.0)];
        let report = revenue_concentration(&records, "2024-01");
        assert!((report.concentration_percent - 100.0).abs() < 1e-6);
        assert_eq!(report.risk, ConcentrationRisk::High);
        assert_eq!(report.top_merchants.len(), 2);
    }
}
