//! Top-revenue merchant ranking

use super::types::TopMerchant;
use crate::models::CanonicalRecord;

/// Rank merchants for one target month by summed revenue, descending.
///
/// `percent_of_total` is computed against the summed revenue of the whole
/// ranked population for that month, before truncation to `n`. Ties keep
/// the original grouping order (sort is stable).
pub fn top_merchants(records: &[CanonicalRecord], month: &str, n: usize) -> Vec<TopMerchant> {
    // Group by processor-qualified cohort id in first-seen order, so the
    // "All" scope never merges merchants that share an id across
    // processors; branch rows under one merchant sum
    let mut order: Vec<String> = Vec::new();
    let mut sums: std::collections::HashMap<String, (String, String, f64)> =
        std::collections::HashMap::new();

    for record in records.iter().filter(|r| r.month == month) {
        let entry = sums
            .entry(record.cohort_id())
            .or_insert_with(|| {
                order.push(record.cohort_id());
                (
                    record.merchant_id.clone(),
                    record.merchant_name.clone(),
                    0.0,
                )
            });
        entry.2 += record.revenue();
    }

    let total: f64 = sums.values().map(|(_, _, revenue)| revenue).sum();

    let mut ranked: Vec<TopMerchant> = order
        .into_iter()
        .filter_map(|key| sums.remove(&key))
        .map(|(id, name, revenue)| TopMerchant {
            merchant_id: id,
            merchant_name: name,
            revenue,
            percent_of_total: if total == 0.0 {
                0.0
            } else {
                revenue / total * 100.0
            },
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Figures, Processor};

    fn record(month: &str, id: &str, name: &str, net: f64) -> CanonicalRecord {
        CanonicalRecord {
            processor: Processor::Clearent,
            month: month.to_string(),
            merchant_id: id.to_string(),
            merchant_name: name.to_string(),
            branch_id: None,
            figures: Figures::NetRequired {
                net,
                sales_amount: None,
                agent_net: None,
            },
        }
    }

    #[test]
    fn test_ranking_and_percentages() {
        let records = vec![
            record("2024-01", "1", "Alpha", 600.0),
            record("2024-01", "2", "Beta", 300.0),
            record("2024-01", "3", "Gamma", 100.0),
        ];
        let top = top_merchants(&records, "2024-01", 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].merchant_name, "Alpha");
        assert_eq!(top[0].percent_of_total, 60.0);
        assert_eq!(top[1].merchant_name, "Beta");
        // Percent is against the full ranked population, not the top-2 slice
        assert_eq!(top[1].percent_of_total, 30.0);
    }

    #[test]
    fn test_branch_rows_sum_not_max() {
        let records = vec![
            record("2024-01", "1", "Alpha", 200.0),
            record("2024-01", "1", "Alpha", 300.0),
            record("2024-01", "2", "Beta", 400.0),
        ];
        let top = top_merchants(&records, "2024-01", 10);
        assert_eq!(top[0].merchant_id, "1");
        assert_eq!(top[0].revenue, 500.0);
    }

    #[test]
    fn test_tie_break_keeps_grouping_order() {
        let records = vec![
            record("2024-01", "b", "Seen First", 100.0),
            record("2024-01", "a", "Seen Second", 100.0),
        ];
        let top = top_merchants(&records, "2024-01", 2);
        assert_eq!(top[0].merchant_id, "b");
        assert_eq!(top[1].merchant_id, "a");
    }

    #[test]
    fn test_other_months_excluded() {
        let records = vec![
            record("2024-01", "1", "Alpha", 100.0),
            record("2024-02", "2", "Beta", 900.0),
        ];
        let top = top_merchants(&records, "2024-01", 10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].percent_of_total, 100.0);
    }

    #[test]
    fn test_shared_id_across_processors_ranks_separately() {
        // Same merchant id under two processors must stay two entries
        let mut a = record("2024-01", "1001", "Alpha Coffee", 100.0);
        let mut b = record("2024-01", "1001", "Alpha Diner", 200.0);
        a.processor = Processor::Clearent;
        b.processor = Processor::Tsys;
        let top = top_merchants(&[a, b], "2024-01", 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].merchant_name, "Alpha Diner");
        assert_eq!(top[0].revenue, 200.0);
        assert_eq!(top[1].merchant_name, "Alpha Coffee");
        assert_eq!(top[1].revenue, 100.0);
    }

    #[test]
    fn test_zero_total_guards_division() {
        let records = vec![record("2024-01", "1", "Alpha", 0.0)];
        let top = top_merchants(&records, "2024-01", 10);
        assert_eq!(top[0].percent_of_total, 0.0);
    }
}
