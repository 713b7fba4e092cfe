//! Domain models for resid

use serde::{Deserialize, Serialize};

/// Supported payment processors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Processor {
    Clearent,
    Ml,
    Shift4,
    Tsys,
    Micamp,
    PayBright,
    Trx,
}

impl Processor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clearent => "clearent",
            Self::Ml => "ml",
            Self::Shift4 => "shift4",
            Self::Tsys => "tsys",
            Self::Micamp => "micamp",
            Self::PayBright => "paybright",
            Self::Trx => "trx",
        }
    }

    /// All known processors, in display order
    pub fn all() -> &'static [Processor] {
        &[
            Self::Clearent,
            Self::Ml,
            Self::Shift4,
            Self::Tsys,
            Self::Micamp,
            Self::PayBright,
            Self::Trx,
        ]
    }

    /// Whether this processor's exports must carry a `net` column.
    ///
    /// Clearent and ML report their authoritative residual as `net`; for
    /// these, a missing `net` is a data-quality error, never a silent
    /// fallback to gross sales.
    pub fn requires_net(&self) -> bool {
        matches!(self, Self::Clearent | Self::Ml)
    }
}

impl std::str::FromStr for Processor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clearent" => Ok(Self::Clearent),
            "ml" | "merchantlynx" => Ok(Self::Ml),
            "shift4" => Ok(Self::Shift4),
            "tsys" => Ok(Self::Tsys),
            "micamp" => Ok(Self::Micamp),
            "paybright" | "pay_bright" => Ok(Self::PayBright),
            "trx" => Ok(Self::Trx),
            _ => Err(format!("Unknown processor: {}", s)),
        }
    }
}

impl std::fmt::Display for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Numeric figures reported for one merchant-month, keyed by how the
/// processor reports revenue.
///
/// Different processors put their authoritative number under different
/// columns, and the fallback rules differ per group. Keeping the figures
/// as a tagged union means `revenue()` is a single pattern match instead
/// of ad hoc fallback chains at every call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Figures {
    /// Clearent / ML: `net` is mandatory and authoritative.
    NetRequired {
        net: f64,
        sales_amount: Option<f64>,
        agent_net: Option<f64>,
    },
    /// Shift4: payout amount, falling back to gross sales.
    Payout {
        payout_amount: Option<f64>,
        sales_amount: Option<f64>,
        income: Option<f64>,
        expenses: Option<f64>,
    },
    /// Everyone else: `net` preferred, gross sales as fallback.
    Standard {
        net: Option<f64>,
        sales_amount: Option<f64>,
        income: Option<f64>,
        expenses: Option<f64>,
    },
}

impl Figures {
    /// The processor's authoritative revenue number.
    ///
    /// This is the single projection rule used everywhere revenue matters:
    /// deduplication, monthly totals, rankings, concentration and at-risk
    /// detection all go through here.
    pub fn revenue(&self) -> f64 {
        match self {
            Self::NetRequired { net, .. } => *net,
            Self::Payout {
                payout_amount,
                sales_amount,
                ..
            } => payout_amount.or(*sales_amount).unwrap_or(0.0),
            Self::Standard {
                net, sales_amount, ..
            } => net.or(*sales_amount).unwrap_or(0.0),
        }
    }
}

/// One merchant's reported activity for one (processor, month) pair.
///
/// Immutable once accepted; a re-upload with higher revenue supersedes the
/// stored record through the upsert rule rather than mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub processor: Processor,
    /// Canonical `YYYY-MM` month token
    pub month: String,
    /// Processor-scoped merchant identifier (not unique across processors)
    pub merchant_id: String,
    pub merchant_name: String,
    pub branch_id: Option<String>,
    pub figures: Figures,
}

impl CanonicalRecord {
    /// Revenue under the per-processor projection rule.
    pub fn revenue(&self) -> f64 {
        self.figures.revenue()
    }

    /// Dedup/upsert key: (processor, month, merchant id)
    pub fn key(&self) -> (Processor, &str, &str) {
        (self.processor, &self.month, &self.merchant_id)
    }

    /// Cohort identity. Merchant ids are only unique within a processor,
    /// so the "All" scope keys cohorts by the pair.
    pub fn cohort_id(&self) -> String {
        format!("{}:{}", self.processor, self.merchant_id)
    }
}

/// One month's aggregate metrics for a processor scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMetric {
    /// `YYYY-MM`
    pub month: String,
    pub total_revenue: f64,
    pub total_accounts: usize,
    pub retained_accounts: usize,
    pub lost_accounts: usize,
    pub new_accounts: usize,
    /// Percent of the previous month's cohort still present (100 for the
    /// first month in a series)
    pub retention_rate: f64,
    pub attrition_rate: f64,
    pub revenue_per_account: f64,
    /// Delta vs. the previous computed month in the series (data gaps are
    /// bridged, not interpolated); None for the first month
    pub mom_revenue_change: Option<f64>,
    pub mom_revenue_change_percent: Option<f64>,
    pub net_account_growth: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processor_roundtrip() {
        for p in Processor::all() {
            let parsed: Processor = p.as_str().parse().unwrap();
            assert_eq!(parsed, *p);
        }
        assert!("stripe".parse::<Processor>().is_err());
    }

    #[test]
    fn test_revenue_net_required_never_falls_back() {
        let figures = Figures::NetRequired {
            net: 500.0,
            sales_amount: Some(900.0),
            agent_net: None,
        };
        assert_eq!(figures.revenue(), 500.0);
    }

    #[test]
    fn test_revenue_payout_falls_back_to_sales() {
        let figures = Figures::Payout {
            payout_amount: None,
            sales_amount: Some(700.0),
            income: None,
            expenses: None,
        };
        assert_eq!(figures.revenue(), 700.0);

        let figures = Figures::Payout {
            payout_amount: Some(650.0),
            sales_amount: Some(700.0),
            income: None,
            expenses: None,
        };
        assert_eq!(figures.revenue(), 650.0);
    }

    #[test]
    fn test_revenue_standard_defaults_to_zero() {
        let figures = Figures::Standard {
            net: None,
            sales_amount: None,
            income: None,
            expenses: None,
        };
        assert_eq!(figures.revenue(), 0.0);
    }
}
