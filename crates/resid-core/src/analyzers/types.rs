//! Value objects produced by the analyzer functions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One ranked merchant for a target month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMerchant {
    pub merchant_id: String,
    pub merchant_name: String,
    pub revenue: f64,
    /// Share of the summed revenue of all ranked merchants that month,
    /// not of the scope's grand total
    pub percent_of_total: f64,
}

/// Risk tier for revenue concentration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcentrationRisk {
    Low,
    Medium,
    High,
}

impl ConcentrationRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ConcentrationRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Share of revenue held by the top merchants for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationReport {
    pub month: String,
    pub top_merchants: Vec<TopMerchant>,
    /// Sum of the top merchants' percent_of_total
    pub concentration_percent: f64,
    pub risk: ConcentrationRisk,
}

/// Lightweight merchant reference used in cohort-change lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantRef {
    pub merchant_id: String,
    pub merchant_name: String,
    pub revenue: f64,
}

/// New and lost merchants between the two most recent months present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortChange {
    pub previous_month: String,
    pub current_month: String,
    pub new_merchants: Vec<MerchantRef>,
    pub lost_merchants: Vec<MerchantRef>,
}

/// Escalating at-risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A merchant with declining (or vanished) revenue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtRiskMerchant {
    pub merchant_id: String,
    pub merchant_name: String,
    pub current_revenue: f64,
    pub previous_revenue: f64,
    /// Negative for declines; -100 means full churn
    pub decline_percent: f64,
    /// Consecutive declining months, capped at 2 (three-month lookback)
    pub consecutive_declines: u32,
    pub risk_level: RiskLevel,
}

/// Forecast confidence tier derived from the regression fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Unknown confidence tier: {}", s)),
        }
    }
}

/// One projected future month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// `YYYY-MM`
    pub month: String,
    pub forecast_revenue: f64,
    pub confidence: Confidence,
}
