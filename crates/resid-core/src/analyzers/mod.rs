//! Analyzer functions
//!
//! Pure, stateless functions over canonical records or the monthly metric
//! series: top-revenue merchants, revenue concentration, cohort change,
//! at-risk detection and the linear revenue forecast. Every revenue figure
//! here goes through `CanonicalRecord::revenue()`; analyzers never invent
//! their own fallbacks.

mod cohort;
mod concentration;
mod forecast;
mod top_merchants;
mod types;

pub use cohort::{at_risk_merchants, cohort_change};
pub use concentration::revenue_concentration;
pub use forecast::forecast_revenue;
pub use top_merchants::top_merchants;
pub use types::{
    AtRiskMerchant, CohortChange, ConcentrationReport, ConcentrationRisk, Confidence,
    ForecastPoint, MerchantRef, RiskLevel, TopMerchant,
};
