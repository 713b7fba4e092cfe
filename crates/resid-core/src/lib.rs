//! resid Core Library
//!
//! Shared functionality for the resid merchant residual tracker:
//! - Flexible column-mapping parsers for processor CSV/XLSX exports
//! - Month normalization (column, filename or sheet-name derived)
//! - Canonical record extraction with per-processor revenue semantics
//! - SQLite canonical store with idempotent revenue-comparing upsert
//! - Monthly retention/attrition/growth metrics with anchored windows
//! - Analyzers: top merchants, concentration, cohort change, at-risk
//!   detection and linear revenue forecasting

pub mod analyzers;
pub mod columns;
pub mod db;
pub mod error;
pub mod extract;
pub mod import;
pub mod metrics;
pub mod models;
pub mod month;

pub use analyzers::{
    at_risk_merchants, cohort_change, forecast_revenue, revenue_concentration, top_merchants,
    AtRiskMerchant, CohortChange, ConcentrationReport, ConcentrationRisk, Confidence,
    ForecastPoint, MerchantRef, RiskLevel, TopMerchant,
};
pub use db::{Database, ImportStats, RecordUpsert};
pub use error::{Error, Result};
pub use extract::{detect_processor, dedupe_records, extract_sheet, ExtractOutcome, Sheet};
pub use import::{import_file, sheets_from_path};
pub use metrics::{monthly_metrics, monthly_metrics_windowed};
pub use models::{CanonicalRecord, Figures, MonthlyMetric, Processor};
pub use month::{month_from_name, resolve_month};
