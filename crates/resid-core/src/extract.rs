//! Record extraction from processor sheets
//!
//! Turns one tabular sheet (headers plus rows) into canonical revenue
//! records: resolves columns through the alias tables, normalizes months,
//! filters noise rows, applies per-processor mandatory-field rules, and
//! deduplicates by (processor, month, merchant) keeping the higher revenue.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::columns::{normalize_header, resolve_column, CanonicalField};
use crate::models::{CanonicalRecord, Figures, Processor};
use crate::month::{month_from_name, resolve_month};

/// One materialized sheet: literal headers and string cell rows.
///
/// The core never reads files itself; collaborators materialize the sheet
/// (from CSV, XLSX, or an upload) and hand it over whole.
#[derive(Debug, Clone)]
pub struct Sheet {
    /// Sheet name for multi-sheet workbooks (month fallback of last resort)
    pub name: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Build a sheet from raw rows, taking the first row as headers
    pub fn from_rows(name: Option<String>, mut rows: Vec<Vec<String>>) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let headers = rows.remove(0);
        Some(Self {
            name,
            headers,
            rows,
        })
    }

    fn cell(&self, row: &[String], col: Option<usize>) -> Option<String> {
        let value = row.get(col?)?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}

/// Tri-state result of one extraction call.
///
/// Errors invalidated rows (or the whole sheet); warnings are advisory and
/// never block. Row-level problems accumulate rather than aborting the
/// batch.
#[derive(Debug, Clone, Default)]
pub struct ExtractOutcome {
    pub success: bool,
    pub records: Vec<CanonicalRecord>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ExtractOutcome {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: vec![error.into()],
            ..Default::default()
        }
    }

    /// Fold another sheet's outcome into this one (multi-sheet workbooks).
    ///
    /// Merged records are re-deduplicated so a merchant appearing on two
    /// sheets for the same month still collapses to the higher revenue.
    pub fn merge(&mut self, other: ExtractOutcome) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        let mut combined = std::mem::take(&mut self.records);
        combined.extend(other.records);
        self.records = dedupe_records(combined, &mut self.warnings);
        self.success = !self.records.is_empty();
    }
}

/// Detect a processor from a filename.
///
/// Scans case-insensitively for known keywords. Returns None for ambiguous
/// or unmatched names; the caller must then supply the processor
/// explicitly.
pub fn detect_processor(filename: &str) -> Option<Processor> {
    let name = filename.to_lowercase();
    const KEYWORDS: &[(&str, Processor)] = &[
        ("clearent", Processor::Clearent),
        ("merchantlynx", Processor::Ml),
        ("merchant_lynx", Processor::Ml),
        ("ml_", Processor::Ml),
        ("shift4", Processor::Shift4),
        ("tsys", Processor::Tsys),
        ("micamp", Processor::Micamp),
        ("paybright", Processor::PayBright),
        ("pb_", Processor::PayBright),
        ("trx", Processor::Trx),
    ];
    KEYWORDS
        .iter()
        .find(|(kw, _)| name.contains(kw))
        .map(|(_, p)| *p)
}

/// Extract canonical records from one sheet.
///
/// `explicit_month` is an optional caller-supplied month (any accepted
/// format); `source_name` is the originating filename, used for month
/// fallback. Row-level problems are accumulated; only a headerless or
/// identity-less sheet aborts without partial output.
pub fn extract_sheet(
    sheet: &Sheet,
    processor: Processor,
    explicit_month: Option<&str>,
    source_name: Option<&str>,
) -> ExtractOutcome {
    let mut warnings = Vec::new();

    // Title-row heuristic: a report title line sometimes precedes the real
    // header row. Skip one leading line and re-derive headers, exactly once.
    // Known false-positive risk: a legitimately single-column export would
    // also trip the lone-orphan check.
    let reparsed;
    let sheet = if looks_like_title_row(&sheet.headers) {
        match Sheet::from_rows(sheet.name.clone(), sheet.rows.clone()) {
            Some(below_title) => {
                warnings.push(format!(
                    "Title row {:?} skipped; using next line as headers",
                    sheet.headers.first().map(String::as_str).unwrap_or("")
                ));
                reparsed = below_title;
                &reparsed
            }
            None => return ExtractOutcome::failure("Sheet has no parseable header row"),
        }
    } else {
        sheet
    };

    let id_col = resolve_column(&sheet.headers, CanonicalField::MerchantId);
    let name_col = resolve_column(&sheet.headers, CanonicalField::MerchantName);
    let (id_col, name_col) = match (id_col, name_col) {
        (Some(i), Some(n)) => (i, n),
        _ => {
            return ExtractOutcome::failure(format!(
                "Mandatory columns missing: could not resolve {} from headers {:?}",
                if id_col.is_none() {
                    "merchant identifier"
                } else {
                    "merchant name"
                },
                sheet.headers
            ));
        }
    };

    let branch_col = resolve_column(&sheet.headers, CanonicalField::BranchId);
    let month_col = resolve_column(&sheet.headers, CanonicalField::Month);
    let sales_col = resolve_column(&sheet.headers, CanonicalField::SalesAmount);
    let net_col = resolve_column(&sheet.headers, CanonicalField::Net);
    let payout_col = resolve_column(&sheet.headers, CanonicalField::PayoutAmount);
    let agent_net_col = resolve_column(&sheet.headers, CanonicalField::AgentNet);
    let income_col = resolve_column(&sheet.headers, CanonicalField::Income);
    let expenses_col = resolve_column(&sheet.headers, CanonicalField::Expenses);

    // Month sources, strongest first: row column, caller-supplied month,
    // filename, sheet name. Sheet name is only consulted last.
    let fallback_month = explicit_month
        .and_then(resolve_month)
        .or_else(|| source_name.and_then(month_from_name))
        .or_else(|| sheet.name.as_deref().and_then(month_from_name));

    let mut errors = Vec::new();
    let mut records = Vec::new();

    for (i, row) in sheet.rows.iter().enumerate() {
        let row_no = i + 2; // 1-based, counting the header line

        let merchant_id = sheet.cell(row, Some(id_col));
        let merchant_name = sheet.cell(row, Some(name_col));
        let (merchant_id, merchant_name) = match (merchant_id, merchant_name) {
            (Some(id), Some(name)) => (id, name),
            _ => {
                errors.push(format!("Row {}: missing merchant id or name", row_no));
                continue;
            }
        };

        // Stray header/footer rows re-embedded in data ("Merchant ID",
        // "Grand Total", ...) are noise, not data errors.
        if is_header_artifact(&merchant_id) || is_header_artifact(&merchant_name) {
            warnings.push(format!(
                "Row {}: skipped header/total artifact ({:?})",
                row_no, merchant_name
            ));
            continue;
        }

        let month = sheet
            .cell(row, month_col)
            .and_then(|v| resolve_month(&v))
            .or_else(|| fallback_month.clone());
        let month = match month {
            Some(m) => m,
            None => {
                errors.push(format!(
                    "Row {}: unresolvable month for merchant {}",
                    row_no, merchant_id
                ));
                continue;
            }
        };

        let mut numeric = |col: Option<usize>, field: CanonicalField| -> Option<f64> {
            let raw = sheet.cell(row, col)?;
            match parse_numeric(&raw) {
                Some(v) => Some(v),
                None => {
                    warnings.push(format!(
                        "Row {}: unparseable {} value {:?}, treated as absent",
                        row_no, field, raw
                    ));
                    None
                }
            }
        };

        let sales_amount = numeric(sales_col, CanonicalField::SalesAmount);
        let net = numeric(net_col, CanonicalField::Net);
        let payout_amount = numeric(payout_col, CanonicalField::PayoutAmount);
        let agent_net = numeric(agent_net_col, CanonicalField::AgentNet);
        let income = numeric(income_col, CanonicalField::Income);
        let expenses = numeric(expenses_col, CanonicalField::Expenses);

        let figures = if processor.requires_net() {
            // Net is authoritative for these processors; substituting gross
            // sales would silently misstate revenue.
            match net {
                Some(net) => Figures::NetRequired {
                    net,
                    sales_amount,
                    agent_net,
                },
                None => {
                    errors.push(format!(
                        "Row {}: merchant {} ({}) is missing the mandatory net field for {}",
                        row_no, merchant_id, merchant_name, processor
                    ));
                    continue;
                }
            }
        } else if processor == Processor::Shift4 {
            Figures::Payout {
                payout_amount,
                sales_amount,
                income,
                expenses,
            }
        } else {
            Figures::Standard {
                net,
                sales_amount,
                income,
                expenses,
            }
        };

        records.push(CanonicalRecord {
            processor,
            month,
            merchant_id,
            merchant_name,
            branch_id: sheet.cell(row, branch_col),
            figures,
        });
    }

    let records = dedupe_records(records, &mut warnings);
    debug!(
        "Extracted {} records from {} rows ({} errors, {} warnings)",
        records.len(),
        sheet.rows.len(),
        errors.len(),
        warnings.len()
    );

    ExtractOutcome {
        success: !records.is_empty(),
        records,
        errors,
        warnings,
    }
}

/// Collapse duplicate (processor, month, merchant) keys, keeping the record
/// with strictly higher revenue. Ties keep the earlier-seen record, so the
/// result is stable across re-runs.
pub fn dedupe_records(
    records: Vec<CanonicalRecord>,
    warnings: &mut Vec<String>,
) -> Vec<CanonicalRecord> {
    let mut kept: Vec<CanonicalRecord> = Vec::with_capacity(records.len());
    let mut index: HashMap<(Processor, String, String), usize> = HashMap::new();

    for record in records {
        let key = (
            record.processor,
            record.month.clone(),
            record.merchant_id.clone(),
        );
        match index.get(&key) {
            Some(&at) => {
                let existing = &kept[at];
                if record.revenue() > existing.revenue() {
                    warnings.push(format!(
                        "Duplicate merchant {} for {}: kept higher revenue {:.2}, dropped {:.2}",
                        record.merchant_id,
                        record.month,
                        record.revenue(),
                        existing.revenue()
                    ));
                    kept[at] = record;
                } else {
                    warnings.push(format!(
                        "Duplicate merchant {} for {}: dropped lower or equal revenue {:.2}",
                        record.merchant_id,
                        record.month,
                        record.revenue()
                    ));
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(record);
            }
        }
    }

    kept
}

/// Whether an identity value looks like a re-embedded header or totals row
fn is_header_artifact(value: &str) -> bool {
    let lower = value.to_lowercase();
    lower.contains("merchant") || lower.contains("total")
}

/// Whether a header row looks like a report title rather than real headers
fn looks_like_title_row(headers: &[String]) -> bool {
    let first = match headers.first() {
        Some(h) => normalize_header(h),
        None => return false,
    };
    if first.contains("residuals") || first.contains("report") {
        return true;
    }
    // A lone orphan column matching no merchant field is likely a title
    if headers.len() == 1 {
        let known_alias = [
            CanonicalField::MerchantId,
            CanonicalField::MerchantName,
            CanonicalField::Month,
            CanonicalField::Net,
            CanonicalField::SalesAmount,
        ]
        .iter()
        .any(|f| f.aliases().contains(&first.as_str()));
        if !known_alias {
            warn!("Single orphan header {:?} treated as title row", first);
            return true;
        }
    }
    false
}

/// Parse a numeric cell, stripping currency/percent symbols and separators.
/// Accounting-style parentheses mean negative. Unparseable values are
/// absent, not zero.
fn parse_numeric(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', '%', ' '], "")
        .replace('(', "-")
        .replace(')', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}
