//! Month parsing and normalization
//!
//! Every month in the system is a canonical `YYYY-MM` token. Source data
//! spells months many ways: a dedicated column ("06/2025", "June 2025"),
//! a filename ("clearent_june2025.csv"), or an XLSX sheet name ("Jun-25").

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

/// Date patterns tried in order against a month value.
///
/// Parsing appends a day-of-month so chrono can parse year-month tokens.
const MONTH_FORMATS: &[&str] = &[
    "%Y-%m", // 2025-06
    "%m/%Y", // 06/2025
    "%m-%Y", // 06-2025
    "%B %Y", // June 2025
    "%b %Y", // Jun 2025
    "%Y/%m", // 2025/06
    "%b-%y", // Jun-25
];

/// Parse a month value into canonical `YYYY-MM`.
///
/// Tries each known pattern in order; the first one producing a valid
/// calendar date wins. Returns None when nothing parses.
pub fn resolve_month(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in MONTH_FORMATS {
        let padded = format!("{} 1", s);
        let fmt_padded = format!("{} %d", fmt);
        if let Ok(date) = NaiveDate::parse_from_str(&padded, &fmt_padded) {
            return Some(date.format("%Y-%m").to_string());
        }
    }

    None
}

/// Extract a month token from a filename or workbook sheet name.
///
/// Used only when no row-local or explicit month is available. Tries the
/// regular pattern list against the whole name first, then regex heuristics
/// for embedded tokens like `clearent_june2025` or `residuals_2025-06`.
pub fn month_from_name(name: &str) -> Option<String> {
    // Strip a file extension if present
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);

    if let Some(month) = resolve_month(stem) {
        return Some(month);
    }

    // YYYY<sep>MM embedded anywhere
    let ym = Regex::new(r"(\d{4})[-_/.](\d{1,2})").ok()?;
    if let Some(caps) = ym.captures(stem) {
        if let Some(month) = numeric_month(&caps[1], &caps[2]) {
            return Some(month);
        }
    }

    // MM<sep>YYYY embedded anywhere
    let my = Regex::new(r"(\d{1,2})[-_/.](\d{4})").ok()?;
    if let Some(caps) = my.captures(stem) {
        if let Some(month) = numeric_month(&caps[2], &caps[1]) {
            return Some(month);
        }
    }

    // Month name glued to a year, e.g. "pb_june2025" or "Jun 25"
    let named = Regex::new(
        r"(?i)(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*[\s_.-]*(\d{2,4})",
    )
    .ok()?;
    if let Some(caps) = named.captures(stem) {
        let month = month_name_number(&caps[1])?;
        let year = expand_year(&caps[2])?;
        debug!("Derived month {}-{:02} from name {:?}", year, month, name);
        return Some(format!("{}-{:02}", year, month));
    }

    None
}

fn numeric_month(year: &str, month: &str) -> Option<String> {
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) || !(2000..=2100).contains(&year) {
        return None;
    }
    Some(format!("{}-{:02}", year, month))
}

fn month_name_number(prefix: &str) -> Option<u32> {
    let n = match prefix.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(n)
}

fn expand_year(s: &str) -> Option<i32> {
    let n: i32 = s.parse().ok()?;
    match s.len() {
        4 if (2000..=2100).contains(&n) => Some(n),
        2 => Some(2000 + n),
        _ => None,
    }
}

/// The month label `offset` months after a canonical `YYYY-MM` token
pub fn add_months(month: &str, offset: u32) -> Option<String> {
    let (y, m) = month.split_once('-')?;
    let year: i32 = y.parse().ok()?;
    let month0: u32 = m.parse::<u32>().ok()?.checked_sub(1)?;
    let total = year * 12 + month0 as i32 + offset as i32;
    Some(format!("{}-{:02}", total.div_euclid(12), total.rem_euclid(12) + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_month_formats() {
        assert_eq!(resolve_month("2025-06").as_deref(), Some("2025-06"));
        assert_eq!(resolve_month("06/2025").as_deref(), Some("2025-06"));
        assert_eq!(resolve_month("06-2025").as_deref(), Some("2025-06"));
        assert_eq!(resolve_month("June 2025").as_deref(), Some("2025-06"));
        assert_eq!(resolve_month("Jun 2025").as_deref(), Some("2025-06"));
        assert_eq!(resolve_month("2025/06").as_deref(), Some("2025-06"));
        assert_eq!(resolve_month("Jun-25").as_deref(), Some("2025-06"));
    }

    #[test]
    fn test_resolve_month_rejects_garbage() {
        assert_eq!(resolve_month(""), None);
        assert_eq!(resolve_month("not a month"), None);
        assert_eq!(resolve_month("13/2025"), None);
        assert_eq!(resolve_month("merchant totals"), None);
    }

    #[test]
    fn test_month_from_filename() {
        assert_eq!(
            month_from_name("clearent_june2025.csv").as_deref(),
            Some("2025-06")
        );
        assert_eq!(
            month_from_name("pb_residuals_2025-06.xlsx").as_deref(),
            Some("2025-06")
        );
        assert_eq!(
            month_from_name("shift4_06_2025.csv").as_deref(),
            Some("2025-06")
        );
        assert_eq!(month_from_name("report.csv"), None);
    }

    #[test]
    fn test_month_from_sheet_name() {
        assert_eq!(month_from_name("Jun-25").as_deref(), Some("2025-06"));
        assert_eq!(month_from_name("June 2025").as_deref(), Some("2025-06"));
        assert_eq!(month_from_name("Sheet1"), None);
    }

    #[test]
    fn test_add_months() {
        assert_eq!(add_months("2025-06", 1).as_deref(), Some("2025-07"));
        assert_eq!(add_months("2025-11", 3).as_deref(), Some("2026-02"));
        assert_eq!(add_months("2025-12", 0).as_deref(), Some("2025-12"));
    }
}
