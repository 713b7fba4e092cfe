//! Header-to-canonical-field resolution
//!
//! Processor exports name the same column many different ways ("Merchant ID",
//! "MID", "Merchant #", ...). Resolution is a data-driven lookup: normalize
//! the literal header and compare against a per-field alias table. No fuzzy
//! or substring matching; a field either resolves exactly or is absent, and
//! callers must treat "absent" distinctly from "present but empty".

/// Canonical field names a sheet column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    MerchantId,
    MerchantName,
    BranchId,
    Month,
    SalesAmount,
    Net,
    PayoutAmount,
    AgentNet,
    Income,
    Expenses,
}

impl CanonicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MerchantId => "merchant_id",
            Self::MerchantName => "merchant_name",
            Self::BranchId => "branch_id",
            Self::Month => "month",
            Self::SalesAmount => "sales_amount",
            Self::Net => "net",
            Self::PayoutAmount => "payout_amount",
            Self::AgentNet => "agent_net",
            Self::Income => "income",
            Self::Expenses => "expenses",
        }
    }

    /// Known aliases, already in normalized form (lowercase, single spaces)
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::MerchantId => &[
                "merchant id",
                "merchant #",
                "merchant number",
                "merchant account",
                "mid",
                "account id",
                "account number",
            ],
            Self::MerchantName => &[
                "merchant name",
                "merchant",
                "dba",
                "dba name",
                "account name",
                "business name",
            ],
            Self::BranchId => &["branch id", "branch", "branch #", "branch number"],
            Self::Month => &[
                "month",
                "statement month",
                "processing month",
                "period",
                "residual month",
            ],
            Self::SalesAmount => &[
                "sales amount",
                "sales",
                "total sales",
                "gross sales",
                "sales volume",
                "volume",
            ],
            Self::Net => &[
                "net",
                "net residual",
                "net revenue",
                "residual net",
                "net income",
            ],
            Self::PayoutAmount => &["payout amount", "payout", "total payout", "net payout"],
            Self::AgentNet => &["agent net", "agent residual", "agent net residual"],
            Self::Income => &["income", "total income", "gross income"],
            Self::Expenses => &["expenses", "expense", "total expenses"],
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalize a literal header: lowercase, trim, collapse internal whitespace
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Find the index of the header matching a canonical field.
///
/// Returns None when no header's normalized form is a known alias. The first
/// matching header wins, so duplicate aliased columns resolve stably.
pub fn resolve_column(headers: &[String], field: CanonicalField) -> Option<usize> {
    let aliases = field.aliases();
    headers
        .iter()
        .position(|h| aliases.contains(&normalize_header(h).as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Merchant   ID "), "merchant id");
        assert_eq!(normalize_header("NET"), "net");
        assert_eq!(normalize_header("Sales\tAmount"), "sales amount");
    }

    #[test]
    fn test_resolve_exact_alias() {
        let h = headers(&["MID", "DBA Name", "Net Residual", "Total Sales"]);
        assert_eq!(resolve_column(&h, CanonicalField::MerchantId), Some(0));
        assert_eq!(resolve_column(&h, CanonicalField::MerchantName), Some(1));
        assert_eq!(resolve_column(&h, CanonicalField::Net), Some(2));
        assert_eq!(resolve_column(&h, CanonicalField::SalesAmount), Some(3));
    }

    #[test]
    fn test_no_substring_matching() {
        // "merchant id number" is not an alias; exact match only
        let h = headers(&["Merchant ID Number"]);
        assert_eq!(resolve_column(&h, CanonicalField::MerchantId), None);
    }

    #[test]
    fn test_absent_field() {
        let h = headers(&["Merchant ID", "Merchant Name"]);
        assert_eq!(resolve_column(&h, CanonicalField::PayoutAmount), None);
    }

    #[test]
    fn test_first_match_wins() {
        let h = headers(&["Net", "Net Residual"]);
        assert_eq!(resolve_column(&h, CanonicalField::Net), Some(0));
    }
}
