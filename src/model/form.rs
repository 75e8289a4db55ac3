//! The raw submission form and its numeric parsing rules.

use crate::Result;
use anyhow::Context;

/// Used when the percentage field is empty or unparsable.
const DEFAULT_PCT: i64 = 20;

/// The bill submission form exactly as the user filled it in: every field is
/// a raw string. Numeric conversion happens at submission time, not while the
/// user is typing.
///
/// Parsing policy: required numeric fields (`amount`) reject the submission
/// when unparsable; optional numeric fields (`pct`) fall back to a default.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct BillForm {
    pub bill_type: String,
    pub name: String,
    /// `YYYY-MM-DD`, transmitted verbatim.
    pub date: String,
    pub amount: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

impl BillForm {
    /// Parses the amount field as a whole number of currency units. An
    /// unparsable amount is a validation error and the submission must be
    /// rejected before any network call.
    pub fn parse_amount(&self) -> Result<i64> {
        self.amount
            .trim()
            .parse::<i64>()
            .with_context(|| format!("'{}' is not a valid whole amount", self.amount))
    }

    /// Parses the percentage field, falling back to the default of 20 when
    /// the input is empty or not a number.
    pub fn parse_pct(&self) -> i64 {
        self.pct.trim().parse::<i64>().unwrap_or(DEFAULT_PCT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(amount: &str, pct: &str) -> BillForm {
        BillForm {
            amount: amount.to_string(),
            pct: pct.to_string(),
            ..BillForm::default()
        }
    }

    #[test]
    fn test_parse_amount_valid() {
        assert_eq!(form("240", "20").parse_amount().unwrap(), 240);
        assert_eq!(form(" 240 ", "20").parse_amount().unwrap(), 240);
    }

    #[test]
    fn test_parse_amount_invalid() {
        assert!(form("", "20").parse_amount().is_err());
        assert!(form("24.50", "20").parse_amount().is_err());
        assert!(form("deux cents", "20").parse_amount().is_err());
    }

    #[test]
    fn test_parse_pct_valid() {
        assert_eq!(form("240", "20").parse_pct(), 20);
        assert_eq!(form("240", "10").parse_pct(), 10);
    }

    #[test]
    fn test_parse_pct_defaults() {
        assert_eq!(form("240", "").parse_pct(), 20);
        assert_eq!(form("240", "vingt").parse_pct(), 20);
        assert_eq!(form("240", "10.5").parse_pct(), 20);
    }
}
