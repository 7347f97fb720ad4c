//! Normalization of free-text tender amounts ("₹15 Cr", "9 Lakh",
//! "1,50,000", "Ref Document") into rupees.

use lazy_static::lazy_static;
use regex::Regex;

pub const CRORE: f64 = 10_000_000.0;
pub const LAKH: f64 = 100_000.0;

lazy_static! {
    static ref UNIT_AMOUNT: Regex =
        Regex::new(r"(?i)([+-]?(?:\d+(?:\.\d+)?|\.\d+))\s*(crores?|cr|lakhs?|lacs?|l)\b").expect("unit amount regex is valid");
    static ref LEADING_NUMBER: Regex =
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)").expect("leading number regex is valid");
}

/// Result of normalizing a scraped amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurrencyValue {
    Amount(f64),
    /// The amount is only given in the tender documents, or is unreadable.
    Unknown,
}

impl CurrencyValue {
    pub fn amount(self) -> Option<f64> {
        match self {
            CurrencyValue::Amount(value) => Some(value),
            CurrencyValue::Unknown => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, CurrencyValue::Unknown)
    }
}

impl From<CurrencyValue> for Option<f64> {
    fn from(value: CurrencyValue) -> Self {
        value.amount()
    }
}

/// Parse a free-text amount into rupees. Never fails; anything that cannot
/// be read as a number becomes [`CurrencyValue::Unknown`].
pub fn parse_currency(raw: &str) -> CurrencyValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.to_lowercase().contains("ref document") {
        return CurrencyValue::Unknown;
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != '₹' && *c != ',').collect();
    let cleaned = cleaned.trim();

    if let Some(captures) = UNIT_AMOUNT.captures(cleaned) {
        if let Ok(number) = captures[1].parse::<f64>() {
            let unit = captures[2].to_lowercase();
            let multiplier = if unit.starts_with("cr") { CRORE } else { LAKH };
            let amount = number * multiplier;
            if !amount.is_finite() {
                return CurrencyValue::Unknown;
            }
            return CurrencyValue::Amount(amount);
        }
    }

    LEADING_NUMBER
        .find(cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .map(CurrencyValue::Amount)
        .unwrap_or(CurrencyValue::Unknown)
}

/// Like [`parse_currency`] for fields the backend may omit.
pub fn parse_optional_currency(raw: Option<&str>) -> CurrencyValue {
    raw.map(parse_currency).unwrap_or(CurrencyValue::Unknown)
}

/// Whether `value` lies within the optional bounds. Unknown values are never
/// excluded by a bound.
pub fn within_bounds(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> bool {
    let Some(value) = value else {
        return true;
    };
    if min.is_some_and(|min| value < min) {
        return false;
    }
    if max.is_some_and(|max| value > max) {
        return false;
    }
    true
}

/// Render an amount in crores the way tender details show it, e.g. `₹15.00 Cr`.
pub fn format_crore(value: Option<f64>) -> String {
    match value {
        Some(amount) if amount != 0.0 => format!("₹{:.2} Cr", amount / CRORE),
        _ => "Ref Document".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crore_suffixes() {
        assert_eq!(parse_currency("₹15 Cr"), CurrencyValue::Amount(150_000_000.0));
        assert_eq!(parse_currency("2.5 crore"), CurrencyValue::Amount(25_000_000.0));
        assert_eq!(parse_currency("₹ 1,200 CR."), CurrencyValue::Amount(12_000_000_000.0));
    }

    #[test]
    fn test_lakh_suffixes() {
        assert_eq!(parse_currency("9 Lakh"), CurrencyValue::Amount(900_000.0));
        assert_eq!(parse_currency("12.5L"), CurrencyValue::Amount(1_250_000.0));
        assert_eq!(parse_currency("₹3 lakhs"), CurrencyValue::Amount(300_000.0));
    }

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_currency("1,50,000"), CurrencyValue::Amount(150_000.0));
        assert_eq!(parse_currency("42000.50 INR"), CurrencyValue::Amount(42_000.5));
    }

    #[test]
    fn test_unknown_values() {
        assert!(parse_currency("Ref Document").is_unknown());
        assert!(parse_currency("Refer REF DOCUMENT for 15 Cr").is_unknown());
        assert!(parse_currency("").is_unknown());
        assert!(parse_currency("   ").is_unknown());
        assert!(parse_currency("NA").is_unknown());
        assert!(parse_optional_currency(None).is_unknown());
    }

    #[test]
    fn test_unit_needs_word_boundary() {
        // "lots" must not be read as lakh
        assert_eq!(parse_currency("5 lots"), CurrencyValue::Amount(5.0));
    }

    #[test]
    fn test_overflowing_unit_amount_is_unknown() {
        let huge = format!("{} Cr", "9".repeat(400));
        assert!(parse_currency(&huge).is_unknown());
        assert!(within_bounds(parse_currency(&huge).amount(), Some(200_000_000.0), None));
        assert!(parse_currency(&format!("{} Lakh", "9".repeat(310))).is_unknown());
    }

    #[test]
    fn test_unit_amount_keeps_sign() {
        assert_eq!(parse_currency("-2 Cr"), CurrencyValue::Amount(-20_000_000.0));
        assert_eq!(parse_currency("+3 Lakh"), CurrencyValue::Amount(300_000.0));
    }

    #[test]
    fn test_within_bounds() {
        assert!(within_bounds(None, Some(10.0), Some(20.0)));
        assert!(within_bounds(Some(15.0), Some(10.0), Some(20.0)));
        assert!(within_bounds(Some(10.0), Some(10.0), None));
        assert!(!within_bounds(Some(9.0), Some(10.0), None));
        assert!(!within_bounds(Some(21.0), None, Some(20.0)));
        assert!(within_bounds(Some(21.0), None, None));
    }

    #[test]
    fn test_format_crore() {
        assert_eq!(format_crore(Some(150_000_000.0)), "₹15.00 Cr");
        assert_eq!(format_crore(None), "Ref Document");
        assert_eq!(format_crore(Some(0.0)), "Ref Document");
    }
}
