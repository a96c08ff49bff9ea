//! Value objects shared across the storefront domain

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn twd(amount: Decimal) -> Self { Self::new(amount, "TWD") }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn is_zero(&self) -> bool { self.amount.is_zero() }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }

    /// Builds a price from an untyped JSON value via [`normalize_price`].
    pub fn lenient(raw: &serde_json::Value, currency: &str) -> Self {
        Self::new(normalize_price(raw), currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{} {}", self.amount, self.currency) }
}

#[derive(Debug, Clone)] pub enum MoneyError { CurrencyMismatch }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Currency mismatch") }
}

/// Normalizes a price that arrives from an external source as a JSON number,
/// a decimal string, or garbage, into a non-negative `Decimal`. Every
/// ingestion boundary funnels through here: unparsable or missing values
/// become zero, negatives are clamped to zero.
pub fn normalize_price(raw: &serde_json::Value) -> Decimal {
    let parsed = match raw {
        serde_json::Value::Number(n) => parse_decimal(&n.to_string()),
        serde_json::Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    };
    parsed.unwrap_or(Decimal::ZERO).max(Decimal::ZERO)
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_money_add() {
        let a = Money::twd(Decimal::new(100, 0));
        let b = Money::twd(Decimal::new(50, 0));
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(150, 0));
    }

    #[test]
    fn test_money_add_currency_mismatch() {
        let a = Money::twd(Decimal::new(100, 0));
        let b = Money::new(Decimal::new(100, 0), "USD");
        assert!(a.add(&b).is_err());
    }

    #[test]
    fn test_money_multiply() {
        let unit = Money::twd(Decimal::new(1299, 2));
        assert_eq!(unit.multiply(3).amount(), Decimal::new(3897, 2));
    }

    #[test]
    fn normalize_accepts_numbers_and_strings() {
        assert_eq!(normalize_price(&json!(100)), Decimal::new(100, 0));
        assert_eq!(normalize_price(&json!(12.99)), Decimal::new(1299, 2));
        assert_eq!(normalize_price(&json!("12.99")), Decimal::new(1299, 2));
        assert_eq!(normalize_price(&json!("  450 ")), Decimal::new(450, 0));
    }

    #[test]
    fn normalize_coerces_junk_to_zero() {
        assert_eq!(normalize_price(&json!(null)), Decimal::ZERO);
        assert_eq!(normalize_price(&json!("not a price")), Decimal::ZERO);
        assert_eq!(normalize_price(&json!({"amount": 5})), Decimal::ZERO);
        assert_eq!(normalize_price(&json!([1, 2])), Decimal::ZERO);
    }

    #[test]
    fn normalize_clamps_negative_to_zero() {
        assert_eq!(normalize_price(&json!(-45)), Decimal::ZERO);
        assert_eq!(normalize_price(&json!("-1.50")), Decimal::ZERO);
    }
}
