//! Type-safe price representation using decimal arithmetic.
//!
//! All money math in Cartwheel goes through [`Price`] so that totals are
//! computed with exact decimal arithmetic rather than floating point.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The amount is negative.
    #[error("price cannot be negative")]
    Negative,
    /// The input string is not a valid decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A non-negative price in the shop currency (USD), stored as an exact decimal.
///
/// Amounts are kept at two decimal places (cents).
///
/// ## Examples
///
/// ```
/// use cartwheel_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::parse("9.99").unwrap();
/// assert_eq!(price.to_string(), "$9.99");
/// assert_eq!(price.line_total(2), Decimal::new(1998, 2));
///
/// assert!(Price::parse("-1").is_err());
/// assert!(Price::parse("not a number").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount.
    ///
    /// The amount is rounded to two decimal places (banker's rounding).
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is less than zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount.round_dp(2)))
    }

    /// Parse a price from user input (e.g. a form field).
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Invalid`] if the input is not a decimal number,
    /// or [`PriceError::Negative`] if it is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount: Decimal = s
            .trim()
            .parse()
            .map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Exact total for `quantity` units at this price.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

// SQLx support (with postgres feature): stored as NUMERIC
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are constrained non-negative
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let price = Price::parse("9.99").unwrap();
        assert_eq!(price.amount(), Decimal::new(999, 2));
    }

    #[test]
    fn test_parse_whitespace() {
        assert!(Price::parse(" 5.00 ").is_ok());
    }

    #[test]
    fn test_parse_negative() {
        assert!(matches!(Price::parse("-0.01"), Err(PriceError::Negative)));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            Price::parse("ten dollars"),
            Err(PriceError::Invalid(_))
        ));
    }

    #[test]
    fn test_zero_is_allowed() {
        assert!(Price::parse("0").is_ok());
    }

    #[test]
    fn test_rounds_to_cents() {
        let price = Price::parse("1.005").unwrap();
        assert_eq!(price.amount(), Decimal::new(100, 2));
    }

    #[test]
    fn test_line_total_exact() {
        // 2 x $9.99 + 1 x $5.00 = $24.98, no float drift
        let widget = Price::parse("9.99").unwrap();
        let gadget = Price::parse("5.00").unwrap();
        let total = widget.line_total(2) + gadget.line_total(1);
        assert_eq!(total, Decimal::new(2498, 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::parse("5").unwrap().to_string(), "$5.00");
        assert_eq!(Price::parse("12.5").unwrap().to_string(), "$12.50");
    }

    #[test]
    fn test_serde_roundtrip() {
        let price = Price::parse("19.99").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        let parsed: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, price);
    }
}
