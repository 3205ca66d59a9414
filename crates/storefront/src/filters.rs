//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use rust_decimal::Decimal;

/// Formats a decimal amount as dollars and cents.
///
/// Usage in templates: `{{ total|money }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn money(
    amount: impl std::borrow::Borrow<Decimal>,
    _env: &dyn askama::Values,
) -> askama::Result<String> {
    let amount = amount.borrow();
    Ok(format!("${amount:.2}"))
}

/// Formats a timestamp for display.
///
/// Usage in templates: `{{ order.created_at|datetime }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn datetime(
    value: &chrono::DateTime<chrono::Utc>,
    _env: &dyn askama::Values,
) -> askama::Result<String> {
    Ok(value.format("%B %-d, %Y").to_string())
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use askama::NO_VALUES;

    use super::*;

    #[test]
    fn money_renders_two_decimal_places() {
        assert_eq!(
            money::default()
                .execute(&Decimal::new(2498, 2), NO_VALUES)
                .unwrap(),
            "$24.98"
        );
        assert_eq!(
            money::default()
                .execute(&Decimal::new(5, 0), NO_VALUES)
                .unwrap(),
            "$5.00"
        );
    }

    #[test]
    fn datetime_renders_a_readable_date() {
        let ts = chrono::DateTime::parse_from_rfc3339("2026-03-09T12:00:00Z")
            .unwrap()
            .to_utc();
        assert_eq!(
            datetime::default().execute(&ts, NO_VALUES).unwrap(),
            "March 9, 2026"
        );
    }
}
