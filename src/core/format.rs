//! Display helpers for money and dates.

use crate::errors::{Error, Result};
use chrono::NaiveDate;

/// Wire format for calendar dates.
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Display format for calendar dates.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Formats an amount of đồng with dot-separated thousands, e.g. `1.234.000 ₫`.
#[must_use]
pub fn format_vnd(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped.push_str(" ₫");
    grouped
}

/// Formats a date as `DD/MM/YYYY`.
#[must_use]
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
/// Returns `Error::Validation` naming `field` when the value does not parse.
pub fn parse_wire_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), WIRE_DATE_FORMAT)
        .map_err(|_| Error::validation(format!("{field} must be a YYYY-MM-DD date, got '{value}'")))
}
