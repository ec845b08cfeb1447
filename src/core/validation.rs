//! Input validation shared by the stores, the HTTP API and the client.
//!
//! Everything here runs before any write is attempted, so a rejected draft never
//! leaves partial state behind.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Length of the admin PIN.
pub const PIN_LENGTH: usize = 6;

/// Largest money value accepted on a write, one trillion đồng.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// One employee picked on the expense form, with the amount they owe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Employee being charged
    pub employee_id: String,
    /// Amount owed in đồng, must be positive
    pub amount: i64,
    /// Optional note for the transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Expense form submission: the header plus one selection per employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    /// Expense title
    pub title: String,
    /// Meal date
    pub date: NaiveDate,
    /// Optional notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Tag names
    #[serde(default)]
    pub tags: Vec<String>,
    /// Employees charged
    #[serde(default)]
    pub selections: Vec<Selection>,
}

impl ExpenseDraft {
    /// Validates the draft the way the expense form does.
    ///
    /// # Errors
    /// Returns `Error::Validation` when the title is blank, no employee is selected or
    /// an employee appears twice, and `Error::InvalidAmount` when an amount is not
    /// strictly positive or exceeds [`MAX_AMOUNT`].
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;

        if self.selections.is_empty() {
            return Err(Error::validation("select at least one employee"));
        }

        let mut seen = HashSet::new();
        for selection in &self.selections {
            require_text("employeeId", &selection.employee_id)?;
            if selection.amount <= 0 || selection.amount > MAX_AMOUNT {
                return Err(Error::InvalidAmount {
                    amount: selection.amount,
                });
            }
            if !seen.insert(selection.employee_id.as_str()) {
                return Err(Error::validation(format!(
                    "employee {} selected more than once",
                    selection.employee_id
                )));
            }
        }

        Ok(())
    }

    /// Sum of all selected amounts.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.selections
            .iter()
            .fold(0_i64, |acc, s| acc.saturating_add(s.amount))
    }
}

/// Trims `value` and rejects it when nothing is left.
///
/// # Errors
/// Returns `Error::Validation` naming `field` when the value is blank.
pub fn require_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional free-text value, turning blanks into `None`.
#[must_use]
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Rejects negative money values and values above [`MAX_AMOUNT`].
///
/// # Errors
/// Returns `Error::InvalidAmount` for amounts out of range.
pub fn validate_amount(amount: i64) -> Result<i64> {
    if !(0..=MAX_AMOUNT).contains(&amount) {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}

/// Checks that a PIN is exactly six ASCII digits.
///
/// # Errors
/// Returns `Error::Validation` otherwise.
pub fn validate_pin(pin: &str) -> Result<()> {
    if pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "pin must be exactly {PIN_LENGTH} digits"
        )))
    }
}

/// Checks an inclusive date range.
///
/// # Errors
/// Returns `Error::Validation` when `start` is after `end`.
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(Error::validation(format!(
            "startDate {start} is after endDate {end}"
        )));
    }
    Ok(())
}
