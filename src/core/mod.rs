//! Core business logic - framework-agnostic stores, payment rules and reporting.
//!
//! The store modules (`employee`, `expense`, `transaction`, `menu`, `session`, `tag`)
//! wrap a `sea_orm` connection. `report`, `payment`, `status`, `validation` and
//! `format` are pure and shared with the HTTP client.

/// Employee registration and lookup
pub mod employee;
/// Expense headers and multi-employee expense creation
pub mod expense;
/// Display formatting for money and dates
pub mod format;
/// Food items and selection pricing
pub mod menu;
/// Pay-all and paid-toggle intents
pub mod payment;
/// Aggregation of employees, expenses and transactions into dashboard views
pub mod report;
/// Ordering sessions
pub mod session;
/// Payment status derivation and consistency rules
pub mod status;
/// Expense tags
pub mod tag;
/// Charges against expenses
pub mod transaction;
/// Input validation
pub mod validation;
