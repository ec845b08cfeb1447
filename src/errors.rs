use crate::entities::PaymentStatus;
use thiserror::Error;

/// Errors raised by configuration, validation and the record stores.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input rejected before reaching the store
    #[error("Validation failed: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// A money value outside the accepted range
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// Stored status would disagree with the amounts
    #[error("Status '{status}' is inconsistent with received {received} of {amount}")]
    InconsistentStatus {
        /// Requested status
        status: PaymentStatus,
        /// Amount owed
        amount: i64,
        /// Amount received
        received: i64,
    },

    /// No employee with this id
    #[error("Employee not found: {id}")]
    EmployeeNotFound {
        /// Missing id
        id: String,
    },

    /// No expense with this id
    #[error("Expense not found: {id}")]
    ExpenseNotFound {
        /// Missing id
        id: String,
    },

    /// No transaction with this id
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// Missing id
        id: String,
    },

    /// No food item with this id
    #[error("Food item not found: {id}")]
    FoodItemNotFound {
        /// Missing id
        id: String,
    },

    /// No session with this id
    #[error("Session not found: {id}")]
    SessionNotFound {
        /// Missing id
        id: String,
    },

    /// The session no longer accepts orders
    #[error("Session {id} is no longer active")]
    SessionInactive {
        /// Session id
        id: String,
    },

    /// A second charge for the same employee on the same expense
    #[error("Employee {employee_id} already has a transaction for expense {expense_id}")]
    DuplicateTransaction {
        /// Expense id
        expense_id: String,
        /// Employee id
        employee_id: String,
    },

    /// A uniqueness rule other than the transaction pair was violated
    #[error("Conflict: {message}")]
    Conflict {
        /// What collided
        message: String,
    },
}

impl Error {
    /// Shorthand for a [`Error::Validation`].
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
