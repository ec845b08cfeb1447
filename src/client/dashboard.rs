//! Dashboard loading.
//!
//! A dashboard shows whatever it managed to load: each list is fetched on its own,
//! concurrently, and a failed fetch is logged and replaced by an empty list.

use super::{Client, ClientResult};
use crate::{
    core::{
        report::{self, DateWindow, EmployeeReport, ExpenseStat, Summary, SummaryOptions},
        transaction::TransactionFilter,
    },
    entities::{EmployeeModel, ExpenseModel, TransactionModel},
};
use tracing::{debug, warn};

/// Records behind a dashboard, as loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Registered employees
    pub employees: Vec<EmployeeModel>,
    /// Expenses, newest first
    pub expenses: Vec<ExpenseModel>,
    /// Transactions in the loaded scope
    pub transactions: Vec<TransactionModel>,
}

impl Snapshot {
    /// Dashboard summary over the loaded records.
    #[must_use]
    pub fn summary(&self, options: &SummaryOptions) -> Summary {
        Summary::build(&self.employees, &self.expenses, &self.transactions, options)
    }

    /// Per-expense rows over the loaded records.
    #[must_use]
    pub fn expense_stats(&self) -> Vec<ExpenseStat> {
        report::expense_stats(&self.transactions, &self.expenses)
    }

    /// Detail view of one employee.
    #[must_use]
    pub fn employee_report(&self, employee_id: &str, window: Option<DateWindow>) -> EmployeeReport {
        report::employee_report(
            employee_id,
            &self.employees,
            &self.transactions,
            &self.expenses,
            window,
        )
    }
}

/// Loads every employee, expense and transaction.
pub async fn load_snapshot(client: &Client) -> Snapshot {
    load_filtered(client, &TransactionFilter::default()).await
}

/// Loads every employee and expense, but only `employee_id`'s transactions.
pub async fn load_employee_snapshot(client: &Client, employee_id: &str) -> Snapshot {
    load_filtered(client, &TransactionFilter::for_employee(employee_id)).await
}

async fn load_filtered(client: &Client, filter: &TransactionFilter) -> Snapshot {
    let (employees, expenses, transactions) = futures::join!(
        client.list_employees(),
        client.list_expenses(),
        client.filter_transactions(filter),
    );

    let snapshot = Snapshot {
        employees: or_empty("employees", employees),
        expenses: or_empty("expenses", expenses),
        transactions: or_empty("transactions", transactions),
    };
    debug!(
        employees = snapshot.employees.len(),
        expenses = snapshot.expenses.len(),
        transactions = snapshot.transactions.len(),
        "Loaded dashboard snapshot"
    );
    snapshot
}

fn or_empty<T>(what: &str, loaded: ClientResult<Vec<T>>) -> Vec<T> {
    loaded.unwrap_or_else(|err| {
        warn!("Failed to load {what}, showing none: {err}");
        Vec::new()
    })
}
