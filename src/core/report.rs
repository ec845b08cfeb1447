//! Report generation business logic.
//!
//! Turns a snapshot of `(employees, expenses, transactions)` into the views the
//! dashboards display: grand totals, per-employee and per-expense stats, top debtors
//! and collectors, daily totals and the per-employee detail report. Every function is
//! pure and deterministic: the same records in any order produce the same output, and
//! transactions pointing at missing employees or expenses never cause a failure.

use crate::{
    core::status::derive_status,
    entities::{EmployeeModel, ExpenseModel, PaymentStatus, TransactionModel},
};
use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Number of entries in the top debtors / collectors lists unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 5;

/// Label used when a referenced record cannot be resolved.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Totals for one employee across the given transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStat {
    /// Employee id
    pub id: String,
    /// Alias, name or id, whichever is set first
    pub name: String,
    /// Amount owed
    pub total: i64,
    /// Amount received
    pub received: i64,
    /// `total - received`
    pub debt: i64,
    /// Derived from `total` and `received`
    pub status: PaymentStatus,
}

/// Amount charged on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    /// Day the transactions were recorded
    pub date: NaiveDate,
    /// Sum of amounts recorded that day
    pub total: i64,
}

/// Amount charged against one expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseTotal {
    /// Expense id
    pub expense_id: String,
    /// Expense title, or [`UNKNOWN_LABEL`]
    pub title: String,
    /// Sum of amounts
    pub total: i64,
}

/// Derived totals for one expense header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStat {
    /// Expense id
    pub id: String,
    /// Expense title
    pub title: String,
    /// Meal date
    pub date: NaiveDate,
    /// Sum of amounts
    pub total: i64,
    /// Sum of received amounts
    pub received: i64,
    /// `total - received`
    pub debt: i64,
    /// Derived from `total` and `received`
    pub status: PaymentStatus,
    /// Number of transactions attached
    pub transaction_count: usize,
}

/// Collected versus outstanding money, for the collection ratio chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSplit {
    /// Amount received
    pub collected: i64,
    /// Amount still owed
    pub outstanding: i64,
}

/// Sums the amount owed over all transactions.
#[must_use]
pub fn total_amount(transactions: &[TransactionModel]) -> i64 {
    transactions
        .iter()
        .fold(0_i64, |acc, tx| acc.saturating_add(tx.amount))
}

/// Sums the amount received over all transactions.
#[must_use]
pub fn total_received(transactions: &[TransactionModel]) -> i64 {
    transactions
        .iter()
        .fold(0_i64, |acc, tx| acc.saturating_add(tx.received_amount))
}

/// Amount owed minus amount received. Not clamped: inconsistent inputs show through.
#[must_use]
pub fn total_debt(transactions: &[TransactionModel]) -> i64 {
    total_amount(transactions).saturating_sub(total_received(transactions))
}

/// Most recent transaction creation time.
#[must_use]
pub fn latest_activity(transactions: &[TransactionModel]) -> Option<DateTime<Utc>> {
    transactions.iter().map(|tx| tx.created_at).max()
}

#[derive(Debug, Default, Clone, Copy)]
struct Sums {
    total: i64,
    received: i64,
    count: usize,
}

fn sums_by<'a, F>(transactions: &'a [TransactionModel], key: F) -> BTreeMap<&'a str, Sums>
where
    F: Fn(&'a TransactionModel) -> &'a str,
{
    let mut groups: BTreeMap<&str, Sums> = BTreeMap::new();
    for tx in transactions {
        let entry = groups.entry(key(tx)).or_default();
        entry.total = entry.total.saturating_add(tx.amount);
        entry.received = entry.received.saturating_add(tx.received_amount);
        entry.count += 1;
    }
    groups
}

/// Per-employee totals, debt and derived status, ordered by employee id.
///
/// Only employees that appear in `transactions` are reported. Transactions whose
/// employee is not in `employees` are left out here; they still count toward the
/// employee-independent totals.
#[must_use]
pub fn per_employee_stats(
    transactions: &[TransactionModel],
    employees: &[EmployeeModel],
) -> Vec<EmployeeStat> {
    let directory: HashMap<&str, &EmployeeModel> =
        employees.iter().map(|e| (e.id.as_str(), e)).collect();

    sums_by(transactions, |tx| tx.employee_id.as_str())
        .into_iter()
        .filter_map(|(id, sums)| {
            let employee = directory.get(id)?;
            Some(EmployeeStat {
                id: id.to_string(),
                name: employee.display_name().to_string(),
                total: sums.total,
                received: sums.received,
                debt: sums.total.saturating_sub(sums.received),
                status: derive_status(sums.total, sums.received),
            })
        })
        .collect()
}

/// Picks the `n` largest debts from already computed stats. Ties go to the lower id.
#[must_use]
pub fn rank_debtors(stats: &[EmployeeStat], n: usize) -> Vec<EmployeeStat> {
    let mut ranked: Vec<EmployeeStat> = stats.iter().filter(|s| s.debt > 0).cloned().collect();
    ranked.sort_by(|a, b| b.debt.cmp(&a.debt).then_with(|| a.id.cmp(&b.id)));
    ranked.truncate(n);
    ranked
}

/// Picks the `n` largest received amounts from already computed stats, zero included.
/// Ties go to the lower id.
#[must_use]
pub fn rank_collectors(stats: &[EmployeeStat], n: usize) -> Vec<EmployeeStat> {
    let mut ranked = stats.to_vec();
    ranked.sort_by(|a, b| b.received.cmp(&a.received).then_with(|| a.id.cmp(&b.id)));
    ranked.truncate(n);
    ranked
}

/// Employees with a positive debt, largest first, at most `n`.
#[must_use]
pub fn top_debtors(
    transactions: &[TransactionModel],
    employees: &[EmployeeModel],
    n: usize,
) -> Vec<EmployeeStat> {
    rank_debtors(&per_employee_stats(transactions, employees), n)
}

/// Employees by amount received, largest first, at most `n`.
#[must_use]
pub fn top_collectors(
    transactions: &[TransactionModel],
    employees: &[EmployeeModel],
    n: usize,
) -> Vec<EmployeeStat> {
    rank_collectors(&per_employee_stats(transactions, employees), n)
}

/// Amount recorded per UTC calendar day, in date order.
#[must_use]
pub fn daily_totals(transactions: &[TransactionModel]) -> Vec<DailyTotal> {
    daily_totals_with_offset(transactions, &Utc.fix())
}

/// Amount recorded per calendar day in the given UTC offset, in date order.
///
/// Days are grouped by the transaction's creation time, not by the expense date.
#[must_use]
pub fn daily_totals_with_offset(
    transactions: &[TransactionModel],
    offset: &FixedOffset,
) -> Vec<DailyTotal> {
    let mut days: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for tx in transactions {
        let day = tx.created_at.with_timezone(offset).date_naive();
        let total = days.entry(day).or_default();
        *total = total.saturating_add(tx.amount);
    }
    days.into_iter()
        .map(|(date, total)| DailyTotal { date, total })
        .collect()
}

/// Amount per expense, largest first. Ties go to the lower expense id.
///
/// Transactions whose expense is missing are kept under [`UNKNOWN_LABEL`].
#[must_use]
pub fn expense_totals(
    transactions: &[TransactionModel],
    expenses: &[ExpenseModel],
) -> Vec<ExpenseTotal> {
    let titles: HashMap<&str, &str> = expenses
        .iter()
        .map(|e| (e.id.as_str(), e.title.as_str()))
        .collect();

    let mut totals: Vec<ExpenseTotal> = sums_by(transactions, |tx| tx.expense_id.as_str())
        .into_iter()
        .map(|(id, sums)| ExpenseTotal {
            expense_id: id.to_string(),
            title: titles.get(id).copied().unwrap_or(UNKNOWN_LABEL).to_string(),
            total: sums.total,
        })
        .collect();

    totals.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.expense_id.cmp(&b.expense_id))
    });
    totals
}

/// Derived totals for every expense header, newest date first.
///
/// Expenses without transactions report zero totals and `unpaid`.
#[must_use]
pub fn expense_stats(
    transactions: &[TransactionModel],
    expenses: &[ExpenseModel],
) -> Vec<ExpenseStat> {
    let sums = sums_by(transactions, |tx| tx.expense_id.as_str());

    let mut stats: Vec<ExpenseStat> = expenses
        .iter()
        .map(|expense| {
            let s = sums.get(expense.id.as_str()).copied().unwrap_or_default();
            ExpenseStat {
                id: expense.id.clone(),
                title: expense.title.clone(),
                date: expense.date,
                total: s.total,
                received: s.received,
                debt: s.total.saturating_sub(s.received),
                status: derive_status(s.total, s.received),
                transaction_count: s.count,
            }
        })
        .collect();

    stats.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
    stats
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    /// First day included
    pub start: NaiveDate,
    /// Last day included
    pub end: NaiveDate,
}

impl DateWindow {
    /// The Monday-to-Sunday week containing `date`.
    #[must_use]
    pub fn week_of(date: NaiveDate) -> Self {
        let from_monday = u64::from(date.weekday().num_days_from_monday());
        let start = date - Days::new(from_monday);
        Self {
            start,
            end: start + Days::new(6),
        }
    }

    /// Whether `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One row of the employee detail report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeLine {
    /// Transaction id
    pub transaction_id: String,
    /// Expense id
    pub expense_id: String,
    /// Expense title, or [`UNKNOWN_LABEL`]
    pub expense_title: String,
    /// Expense date, when the expense is known
    pub expense_date: Option<NaiveDate>,
    /// Amount owed
    pub amount: i64,
    /// Amount received
    pub received_amount: i64,
    /// Stored status of the row
    pub status: PaymentStatus,
    /// Row note
    pub note: Option<String>,
}

/// Everything the employee detail page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeReport {
    /// Employee id
    pub employee_id: String,
    /// Display name, or [`UNKNOWN_LABEL`] when the employee is missing
    pub name: String,
    /// Window applied, if any
    pub window: Option<DateWindow>,
    /// Sum of amounts in the window
    pub total: i64,
    /// Sum of received amounts in the window
    pub received: i64,
    /// `total - received`
    pub debt: i64,
    /// Number of rows whose stored status is `unpaid`
    pub unpaid_count: usize,
    /// Rows, newest expense date first
    pub lines: Vec<EmployeeLine>,
}

/// Builds the detail report for one employee.
///
/// With a `window`, only transactions whose expense date falls inside it are included;
/// transactions whose expense is missing have no date and are then left out.
#[must_use]
pub fn employee_report(
    employee_id: &str,
    employees: &[EmployeeModel],
    transactions: &[TransactionModel],
    expenses: &[ExpenseModel],
    window: Option<DateWindow>,
) -> EmployeeReport {
    let by_id: HashMap<&str, &ExpenseModel> =
        expenses.iter().map(|e| (e.id.as_str(), e)).collect();

    let mut rows: Vec<(&TransactionModel, Option<&ExpenseModel>)> = transactions
        .iter()
        .filter(|tx| tx.employee_id == employee_id)
        .map(|tx| (tx, by_id.get(tx.expense_id.as_str()).copied()))
        .filter(|(_, expense)| {
            window.is_none_or(|w| expense.is_some_and(|e| w.contains(e.date)))
        })
        .collect();

    rows.sort_by(|(tx_a, exp_a), (tx_b, exp_b)| {
        let date_a = exp_a.map(|e| e.date);
        let date_b = exp_b.map(|e| e.date);
        date_b
            .cmp(&date_a)
            .then_with(|| tx_b.created_at.cmp(&tx_a.created_at))
            .then_with(|| tx_a.id.cmp(&tx_b.id))
    });

    let total = rows
        .iter()
        .fold(0_i64, |acc, (tx, _)| acc.saturating_add(tx.amount));
    let received = rows
        .iter()
        .fold(0_i64, |acc, (tx, _)| acc.saturating_add(tx.received_amount));
    let unpaid_count = rows
        .iter()
        .filter(|(tx, _)| tx.status == PaymentStatus::Unpaid)
        .count();

    let name = employees
        .iter()
        .find(|e| e.id == employee_id)
        .map_or_else(|| UNKNOWN_LABEL.to_string(), |e| e.display_name().to_string());

    let lines = rows
        .into_iter()
        .map(|(tx, expense)| EmployeeLine {
            transaction_id: tx.id.clone(),
            expense_id: tx.expense_id.clone(),
            expense_title: expense.map_or_else(|| UNKNOWN_LABEL.to_string(), |e| e.title.clone()),
            expense_date: expense.map(|e| e.date),
            amount: tx.amount,
            received_amount: tx.received_amount,
            status: tx.status,
            note: tx.note.clone(),
        })
        .collect();

    EmployeeReport {
        employee_id: employee_id.to_string(),
        name,
        window,
        total,
        received,
        debt: total.saturating_sub(received),
        unpaid_count,
        lines,
    }
}

/// Knobs for [`Summary::build`].
#[derive(Debug, Clone, Copy)]
pub struct SummaryOptions {
    /// Length of the top debtors / collectors lists
    pub top_n: usize,
    /// Offset used to cut transactions into calendar days
    pub offset: FixedOffset,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            offset: Utc.fix(),
        }
    }
}

/// Every dashboard view computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Sum of amounts
    pub total_amount: i64,
    /// Sum of received amounts
    pub total_received: i64,
    /// `total_amount - total_received`
    pub total_debt: i64,
    /// Number of transactions
    pub transaction_count: usize,
    /// Most recent transaction creation time
    pub latest_activity: Option<DateTime<Utc>>,
    /// Collected versus outstanding
    pub collection: CollectionSplit,
    /// Per-employee stats
    pub employee_stats: Vec<EmployeeStat>,
    /// Largest debts
    pub top_debtors: Vec<EmployeeStat>,
    /// Largest collections
    pub top_collectors: Vec<EmployeeStat>,
    /// Amount per day
    pub daily_totals: Vec<DailyTotal>,
    /// Amount per expense
    pub expense_totals: Vec<ExpenseTotal>,
}

impl Summary {
    /// Computes every view from one snapshot.
    #[must_use]
    pub fn build(
        employees: &[EmployeeModel],
        expenses: &[ExpenseModel],
        transactions: &[TransactionModel],
        options: &SummaryOptions,
    ) -> Self {
        let total_amount = total_amount(transactions);
        let total_received = total_received(transactions);
        let employee_stats = per_employee_stats(transactions, employees);

        Self {
            total_amount,
            total_received,
            total_debt: total_amount.saturating_sub(total_received),
            transaction_count: transactions.len(),
            latest_activity: latest_activity(transactions),
            collection: CollectionSplit {
                collected: total_received,
                outstanding: total_amount.saturating_sub(total_received),
            },
            top_debtors: rank_debtors(&employee_stats, options.top_n),
            top_collectors: rank_collectors(&employee_stats, options.top_n),
            employee_stats,
            daily_totals: daily_totals_with_offset(transactions, &options.offset),
            expense_totals: expense_totals(transactions, expenses),
        }
    }
}
