//! Expense business logic - Payment batches for a meal date.
//!
//! Expenses are headers only. Their totals live in the attached transactions and are
//! computed by `core::report`, never written back here.

use crate::{
    core::{
        transaction::{NewTransaction, insert_transaction},
        validation::{ExpenseDraft, optional_text, require_text, validate_range},
    },
    entities::{
        Expense, ExpenseModel, ExpenseTransaction, NameList, Session, TransactionModel, expense,
        expense_transaction, session,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Fields accepted when creating an expense header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    /// Expense title
    pub title: String,
    /// Meal date
    pub date: NaiveDate,
    /// Optional notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Tag names to attach
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<String>,
}

impl From<&ExpenseDraft> for NewExpense {
    fn from(draft: &ExpenseDraft) -> Self {
        Self {
            title: draft.title.clone(),
            date: draft.date,
            notes: draft.notes.clone(),
            tag_ids: draft.tags.clone(),
        }
    }
}

/// An expense together with the charges created alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseWithTransactions {
    /// The new header
    pub expense: ExpenseModel,
    /// One charge per selection
    pub transactions: Vec<TransactionModel>,
}

/// Creates an expense header.
///
/// # Errors
/// Returns `Error::Validation` when the title is blank.
pub async fn create_expense(db: &DatabaseConnection, new: NewExpense) -> Result<ExpenseModel> {
    let created = insert_expense(db, new).await?;
    info!(id = %created.id, title = %created.title, date = %created.date, "Created expense");
    Ok(created)
}

/// Inserts an expense header on any connection or database transaction.
///
/// # Errors
/// Returns `Error::Validation` when the title is blank.
pub async fn insert_expense<C>(conn: &C, new: NewExpense) -> Result<ExpenseModel>
where
    C: ConnectionTrait,
{
    let title = require_text("title", &new.title)?;

    let model = expense::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        title: Set(title),
        date: Set(new.date),
        notes: Set(optional_text(new.notes)),
        is_collected: Set(false),
        tag_ids: Set(NameList::cleaned(&new.tag_ids)),
        created_at: Set(chrono::Utc::now()),
    };

    model.insert(conn).await.map_err(Into::into)
}

/// Creates an expense and one unpaid charge per selected employee, all or nothing.
///
/// # Errors
/// Returns the draft's validation error before touching the database, or the first
/// store error, in which case nothing is written.
pub async fn create_expense_with_transactions(
    db: &DatabaseConnection,
    draft: &ExpenseDraft,
) -> Result<ExpenseWithTransactions> {
    draft.validate()?;

    let txn = db.begin().await?;
    let expense = insert_expense(&txn, NewExpense::from(draft)).await?;

    let mut transactions = Vec::with_capacity(draft.selections.len());
    for selection in &draft.selections {
        let new = NewTransaction::unpaid(
            &expense.id,
            &selection.employee_id,
            selection.amount,
            selection.note.clone(),
        );
        transactions.push(insert_transaction(&txn, new).await?);
    }

    txn.commit().await?;
    info!(
        id = %expense.id,
        employees = transactions.len(),
        total = draft.total(),
        "Created expense with transactions"
    );
    Ok(ExpenseWithTransactions {
        expense,
        transactions,
    })
}

/// Lists every expense, newest meal date first.
pub async fn list_expenses(db: &DatabaseConnection) -> Result<Vec<ExpenseModel>> {
    Expense::find()
        .order_by_desc(expense::Column::Date)
        .order_by_desc(expense::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists expenses whose meal date falls in `start..=end`, newest first.
///
/// # Errors
/// Returns `Error::Validation` when `start` is after `end`.
pub async fn list_expenses_in_range(
    db: &DatabaseConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ExpenseModel>> {
    validate_range(start, end)?;

    Expense::find()
        .filter(expense::Column::Date.between(start, end))
        .order_by_desc(expense::Column::Date)
        .order_by_desc(expense::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an expense by ID.
pub async fn get_expense_by_id(
    db: &DatabaseConnection,
    expense_id: &str,
) -> Result<Option<ExpenseModel>> {
    Expense::find_by_id(expense_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Flips the collected flag and returns the updated expense.
///
/// # Errors
/// Returns `Error::ExpenseNotFound` for an unknown id.
pub async fn toggle_collected(db: &DatabaseConnection, expense_id: &str) -> Result<ExpenseModel> {
    let current = get_expense_by_id(db, expense_id)
        .await?
        .ok_or_else(|| Error::ExpenseNotFound {
            id: expense_id.to_string(),
        })?;

    let flipped = !current.is_collected;
    let mut active: expense::ActiveModel = current.into();
    active.is_collected = Set(flipped);

    let updated = active.update(db).await?;
    debug!(id = expense_id, is_collected = flipped, "Toggled collected");
    Ok(updated)
}

/// Deletes an expense together with its transactions and sessions.
///
/// # Errors
/// Returns `Error::ExpenseNotFound` for an unknown id.
pub async fn delete_expense(db: &DatabaseConnection, expense_id: &str) -> Result<()> {
    let txn = db.begin().await?;

    Expense::find_by_id(expense_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ExpenseNotFound {
            id: expense_id.to_string(),
        })?;

    let transactions = ExpenseTransaction::delete_many()
        .filter(expense_transaction::Column::ExpenseId.eq(expense_id))
        .exec(&txn)
        .await?;
    let sessions = Session::delete_many()
        .filter(session::Column::ExpenseId.eq(expense_id))
        .exec(&txn)
        .await?;
    Expense::delete_by_id(expense_id).exec(&txn).await?;

    txn.commit().await?;
    info!(
        id = expense_id,
        transactions = transactions.rows_affected,
        sessions = sessions.rows_affected,
        "Deleted expense"
    );
    Ok(())
}
