//! Session business logic - Menus offered against an expense.
//!
//! A session lists the food items employees may pick for one expense. Submitting an
//! order prices the picks against the menu and records the result as the employee's
//! transaction on that expense, updating it when the employee orders again.

use crate::{
    core::{
        expense::{NewExpense, insert_expense},
        menu::price_selection,
        transaction::{NewTransaction, TransactionPatch, insert_transaction, patch_transaction},
        validation::require_text,
    },
    entities::{
        Expense, ExpenseModel, ExpenseTransaction, FoodItem, NameList, Session, SessionModel,
        TransactionModel, expense_transaction, session,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Fields accepted when opening a session on an existing expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    /// Expense the orders are charged to
    pub expense_id: String,
    /// Item names on offer
    #[serde(default)]
    pub items: Vec<String>,
}

/// Fields accepted when opening a session together with a new expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionWithExpense {
    /// Title of the new expense
    pub title: String,
    /// Meal date of the new expense
    pub date: NaiveDate,
    /// Tag names for the new expense
    #[serde(default)]
    pub tags: Vec<String>,
    /// Item names on offer
    #[serde(default)]
    pub items: Vec<String>,
}

/// A session and the expense it was opened with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWithExpense {
    /// The new expense
    pub expense: ExpenseModel,
    /// The new session
    pub session: SessionModel,
}

/// An employee's picks from a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOrder {
    /// Employee ordering
    pub employee_id: String,
    /// Picked item names
    pub items: Vec<String>,
}

async fn insert_session<C>(conn: &C, expense_id: &str, items: &[String]) -> Result<SessionModel>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();
    let model = session::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        expense_id: Set(expense_id.to_string()),
        items: Set(NameList::cleaned(items)),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    model.insert(conn).await.map_err(Into::into)
}

/// Opens an active session on an existing expense.
///
/// # Errors
/// Returns `Error::ExpenseNotFound` when the expense does not exist.
pub async fn create_session(
    db: &DatabaseConnection,
    expense_id: &str,
    items: Vec<String>,
) -> Result<SessionModel> {
    Expense::find_by_id(expense_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::ExpenseNotFound {
            id: expense_id.to_string(),
        })?;

    let created = insert_session(db, expense_id, &items).await?;
    info!(id = %created.id, expense_id, items = created.items.len(), "Opened session");
    Ok(created)
}

/// Creates an expense and opens a session on it in one database transaction.
///
/// # Errors
/// Returns `Error::Validation` when the title is blank.
pub async fn create_session_with_expense(
    db: &DatabaseConnection,
    new: NewSessionWithExpense,
) -> Result<SessionWithExpense> {
    let txn = db.begin().await?;

    let expense = insert_expense(
        &txn,
        NewExpense {
            title: new.title,
            date: new.date,
            notes: None,
            tag_ids: new.tags,
        },
    )
    .await?;
    let session = insert_session(&txn, &expense.id, &new.items).await?;

    txn.commit().await?;
    info!(id = %session.id, expense_id = %expense.id, "Opened session with new expense");
    Ok(SessionWithExpense { expense, session })
}

/// Lists every session, most recently opened first.
pub async fn list_sessions(db: &DatabaseConnection) -> Result<Vec<SessionModel>> {
    Session::find()
        .order_by_desc(session::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a session by ID.
pub async fn get_session_by_id(
    db: &DatabaseConnection,
    session_id: &str,
) -> Result<Option<SessionModel>> {
    Session::find_by_id(session_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_session(db: &DatabaseConnection, session_id: &str) -> Result<SessionModel> {
    get_session_by_id(db, session_id)
        .await?
        .ok_or_else(|| Error::SessionNotFound {
            id: session_id.to_string(),
        })
}

/// Opens or closes a session for orders.
///
/// # Errors
/// Returns `Error::SessionNotFound` for an unknown id.
pub async fn set_session_active(
    db: &DatabaseConnection,
    session_id: &str,
    is_active: bool,
) -> Result<SessionModel> {
    let mut active: session::ActiveModel = require_session(db, session_id).await?.into();
    active.is_active = Set(is_active);
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(db).await?;
    info!(id = session_id, is_active, "Changed session state");
    Ok(updated)
}

/// Replaces the items a session offers.
///
/// # Errors
/// Returns `Error::SessionNotFound` for an unknown id.
pub async fn update_session_items(
    db: &DatabaseConnection,
    session_id: &str,
    items: Vec<String>,
) -> Result<SessionModel> {
    let mut active: session::ActiveModel = require_session(db, session_id).await?.into();
    active.items = Set(NameList::cleaned(&items));
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Records an employee's order against a session's expense.
///
/// The picks must be offered by the session and priced on the menu. The employee's
/// existing transaction on the expense gets the new amount and note; otherwise an
/// unpaid transaction is created. A received amount above the new price is capped to
/// it, so a cheaper re-order of a settled charge stays paid.
///
/// # Errors
/// - `Error::SessionNotFound` / `Error::SessionInactive` when the session cannot take
///   orders
/// - `Error::Validation` when nothing is picked, a pick is not offered, or a pick has
///   no menu price
pub async fn submit_order(
    db: &DatabaseConnection,
    session_id: &str,
    order: SessionOrder,
) -> Result<TransactionModel> {
    let employee_id = require_text("employeeId", &order.employee_id)?;
    let picks = NameList::cleaned(&order.items);
    if picks.is_empty() {
        return Err(Error::validation("pick at least one item"));
    }

    let txn = db.begin().await?;

    let session = Session::find_by_id(session_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::SessionNotFound {
            id: session_id.to_string(),
        })?;
    if !session.is_active {
        return Err(Error::SessionInactive {
            id: session_id.to_string(),
        });
    }

    if let Some(missing) = picks.as_slice().iter().find(|p| !session.items.contains(p)) {
        return Err(Error::validation(format!(
            "'{missing}' is not offered in this session"
        )));
    }

    let menu = FoodItem::find().all(&txn).await?;
    let quote = price_selection(picks.as_slice(), &menu);
    if !quote.unknown.is_empty() {
        return Err(Error::validation(format!(
            "no menu price for {}",
            quote.unknown.join(", ")
        )));
    }

    let existing = ExpenseTransaction::find()
        .filter(expense_transaction::Column::ExpenseId.eq(session.expense_id.as_str()))
        .filter(expense_transaction::Column::EmployeeId.eq(employee_id.as_str()))
        .one(&txn)
        .await?;

    let recorded = match existing {
        Some(current) => {
            let patch = TransactionPatch {
                amount: Some(quote.amount),
                received_amount: (current.received_amount > quote.amount).then_some(quote.amount),
                note: Some(quote.note),
                ..TransactionPatch::default()
            };
            patch_transaction(&txn, &current.id, patch).await?
        }
        None => {
            let new = NewTransaction::unpaid(
                &session.expense_id,
                &employee_id,
                quote.amount,
                Some(quote.note),
            );
            insert_transaction(&txn, new).await?
        }
    };

    txn.commit().await?;
    debug!(
        session_id,
        employee_id = %recorded.employee_id,
        amount = recorded.amount,
        "Recorded session order"
    );
    Ok(recorded)
}
