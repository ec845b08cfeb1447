//! Transaction business logic - Handles all expense transaction operations.
//!
//! A transaction is one employee's charge against one expense. Every write keeps the
//! stored status consistent with the amounts (see `core::status`), refuses a second
//! charge for the same `(expense, employee)` pair and requires the expense to exist.
//! The employee reference is not checked; charges may outlive their employee.

use crate::{
    core::{
        payment,
        status::resolve_payment,
        validation::{optional_text, require_text, validate_amount},
    },
    entities::{Expense, ExpenseTransaction, PaymentStatus, TransactionModel, expense_transaction},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Select, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Fields accepted when recording a charge.
///
/// `received_amount` and `status` are both optional: whichever is missing is derived
/// from the other, and both missing means nothing has been received yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// Expense being charged
    pub expense_id: String,
    /// Employee who owes the amount
    pub employee_id: String,
    /// Amount owed
    pub amount: i64,
    /// Amount already received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_amount: Option<i64>,
    /// Free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Requested status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
}

impl NewTransaction {
    /// An unpaid charge with nothing received.
    #[must_use]
    pub fn unpaid(expense_id: &str, employee_id: &str, amount: i64, note: Option<String>) -> Self {
        Self {
            expense_id: expense_id.to_string(),
            employee_id: employee_id.to_string(),
            amount,
            received_amount: Some(0),
            note,
            status: Some(PaymentStatus::Unpaid),
        }
    }
}

/// Partial update of a transaction. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    /// New amount owed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// New amount received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_amount: Option<i64>,
    /// New note; an empty string clears it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// New status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
}

/// Which transactions to return. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    /// Only charges against this expense
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_id: Option<String>,
    /// Only charges owed by this employee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
}

impl TransactionFilter {
    /// Charges owed by one employee.
    #[must_use]
    pub fn for_employee(employee_id: &str) -> Self {
        Self {
            employee_id: Some(employee_id.to_string()),
            ..Self::default()
        }
    }

    /// Charges against one expense.
    #[must_use]
    pub fn for_expense(expense_id: &str) -> Self {
        Self {
            expense_id: Some(expense_id.to_string()),
            ..Self::default()
        }
    }
}

/// Records a new charge.
///
/// Runs inside a database transaction so the existence and uniqueness checks and the
/// insert see the same state.
///
/// # Errors
/// - `Error::InvalidAmount` / `Error::InconsistentStatus` for bad amounts or statuses
/// - `Error::ExpenseNotFound` when the expense does not exist
/// - `Error::DuplicateTransaction` when the employee is already charged on the expense
pub async fn create_transaction(
    db: &DatabaseConnection,
    new: NewTransaction,
) -> Result<TransactionModel> {
    let txn = db.begin().await?;
    let model = insert_transaction(&txn, new).await?;
    txn.commit().await?;
    Ok(model)
}

/// Inserts a charge on an existing connection or database transaction.
///
/// Callers that batch several writes thread their own transaction through here.
///
/// # Errors
/// Same as [`create_transaction`].
pub async fn insert_transaction<C>(conn: &C, new: NewTransaction) -> Result<TransactionModel>
where
    C: ConnectionTrait,
{
    let employee_id = require_text("employeeId", &new.employee_id)?;
    let amount = validate_amount(new.amount)?;
    let (received, status) = resolve_payment(amount, 0, new.received_amount, new.status)?;

    Expense::find_by_id(new.expense_id.as_str())
        .one(conn)
        .await?
        .ok_or_else(|| Error::ExpenseNotFound {
            id: new.expense_id.clone(),
        })?;

    let existing = ExpenseTransaction::find()
        .filter(expense_transaction::Column::ExpenseId.eq(new.expense_id.as_str()))
        .filter(expense_transaction::Column::EmployeeId.eq(employee_id.as_str()))
        .one(conn)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateTransaction {
            expense_id: new.expense_id,
            employee_id,
        });
    }

    let now = chrono::Utc::now();
    let model = expense_transaction::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        expense_id: Set(new.expense_id),
        employee_id: Set(employee_id),
        amount: Set(amount),
        received_amount: Set(received),
        note: Set(optional_text(new.note)),
        status: Set(status),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = model.insert(conn).await?;
    debug!(
        id = %created.id,
        expense_id = %created.expense_id,
        employee_id = %created.employee_id,
        amount = created.amount,
        "Created transaction"
    );
    Ok(created)
}

/// Returns the charges matching `filter`, oldest first.
pub async fn filter_transactions(
    db: &DatabaseConnection,
    filter: &TransactionFilter,
) -> Result<Vec<TransactionModel>> {
    filtered_query(filter)
        .all(db)
        .await
        .map_err(Into::into)
}

fn filtered_query(filter: &TransactionFilter) -> Select<ExpenseTransaction> {
    let mut query = ExpenseTransaction::find();
    if let Some(expense_id) = &filter.expense_id {
        query = query.filter(expense_transaction::Column::ExpenseId.eq(expense_id.as_str()));
    }
    if let Some(employee_id) = &filter.employee_id {
        query = query.filter(expense_transaction::Column::EmployeeId.eq(employee_id.as_str()));
    }
    query
        .order_by_asc(expense_transaction::Column::CreatedAt)
        .order_by_asc(expense_transaction::Column::Id)
}

/// Retrieves a specific transaction by its ID.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: &str,
) -> Result<Option<TransactionModel>> {
    ExpenseTransaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update.
///
/// When only the amount changes the status is re-derived from the stored received
/// amount; when only the status changes the received amount follows it.
///
/// # Errors
/// - `Error::TransactionNotFound` when the id is unknown
/// - `Error::InvalidAmount` / `Error::InconsistentStatus` when the result would break
///   the status rules (including lowering the amount below what was already received)
pub async fn update_transaction(
    db: &DatabaseConnection,
    transaction_id: &str,
    patch: TransactionPatch,
) -> Result<TransactionModel> {
    let txn = db.begin().await?;
    let updated = patch_transaction(&txn, transaction_id, patch).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Applies a partial update on an existing connection or database transaction.
///
/// # Errors
/// Same as [`update_transaction`].
pub async fn patch_transaction<C>(
    conn: &C,
    transaction_id: &str,
    patch: TransactionPatch,
) -> Result<TransactionModel>
where
    C: ConnectionTrait,
{
    let current = ExpenseTransaction::find_by_id(transaction_id)
        .one(conn)
        .await?
        .ok_or_else(|| Error::TransactionNotFound {
            id: transaction_id.to_string(),
        })?;

    let amount = match patch.amount {
        Some(amount) => validate_amount(amount)?,
        None => current.amount,
    };
    let (received, status) = resolve_payment(
        amount,
        current.received_amount,
        patch.received_amount,
        patch.status,
    )?;

    let mut active: expense_transaction::ActiveModel = current.into();
    active.amount = Set(amount);
    active.received_amount = Set(received);
    active.status = Set(status);
    if let Some(note) = patch.note {
        active.note = Set(optional_text(Some(note)));
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(conn).await?;
    debug!(id = %updated.id, status = %updated.status, "Updated transaction");
    Ok(updated)
}

/// Deletes a transaction.
///
/// # Errors
/// Returns `Error::TransactionNotFound` when nothing was deleted.
pub async fn delete_transaction(db: &DatabaseConnection, transaction_id: &str) -> Result<()> {
    let result = ExpenseTransaction::delete_by_id(transaction_id)
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::TransactionNotFound {
            id: transaction_id.to_string(),
        });
    }
    debug!(id = transaction_id, "Deleted transaction");
    Ok(())
}

/// Marks every outstanding charge of an employee as fully paid in one database
/// transaction, returning the rows that changed.
pub async fn apply_pay_all(
    db: &DatabaseConnection,
    employee_id: &str,
) -> Result<Vec<TransactionModel>> {
    let txn = db.begin().await?;

    let owned = filtered_query(&TransactionFilter::for_employee(employee_id))
        .all(&txn)
        .await?;

    let mut settled = Vec::new();
    for intent in payment::pay_all(employee_id, &owned) {
        settled.push(patch_transaction(&txn, &intent.transaction_id, intent.patch).await?);
    }

    txn.commit().await?;
    debug!(employee_id, count = settled.len(), "Applied pay-all");
    Ok(settled)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_transaction_validation() -> Result<()> {
        let (db, expense) = setup_with_expense().await?;

        let mut new = NewTransaction::unpaid(&expense.id, "u1", -10, None);
        let result = insert_transaction(&db, new.clone()).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: -10 })));

        new.amount = 100;
        new.employee_id = "  ".to_string();
        let result = insert_transaction(&db, new.clone()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        new.employee_id = "u1".to_string();
        new.status = Some(PaymentStatus::Paid);
        new.received_amount = Some(50);
        let result = insert_transaction(&db, new).await;
        assert!(matches!(result, Err(Error::InconsistentStatus { .. })));

        assert!(filter_transactions(&db, &TransactionFilter::default()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_expense_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_transaction(&db, NewTransaction::unpaid("missing", "u1", 100, None)).await;
        assert!(matches!(result, Err(Error::ExpenseNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_transaction_derives_status() -> Result<()> {
        let (db, expense) = setup_with_expense().await?;

        let new = NewTransaction {
            expense_id: expense.id.clone(),
            employee_id: "u1".to_string(),
            amount: 300,
            received_amount: Some(100),
            note: Some("  Cơm gà  ".to_string()),
            status: None,
        };
        let created = create_transaction(&db, new).await?;

        assert_eq!(created.status, PaymentStatus::Partial);
        assert_eq!(created.received_amount, 100);
        assert_eq!(created.note.as_deref(), Some("Cơm gà"));

        let stored = get_transaction_by_id(&db, &created.id).await?.unwrap();
        assert_eq!(stored, created);

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_transaction_rejected() -> Result<()> {
        let (db, expense) = setup_with_expense().await?;

        create_test_transaction(&db, &expense.id, "u1", 100).await?;
        let result = create_test_transaction(&db, &expense.id, "u1", 200).await;
        assert!(matches!(result, Err(Error::DuplicateTransaction { .. })));

        // Same employee on a different expense is fine.
        let other = create_test_expense(&db, "Thứ 3").await?;
        create_test_transaction(&db, &other.id, "u1", 200).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_orphan_employee_is_tolerated() -> Result<()> {
        let (db, expense) = setup_with_expense().await?;
        let created = create_test_transaction(&db, &expense.id, "no-such-employee", 100).await?;
        assert_eq!(created.employee_id, "no-such-employee");
        Ok(())
    }

    #[tokio::test]
    async fn test_filter_transactions() -> Result<()> {
        let db = setup_test_db().await?;
        let monday = create_test_expense(&db, "Thứ 2").await?;
        let tuesday = create_test_expense(&db, "Thứ 3").await?;

        let a = create_test_transaction(&db, &monday.id, "u1", 100).await?;
        let b = create_test_transaction(&db, &monday.id, "u2", 200).await?;
        let c = create_test_transaction(&db, &tuesday.id, "u1", 300).await?;

        let all = filter_transactions(&db, &TransactionFilter::default()).await?;
        assert_eq!(all.len(), 3);

        let by_expense = filter_transactions(&db, &TransactionFilter::for_expense(&monday.id)).await?;
        assert_eq!(by_expense, vec![a.clone(), b]);

        let by_employee = filter_transactions(&db, &TransactionFilter::for_employee("u1")).await?;
        assert_eq!(by_employee, vec![a.clone(), c]);

        let both = TransactionFilter {
            expense_id: Some(monday.id.clone()),
            employee_id: Some("u1".to_string()),
        };
        assert_eq!(filter_transactions(&db, &both).await?, vec![a]);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_normalizes_received() -> Result<()> {
        let (db, expense) = setup_with_expense().await?;
        let tx = create_test_transaction(&db, &expense.id, "u1", 300).await?;

        let paid = update_transaction(
            &db,
            &tx.id,
            TransactionPatch {
                status: Some(PaymentStatus::Paid),
                ..TransactionPatch::default()
            },
        )
        .await?;
        assert_eq!(paid.received_amount, 300);

        let unpaid = update_transaction(
            &db,
            &tx.id,
            TransactionPatch {
                status: Some(PaymentStatus::Unpaid),
                ..TransactionPatch::default()
            },
        )
        .await?;
        assert_eq!(unpaid.received_amount, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_amount_rederives_status() -> Result<()> {
        let (db, expense) = setup_with_expense().await?;
        let tx = create_test_transaction(&db, &expense.id, "u1", 100).await?;
        update_transaction(
            &db,
            &tx.id,
            TransactionPatch {
                received_amount: Some(100),
                ..TransactionPatch::default()
            },
        )
        .await?;

        let raised = update_transaction(
            &db,
            &tx.id,
            TransactionPatch {
                amount: Some(300),
                ..TransactionPatch::default()
            },
        )
        .await?;
        assert_eq!(raised.status, PaymentStatus::Partial);
        assert_eq!(raised.received_amount, 100);

        let lowered = update_transaction(
            &db,
            &tx.id,
            TransactionPatch {
                amount: Some(50),
                ..TransactionPatch::default()
            },
        )
        .await;
        assert!(matches!(lowered, Err(Error::InconsistentStatus { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_transaction() -> Result<()> {
        let db = setup_test_db().await?;

        let result = update_transaction(&db, "missing", TransactionPatch::default()).await;
        assert!(matches!(result, Err(Error::TransactionNotFound { .. })));

        let result = delete_transaction(&db, "missing").await;
        assert!(matches!(result, Err(Error::TransactionNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_transaction() -> Result<()> {
        let (db, expense) = setup_with_expense().await?;
        let tx = create_test_transaction(&db, &expense.id, "u1", 100).await?;

        delete_transaction(&db, &tx.id).await?;
        assert!(get_transaction_by_id(&db, &tx.id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_apply_pay_all_settles_only_outstanding() -> Result<()> {
        let db = setup_test_db().await?;
        let e1 = create_test_expense(&db, "Thứ 2").await?;
        let e2 = create_test_expense(&db, "Thứ 3").await?;
        let e3 = create_test_expense(&db, "Thứ 4").await?;

        create_test_transaction(&db, &e1.id, "u1", 100).await?;
        let partial = create_test_transaction(&db, &e2.id, "u1", 200).await?;
        update_transaction(
            &db,
            &partial.id,
            TransactionPatch {
                received_amount: Some(50),
                ..TransactionPatch::default()
            },
        )
        .await?;
        create_test_transaction(&db, &e3.id, "u2", 300).await?;

        let settled = apply_pay_all(&db, "u1").await?;
        assert_eq!(settled.len(), 2);
        assert!(settled.iter().all(|tx| tx.status == PaymentStatus::Paid));
        assert!(settled.iter().all(|tx| tx.received_amount == tx.amount));

        // Nothing left to settle the second time.
        assert!(apply_pay_all(&db, "u1").await?.is_empty());

        // Other employees are untouched.
        let u2 = filter_transactions(&db, &TransactionFilter::for_employee("u2")).await?;
        assert_eq!(u2[0].status, PaymentStatus::Unpaid);

        Ok(())
    }
}
