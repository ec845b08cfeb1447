//! Multi-request writes.
//!
//! Each request in a batch is independent and they run concurrently. Nothing is rolled
//! back: the report says which requests went through and which did not.

use super::{Client, ClientError, ClientResult};
use crate::{
    core::{
        expense::NewExpense, payment, transaction::NewTransaction, validation::ExpenseDraft,
    },
    entities::{ExpenseModel, TransactionModel},
};
use futures::future::join_all;
use tracing::{info, warn};

/// Outcome of a batch of updates, keyed by transaction id.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Ids updated successfully
    pub succeeded: Vec<String>,
    /// Ids whose update failed, with the reason
    pub failed: Vec<(String, ClientError)>,
}

impl BatchReport {
    /// True when nothing failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn record<T>(&mut self, id: String, result: ClientResult<T>) {
        match result {
            Ok(_) => self.succeeded.push(id),
            Err(err) => self.failed.push((id, err)),
        }
    }
}

/// An expense and the charges created for it.
#[derive(Debug)]
pub struct ExpenseBatch {
    /// The created expense
    pub expense: ExpenseModel,
    /// Charges that were created
    pub transactions: Vec<TransactionModel>,
    /// Employees whose charge failed, with the reason
    pub failed: Vec<(String, ClientError)>,
}

impl ExpenseBatch {
    /// True when every selection got its charge.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Marks every open charge of `employee_id` among `transactions` as paid, one
/// concurrent update per charge.
pub async fn pay_all(
    client: &Client,
    employee_id: &str,
    transactions: &[TransactionModel],
) -> BatchReport {
    let intents = payment::pay_all(employee_id, transactions);
    let results = join_all(intents.iter().map(|intent| async move {
        let result = client
            .update_transaction(&intent.transaction_id, &intent.patch)
            .await;
        (intent.transaction_id.clone(), result)
    }))
    .await;

    let mut report = BatchReport::default();
    for (id, result) in results {
        report.record(id, result);
    }

    if report.is_complete() {
        info!(employee_id, settled = report.succeeded.len(), "Paid all");
    } else {
        warn!(
            employee_id,
            settled = report.succeeded.len(),
            failed = report.failed.len(),
            "Pay all finished partially"
        );
    }
    report
}

/// Creates an expense, then one unpaid charge per selection.
///
/// The draft is validated before anything is sent. Once the expense exists, failed
/// charges are reported in [`ExpenseBatch::failed`] rather than undone.
///
/// # Errors
/// Returns `Validation` for an invalid draft, or the error of the expense creation.
pub async fn create_expense_with_selections(
    client: &Client,
    draft: &ExpenseDraft,
) -> ClientResult<ExpenseBatch> {
    draft
        .validate()
        .map_err(|err| ClientError::Validation(err.to_string()))?;

    let expense = client.create_expense(&NewExpense::from(draft)).await?;

    let results = join_all(draft.selections.iter().map(|selection| {
        let new = NewTransaction::unpaid(
            &expense.id,
            &selection.employee_id,
            selection.amount,
            selection.note.clone(),
        );
        async move {
            let result = client.create_transaction(&new).await;
            (selection.employee_id.clone(), result)
        }
    }))
    .await;

    let mut transactions = Vec::new();
    let mut failed = Vec::new();
    for (employee_id, result) in results {
        match result {
            Ok(tx) => transactions.push(tx),
            Err(err) => failed.push((employee_id, err)),
        }
    }

    if !failed.is_empty() {
        warn!(
            expense_id = %expense.id,
            created = transactions.len(),
            failed = failed.len(),
            "Expense created with missing charges"
        );
    }
    Ok(ExpenseBatch {
        expense,
        transactions,
        failed,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{transaction::TransactionFilter, validation::Selection},
        entities::PaymentStatus,
        test_utils::{spawn_test_server, test_date, transaction_fixture},
    };
    use chrono::Utc;

    fn selection(employee_id: &str, amount: i64) -> Selection {
        Selection {
            employee_id: employee_id.to_string(),
            amount,
            note: None,
        }
    }

    fn draft(selections: Vec<Selection>) -> ExpenseDraft {
        ExpenseDraft {
            title: "Cơm văn phòng".to_string(),
            date: test_date(),
            notes: None,
            tags: vec![],
            selections,
        }
    }

    #[tokio::test]
    async fn test_invalid_draft_sends_nothing() {
        let (_state, client) = spawn_test_server().await;

        let result = create_expense_with_selections(
            &client,
            &draft(vec![selection("u1", 30_000), selection("u1", 10_000)]),
        )
        .await;
        assert!(matches!(result, Err(ClientError::Validation(_))));

        let result = create_expense_with_selections(&client, &draft(vec![])).await;
        assert!(matches!(result, Err(ClientError::Validation(_))));

        assert!(client.list_expenses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expense_with_selections_then_pay_all() {
        let (_state, client) = spawn_test_server().await;

        let batch = create_expense_with_selections(
            &client,
            &draft(vec![selection("u1", 30_000), selection("u2", 45_000)]),
        )
        .await
        .unwrap();
        assert!(batch.is_complete());
        assert_eq!(batch.transactions.len(), 2);
        assert!(
            batch
                .transactions
                .iter()
                .all(|tx| tx.status == PaymentStatus::Unpaid)
        );

        let all = client
            .filter_transactions(&TransactionFilter::for_expense(&batch.expense.id))
            .await
            .unwrap();
        let report = pay_all(&client, "u1", &all).await;
        assert!(report.is_complete());
        assert_eq!(report.succeeded.len(), 1);

        let again = client
            .filter_transactions(&TransactionFilter::default())
            .await
            .unwrap();
        assert!(pay_all(&client, "u1", &again).await.succeeded.is_empty());

        let summary = client.summary(None).await.unwrap();
        assert_eq!(summary.total_received, 30_000);
        assert_eq!(summary.total_debt, 45_000);
    }

    #[tokio::test]
    async fn test_pay_all_reports_partial_failure() {
        let (_state, client) = spawn_test_server().await;
        let batch = create_expense_with_selections(&client, &draft(vec![selection("u1", 20_000)]))
            .await
            .unwrap();

        let mut known = batch.transactions.clone();
        known.push(transaction_fixture(
            "gone",
            &batch.expense.id,
            "u1",
            15_000,
            0,
            Utc::now(),
        ));

        let report = pay_all(&client, "u1", &known).await;
        assert_eq!(report.succeeded, vec![batch.transactions[0].id.clone()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "gone");
        assert!(matches!(report.failed[0].1, ClientError::NotFound(_)));
    }
}
