//! Payment intents: what has to change for an employee's charges to be settled.
//!
//! These functions only compute patches. The store applies them in one database
//! transaction (`core::transaction::apply_pay_all`) while the client applies them as
//! independent requests (`client::batch::pay_all`).

use crate::{
    core::transaction::TransactionPatch,
    entities::{PaymentStatus, TransactionModel},
};

/// One pending update produced by [`pay_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Transaction to update
    pub transaction_id: String,
    /// Target state
    pub patch: TransactionPatch,
}

/// Patch that marks `transaction` fully paid.
#[must_use]
pub fn settle(transaction: &TransactionModel) -> TransactionPatch {
    TransactionPatch {
        received_amount: Some(transaction.amount),
        status: Some(PaymentStatus::Paid),
        ..TransactionPatch::default()
    }
}

/// Settles every charge of `employee_id` whose status is not `paid`.
///
/// Charges of other employees are ignored, and an employee with nothing outstanding
/// yields no intents.
#[must_use]
pub fn pay_all(employee_id: &str, transactions: &[TransactionModel]) -> Vec<PaymentIntent> {
    transactions
        .iter()
        .filter(|tx| tx.employee_id == employee_id && tx.status != PaymentStatus::Paid)
        .map(|tx| PaymentIntent {
            transaction_id: tx.id.clone(),
            patch: settle(tx),
        })
        .collect()
}

/// The paid checkbox on the expense form: paid rows go back to unpaid with nothing
/// received, anything else becomes fully paid.
#[must_use]
pub fn toggle_paid(transaction: &TransactionModel) -> TransactionPatch {
    if transaction.status == PaymentStatus::Paid {
        TransactionPatch {
            received_amount: Some(0),
            status: Some(PaymentStatus::Unpaid),
            ..TransactionPatch::default()
        }
    } else {
        settle(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::transaction_fixture;
    use chrono::Utc;

    fn apply(transactions: &mut [TransactionModel], intents: &[PaymentIntent]) {
        for intent in intents {
            if let Some(tx) = transactions.iter_mut().find(|tx| tx.id == intent.transaction_id) {
                if let Some(received) = intent.patch.received_amount {
                    tx.received_amount = received;
                }
                if let Some(status) = intent.patch.status {
                    tx.status = status;
                }
            }
        }
    }

    fn ledger() -> Vec<TransactionModel> {
        let now = Utc::now();
        vec![
            transaction_fixture("t1", "e1", "u1", 100, 100, now),
            transaction_fixture("t2", "e2", "u1", 200, 50, now),
            transaction_fixture("t3", "e3", "u1", 300, 0, now),
            transaction_fixture("t4", "e1", "u2", 400, 0, now),
        ]
    }

    #[test]
    fn test_pay_all_targets_outstanding_rows_of_one_employee() {
        let intents = pay_all("u1", &ledger());
        let ids: Vec<&str> = intents.iter().map(|i| i.transaction_id.as_str()).collect();
        assert_eq!(ids, ["t2", "t3"]);
        assert_eq!(intents[1].patch.received_amount, Some(300));
        assert_eq!(intents[1].patch.status, Some(PaymentStatus::Paid));
    }

    #[test]
    fn test_pay_all_is_idempotent() {
        let mut txs = ledger();
        let intents = pay_all("u1", &txs);
        apply(&mut txs, &intents);
        assert!(pay_all("u1", &txs).is_empty());
    }

    #[test]
    fn test_pay_all_for_settled_or_unknown_employee_is_empty() {
        let txs = vec![transaction_fixture("t1", "e1", "u1", 100, 100, Utc::now())];
        assert!(pay_all("u1", &txs).is_empty());
        assert!(pay_all("nobody", &txs).is_empty());
    }

    #[test]
    fn test_toggle_paid() {
        let now = Utc::now();
        let paid = transaction_fixture("t1", "e1", "u1", 100, 100, now);
        let patch = toggle_paid(&paid);
        assert_eq!(patch.status, Some(PaymentStatus::Unpaid));
        assert_eq!(patch.received_amount, Some(0));

        let partial = transaction_fixture("t2", "e1", "u2", 100, 40, now);
        let patch = toggle_paid(&partial);
        assert_eq!(patch.status, Some(PaymentStatus::Paid));
        assert_eq!(patch.received_amount, Some(100));
    }
}
