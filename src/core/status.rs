//! Payment status rules.
//!
//! A stored transaction status must agree with its amounts, and an aggregate status
//! (per employee, per expense) is always derived from summed amounts rather than from
//! the stored statuses of the rows that were summed.

use crate::{
    entities::PaymentStatus,
    errors::{Error, Result},
};

/// Derives a status from an owed total and the amount received against it.
///
/// - nothing (or less than nothing) received → `Unpaid`
/// - something received but less than the total → `Partial`
/// - the total or more received → `Paid`
#[must_use]
pub const fn derive_status(total: i64, received: i64) -> PaymentStatus {
    if received <= 0 {
        PaymentStatus::Unpaid
    } else if received < total {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Paid
    }
}

/// Checks that a stored `status` is consistent with `amount` and `received`.
///
/// # Errors
/// Returns `Error::InvalidAmount` for negative amounts and
/// `Error::InconsistentStatus` when the status disagrees with the amounts.
pub fn check_consistency(amount: i64, received: i64, status: PaymentStatus) -> Result<()> {
    if amount < 0 {
        return Err(Error::InvalidAmount { amount });
    }
    if received < 0 {
        return Err(Error::InvalidAmount { amount: received });
    }

    let consistent = match status {
        PaymentStatus::Paid => received == amount,
        PaymentStatus::Unpaid => received == 0,
        PaymentStatus::Partial => received > 0 && received < amount,
    };

    if consistent {
        Ok(())
    } else {
        Err(Error::InconsistentStatus {
            status,
            amount,
            received,
        })
    }
}

/// Resolves the `(received, status)` pair a write should persist.
///
/// When only a status is given the received amount follows from it (`paid` takes the
/// full amount, `unpaid` resets to zero, `partial` keeps `current_received`). When only
/// a received amount is given the status is derived. When both are given they are
/// checked against each other.
///
/// # Errors
/// Returns an error when the resulting pair violates [`check_consistency`].
pub fn resolve_payment(
    amount: i64,
    current_received: i64,
    received: Option<i64>,
    status: Option<PaymentStatus>,
) -> Result<(i64, PaymentStatus)> {
    let (received, status) = match (received, status) {
        (Some(received), Some(status)) => (received, status),
        (Some(received), None) => (received, derive_status(amount, received)),
        (None, Some(PaymentStatus::Paid)) => (amount, PaymentStatus::Paid),
        (None, Some(PaymentStatus::Unpaid)) => (0, PaymentStatus::Unpaid),
        (None, Some(PaymentStatus::Partial)) => (current_received, PaymentStatus::Partial),
        (None, None) => (current_received, derive_status(amount, current_received)),
    };

    check_consistency(amount, received, status)?;
    Ok((received, status))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_derive_status_boundaries() {
        assert_eq!(derive_status(600, 0), PaymentStatus::Unpaid);
        assert_eq!(derive_status(600, 300), PaymentStatus::Partial);
        assert_eq!(derive_status(600, 600), PaymentStatus::Paid);
        assert_eq!(derive_status(600, 700), PaymentStatus::Paid);
        assert_eq!(derive_status(0, 0), PaymentStatus::Unpaid);
    }

    #[test]
    fn test_check_consistency_accepts_valid_rows() {
        assert!(check_consistency(100, 100, PaymentStatus::Paid).is_ok());
        assert!(check_consistency(100, 0, PaymentStatus::Unpaid).is_ok());
        assert!(check_consistency(100, 40, PaymentStatus::Partial).is_ok());
        assert!(check_consistency(0, 0, PaymentStatus::Paid).is_ok());
    }

    #[test]
    fn test_check_consistency_rejects_mismatches() {
        assert!(matches!(
            check_consistency(100, 50, PaymentStatus::Paid),
            Err(Error::InconsistentStatus { .. })
        ));
        assert!(matches!(
            check_consistency(100, 10, PaymentStatus::Unpaid),
            Err(Error::InconsistentStatus { .. })
        ));
        assert!(matches!(
            check_consistency(100, 100, PaymentStatus::Partial),
            Err(Error::InconsistentStatus { .. })
        ));
        assert!(matches!(
            check_consistency(-5, 0, PaymentStatus::Unpaid),
            Err(Error::InvalidAmount { amount: -5 })
        ));
    }

    #[test]
    fn test_resolve_payment_from_status_only() {
        assert_eq!(
            resolve_payment(300, 0, None, Some(PaymentStatus::Paid)).unwrap(),
            (300, PaymentStatus::Paid)
        );
        assert_eq!(
            resolve_payment(300, 300, None, Some(PaymentStatus::Unpaid)).unwrap(),
            (0, PaymentStatus::Unpaid)
        );
    }

    #[test]
    fn test_resolve_payment_derives_status_from_received() {
        assert_eq!(
            resolve_payment(300, 0, Some(120), None).unwrap(),
            (120, PaymentStatus::Partial)
        );
    }

    #[test]
    fn test_resolve_payment_rederives_after_amount_change() {
        // Amount raised from 100 to 300 on a row that had 100 received.
        assert_eq!(
            resolve_payment(300, 100, None, None).unwrap(),
            (100, PaymentStatus::Partial)
        );
    }

    #[test]
    fn test_resolve_payment_partial_without_received_fails() {
        assert!(resolve_payment(300, 0, None, Some(PaymentStatus::Partial)).is_err());
    }
}
