//! Ledger transition rules.
//!
//! This module decides how a donation status change affects the owning
//! program's `collected_amount`. The decision is a pure function of the
//! (previous, next) status pair so that every write path (manual entry,
//! gateway callbacks, admin edits, deletes) applies identical rules.
//! Only the paid status counts towards a program's total; everything else
//! (pending, failed, expired, cancelled) is equally "not paid".

use crate::entities::DonationStatus;
use rust_decimal::Decimal;

/// Effect of a status transition on the owning program's ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerDelta {
    /// The donation entered paid status; add its amount to the program
    Credit,
    /// The donation left paid status; subtract its amount from the program
    Debit,
    /// No ledger effect (both sides paid, or neither side paid)
    Unchanged,
}

/// Determines the ledger effect of moving a donation from `previous` to
/// `next` status.
///
/// The rule only looks at whether each side counts as paid:
/// not-paid -> paid credits, paid -> not-paid debits, anything else
/// leaves the ledger alone. Transitions between two non-paid statuses
/// (e.g. pending -> expired) and self-transitions are always neutral.
#[must_use]
pub const fn transition_delta(previous: DonationStatus, next: DonationStatus) -> LedgerDelta {
    match (previous.is_paid(), next.is_paid()) {
        (false, true) => LedgerDelta::Credit,
        (true, false) => LedgerDelta::Debit,
        _ => LedgerDelta::Unchanged,
    }
}

/// Converts a status transition into a signed amount to apply to the
/// program's `collected_amount`, or `None` when the ledger is unaffected.
///
/// # Arguments
/// * `previous` - Status the donation is moving from
/// * `next` - Status the donation is moving to
/// * `amount` - The donation's amount (always positive)
#[must_use]
pub fn ledger_adjustment(
    previous: DonationStatus,
    next: DonationStatus,
    amount: Decimal,
) -> Option<Decimal> {
    match transition_delta(previous, next) {
        LedgerDelta::Credit => Some(amount),
        LedgerDelta::Debit => Some(-amount),
        LedgerDelta::Unchanged => None,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_transition_into_paid_credits() {
        assert_eq!(
            transition_delta(DonationStatus::Pending, DonationStatus::Paid),
            LedgerDelta::Credit
        );
        assert_eq!(
            transition_delta(DonationStatus::Failed, DonationStatus::Paid),
            LedgerDelta::Credit
        );
        assert_eq!(
            transition_delta(DonationStatus::Expired, DonationStatus::Paid),
            LedgerDelta::Credit
        );
        assert_eq!(
            transition_delta(DonationStatus::Cancelled, DonationStatus::Paid),
            LedgerDelta::Credit
        );
    }

    #[test]
    fn test_transition_out_of_paid_debits() {
        assert_eq!(
            transition_delta(DonationStatus::Paid, DonationStatus::Pending),
            LedgerDelta::Debit
        );
        assert_eq!(
            transition_delta(DonationStatus::Paid, DonationStatus::Cancelled),
            LedgerDelta::Debit
        );
        assert_eq!(
            transition_delta(DonationStatus::Paid, DonationStatus::Expired),
            LedgerDelta::Debit
        );
    }

    #[test]
    fn test_paid_to_paid_is_neutral() {
        assert_eq!(
            transition_delta(DonationStatus::Paid, DonationStatus::Paid),
            LedgerDelta::Unchanged
        );
    }

    #[test]
    fn test_transitions_between_non_paid_statuses_are_neutral() {
        assert_eq!(
            transition_delta(DonationStatus::Pending, DonationStatus::Expired),
            LedgerDelta::Unchanged
        );
        assert_eq!(
            transition_delta(DonationStatus::Pending, DonationStatus::Cancelled),
            LedgerDelta::Unchanged
        );
        assert_eq!(
            transition_delta(DonationStatus::Failed, DonationStatus::Expired),
            LedgerDelta::Unchanged
        );
        assert_eq!(
            transition_delta(DonationStatus::Cancelled, DonationStatus::Pending),
            LedgerDelta::Unchanged
        );
    }

    #[test]
    fn test_delta_grid_is_symmetric_around_paid() {
        // Over the full 5x5 grid: 4 credits (into paid), 4 debits (out of
        // paid), and 17 neutral pairs. Credits and debits must balance so
        // that any round trip leaves the ledger where it started.
        let mut credits = 0;
        let mut debits = 0;
        let mut unchanged = 0;

        for previous in DonationStatus::iter() {
            for next in DonationStatus::iter() {
                match transition_delta(previous, next) {
                    LedgerDelta::Credit => credits += 1,
                    LedgerDelta::Debit => debits += 1,
                    LedgerDelta::Unchanged => unchanged += 1,
                }
            }
        }

        assert_eq!(credits, 4);
        assert_eq!(debits, 4);
        assert_eq!(unchanged, 17);
    }

    #[test]
    fn test_ledger_adjustment_signs() {
        let amount = Decimal::new(50_000, 0);

        assert_eq!(
            ledger_adjustment(DonationStatus::Pending, DonationStatus::Paid, amount),
            Some(amount)
        );
        assert_eq!(
            ledger_adjustment(DonationStatus::Paid, DonationStatus::Failed, amount),
            Some(-amount)
        );
        assert_eq!(
            ledger_adjustment(DonationStatus::Pending, DonationStatus::Failed, amount),
            None
        );
        assert_eq!(
            ledger_adjustment(DonationStatus::Paid, DonationStatus::Paid, amount),
            None
        );
    }
}
