//! Report generation business logic.
//!
//! This module provides the aggregate numbers behind the admin dashboard:
//! how much has been collected, how donations break down by status, and how
//! far a program is towards its funding target. All functions are
//! framework-agnostic and return structured data for the API layer to
//! serialize.

use crate::{
    entities::{Donation, donation, donation::DonationStatus},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::{PaginatorTrait, QuerySelect, prelude::*};

/// Aggregate donation numbers for the admin dashboard.
#[derive(Debug, Clone)]
pub struct DonationSummary {
    /// Sum of all paid donation amounts
    pub total_collected: Decimal,
    /// All donations, regardless of status
    pub total_donations: u64,
    /// Donations currently paid
    pub paid_count: u64,
    /// Donations awaiting payment
    pub pending_count: u64,
    /// Donations whose payment failed
    pub failed_count: u64,
    /// Donations whose payment window elapsed
    pub expired_count: u64,
    /// Donations that were cancelled
    pub cancelled_count: u64,
    /// Paid donations not earmarked for any program
    pub general_paid_count: u64,
}

/// Counts donations in one status.
async fn count_status(db: &DatabaseConnection, status: DonationStatus) -> Result<u64> {
    Donation::find()
        .filter(donation::Column::Status.eq(status))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Generates the aggregate donation summary.
///
/// `total_collected` is recomputed from the donations table here rather than
/// summed over program ledgers, so general donations (which belong to no
/// program) are included.
pub async fn generate_donation_summary(db: &DatabaseConnection) -> Result<DonationSummary> {
    let total_collected: Option<Option<Decimal>> = Donation::find()
        .select_only()
        .column_as(donation::Column::Amount.sum(), "total")
        .filter(donation::Column::Status.eq(DonationStatus::Paid))
        .into_tuple()
        .one(db)
        .await?;

    let total_donations = Donation::find().count(db).await?;

    let general_paid_count = Donation::find()
        .filter(donation::Column::Status.eq(DonationStatus::Paid))
        .filter(donation::Column::ProgramId.is_null())
        .count(db)
        .await?;

    Ok(DonationSummary {
        total_collected: total_collected.flatten().unwrap_or(Decimal::ZERO),
        total_donations,
        paid_count: count_status(db, DonationStatus::Paid).await?,
        pending_count: count_status(db, DonationStatus::Pending).await?,
        failed_count: count_status(db, DonationStatus::Failed).await?,
        expired_count: count_status(db, DonationStatus::Expired).await?,
        cancelled_count: count_status(db, DonationStatus::Cancelled).await?,
        general_paid_count,
    })
}

/// Calculates how far a program is towards its funding target, in percent.
///
/// Returns None for open-ended programs (no target) and for a zero target.
/// The result can exceed 100 when a program is overfunded.
#[must_use]
pub fn program_progress(collected: Decimal, target: Option<Decimal>) -> Option<Decimal> {
    let target = target?;
    if target.is_zero() {
        return None;
    }

    Some((collected / target) * Decimal::ONE_HUNDRED)
}
