//! Donation business logic - Handles all donation-related operations.
//!
//! This module is the single write path for donations. Every operation that
//! creates, restates, or deletes a donation also applies the matching ledger
//! adjustment to the owning program's `collected_amount` inside the same
//! database transaction, so the program total and the set of paid donations
//! can never drift apart through this module. Validation always runs before
//! the first write. All functions are async and return Result types for
//! error handling.

use crate::{
    entities::{
        Donation, Program, donation,
        donation::{DonationSource, DonationStatus},
        program,
    },
    errors::{Error, Result, ValidationErrors},
};
use rust_decimal::Decimal;
use sea_orm::{
    Condition, PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
};

/// Fixed prefix of every donation code.
const CODE_PREFIX: &str = "DPF";

/// Input for recording a donation an administrator entered by hand,
/// e.g. a bank transfer confirmed outside any payment gateway.
#[derive(Debug, Clone)]
pub struct ManualDonationInput {
    /// Program to credit; None records a general donation
    pub program_id: Option<i64>,
    /// Donor's name (required for manual entries)
    pub donor_name: Option<String>,
    /// Donor's email address
    pub donor_email: Option<String>,
    /// Donor's phone number
    pub donor_phone: Option<String>,
    /// Donated amount, at least 1
    pub amount: Decimal,
    /// Hide the donor in public listings
    pub is_anonymous: bool,
    /// Payment method, e.g. "bank_transfer"
    pub payment_method: Option<String>,
    /// Payment channel within the method, e.g. the bank name
    pub payment_channel: Option<String>,
    /// Reference to an uploaded transfer proof
    pub manual_proof_path: Option<String>,
    /// Free-form administrator notes
    pub notes: Option<String>,
    /// Confirmation time; defaults to now when omitted
    pub paid_at: Option<DateTimeUtc>,
}

/// Input for opening a gateway-originated donation that has not been paid
/// yet. The later payment callback drives [`update_donation_status`].
#[derive(Debug, Clone)]
pub struct PendingDonationInput {
    /// Program to credit once paid; None records a general donation
    pub program_id: Option<i64>,
    /// Donor's name (optional, web donors may stay anonymous)
    pub donor_name: Option<String>,
    /// Donor's email address
    pub donor_email: Option<String>,
    /// Donor's phone number
    pub donor_phone: Option<String>,
    /// Donated amount, at least 1
    pub amount: Decimal,
    /// Hide the donor in public listings
    pub is_anonymous: bool,
    /// Payment method chosen at checkout
    pub payment_method: Option<String>,
    /// Payment channel within the method
    pub payment_channel: Option<String>,
    /// Order id assigned by the payment gateway
    pub gateway_order_id: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Filters and paging for the admin donation listing.
#[derive(Debug, Clone, Default)]
pub struct DonationListFilter {
    /// Only donations in this status
    pub status: Option<DonationStatus>,
    /// Only donations from this source
    pub source: Option<DonationSource>,
    /// Only donations for this program
    pub program_id: Option<i64>,
    /// Substring match over code, donor name, and donor email
    pub search: Option<String>,
    /// 1-based page number; defaults to 1
    pub page: Option<u64>,
    /// Page size; defaults to 20, capped at 100
    pub per_page: Option<u64>,
}

/// One page of donations plus paging metadata.
#[derive(Debug, Clone)]
pub struct DonationPage {
    /// Donations on this page, newest first
    pub items: Vec<donation::Model>,
    /// Total matching donations across all pages
    pub total: u64,
    /// 1-based page number
    pub page: u64,
    /// Page size used
    pub per_page: u64,
    /// Total number of pages
    pub total_pages: u64,
}

const DEFAULT_PER_PAGE: u64 = 20;
const MAX_PER_PAGE: u64 = 100;

/// Validates the donor and amount fields shared by both creation paths.
fn validate_donation_fields(
    amount: Decimal,
    donor_email: Option<&str>,
    donor_name: Option<&str>,
    require_donor_name: bool,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if amount < Decimal::ONE {
        errors.add("amount", "Amount must be at least 1");
    }
    if require_donor_name && donor_name.is_none_or(|name| name.trim().is_empty()) {
        errors.add("donor_name", "Donor name is required");
    }
    if let Some(email) = donor_email {
        if !email.trim().is_empty() && !email.contains('@') {
            errors.add("donor_email", "Donor email must be a valid email address");
        }
    }

    errors
}

/// Generates the next donation code for today, `DPF-YYYYMMDD-NNNN`.
///
/// Looks up the highest existing code with today's (UTC) date prefix and
/// increments its 4-digit sequence, starting from 0001 when today has no
/// donations yet. Must run inside the same transaction as the insert that
/// uses the code; the unique column turns the remaining concurrent-insert
/// race into a constraint error instead of a duplicate code.
pub async fn next_donation_code<C>(db: &C) -> Result<String>
where
    C: ConnectionTrait,
{
    let prefix = format!("{CODE_PREFIX}-{}-", chrono::Utc::now().format("%Y%m%d"));

    let latest = Donation::find()
        .filter(donation::Column::Code.starts_with(prefix.as_str()))
        .order_by_desc(donation::Column::Code)
        .one(db)
        .await?;

    let sequence = match latest {
        Some(donation) => {
            let tail = donation.code.rsplit('-').next().unwrap_or_default();
            let last: u32 = tail.parse().map_err(|_| Error::Config {
                message: format!("Malformed donation code in database: {}", donation.code),
            })?;
            last + 1
        }
        None => 1,
    };

    Ok(format!("{prefix}{sequence:04}"))
}

/// Records a manually-entered donation as already paid and credits the
/// referenced program, all in one transaction.
///
/// Validates before writing: amount at least 1, donor name present, and the
/// referenced program (if any) must exist. The generated code, the insert,
/// and the atomic ledger credit share the transaction.
///
/// # Returns
/// The created donation and the credited program (None for general donations).
pub async fn create_manual_donation(
    db: &DatabaseConnection,
    input: ManualDonationInput,
) -> Result<(donation::Model, Option<program::Model>)> {
    validate_donation_fields(
        input.amount,
        input.donor_email.as_deref(),
        input.donor_name.as_deref(),
        true,
    )
    .into_result()?;

    let txn = db.begin().await?;

    if let Some(program_id) = input.program_id {
        ensure_program_exists(&txn, program_id).await?;
    }

    let code = next_donation_code(&txn).await?;
    let now = chrono::Utc::now();
    let paid_at = input.paid_at.unwrap_or(now);

    let model = donation::ActiveModel {
        code: Set(code),
        program_id: Set(input.program_id),
        donor_name: Set(input.donor_name),
        donor_email: Set(input.donor_email),
        donor_phone: Set(input.donor_phone),
        amount: Set(input.amount),
        is_anonymous: Set(input.is_anonymous),
        source: Set(DonationSource::Manual),
        payment_method: Set(input.payment_method),
        payment_channel: Set(input.payment_channel),
        status: Set(DonationStatus::Paid),
        manual_proof_path: Set(input.manual_proof_path),
        notes: Set(input.notes),
        paid_at: Set(Some(paid_at)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(&txn).await?;

    // Atomically credit the program this donation is earmarked for
    let credited = match created.program_id {
        Some(program_id) => Some(
            crate::core::program::adjust_collected_amount(&txn, program_id, created.amount)
                .await?,
        ),
        None => None,
    };

    txn.commit().await?;

    Ok((created, credited))
}

/// Opens a pending gateway donation. No ledger effect until the payment
/// callback moves it to paid via [`update_donation_status`].
pub async fn create_pending_donation(
    db: &DatabaseConnection,
    input: PendingDonationInput,
) -> Result<donation::Model> {
    validate_donation_fields(
        input.amount,
        input.donor_email.as_deref(),
        input.donor_name.as_deref(),
        false,
    )
    .into_result()?;

    let txn = db.begin().await?;

    if let Some(program_id) = input.program_id {
        ensure_program_exists(&txn, program_id).await?;
    }

    let code = next_donation_code(&txn).await?;
    let now = chrono::Utc::now();

    let model = donation::ActiveModel {
        code: Set(code),
        program_id: Set(input.program_id),
        donor_name: Set(input.donor_name),
        donor_email: Set(input.donor_email),
        donor_phone: Set(input.donor_phone),
        amount: Set(input.amount),
        is_anonymous: Set(input.is_anonymous),
        source: Set(DonationSource::Gateway),
        payment_method: Set(input.payment_method),
        payment_channel: Set(input.payment_channel),
        status: Set(DonationStatus::Pending),
        gateway_order_id: Set(input.gateway_order_id),
        notes: Set(input.notes),
        paid_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(&txn).await?;
    txn.commit().await?;

    Ok(created)
}

/// Moves a donation to a new status and applies the matching ledger
/// adjustment to its program, all in one transaction.
///
/// The ledger effect is decided solely by the
/// [`transition`](crate::core::ledger::transition_delta) of the previous and
/// next status: entering paid credits the program, leaving paid debits it,
/// anything else leaves the ledger alone. When the donation enters paid and
/// no `paid_at` is supplied, the current time is recorded. A missing program
/// row does not fail the status change; the ledger step is skipped with a
/// warning.
///
/// # Arguments
/// * `db` - Database connection
/// * `donation_id` - Donation to restate
/// * `next_status` - Status to move to
/// * `paid_at` - Optional explicit confirmation time (paid only)
/// * `notes` - Optional replacement notes
///
/// # Returns
/// The updated donation and its program as of after the adjustment
/// (None when the donation is general or the program row is missing).
pub async fn update_donation_status(
    db: &DatabaseConnection,
    donation_id: i64,
    next_status: DonationStatus,
    paid_at: Option<DateTimeUtc>,
    notes: Option<String>,
) -> Result<(donation::Model, Option<program::Model>)> {
    let txn = db.begin().await?;

    let existing = Donation::find_by_id(donation_id)
        .one(&txn)
        .await?
        .ok_or(Error::DonationNotFound { id: donation_id })?;

    let previous_status = existing.status;
    let program_id = existing.program_id;
    let amount = existing.amount;

    let mut model: donation::ActiveModel = existing.into();
    model.status = Set(next_status);
    if next_status.is_paid() {
        if let Some(explicit) = paid_at {
            model.paid_at = Set(Some(explicit));
        } else if !previous_status.is_paid() {
            model.paid_at = Set(Some(chrono::Utc::now()));
        }
        // paid_at of a donation staying paid is kept as-is
    }
    if let Some(notes) = notes {
        model.notes = Set(Some(notes));
    }
    model.updated_at = Set(chrono::Utc::now());

    let updated = model.update(&txn).await?;

    let program = match program_id {
        Some(program_id) => {
            apply_transition(&txn, program_id, previous_status, next_status, amount).await?
        }
        None => None,
    };

    txn.commit().await?;

    Ok((updated, program))
}

/// Deletes a donation, debiting its program first when the donation was
/// paid. Both writes share one transaction.
pub async fn delete_donation(db: &DatabaseConnection, donation_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Donation::find_by_id(donation_id)
        .one(&txn)
        .await?
        .ok_or(Error::DonationNotFound { id: donation_id })?;

    let was_paid = existing.status.is_paid();
    let program_id = existing.program_id;
    let amount = existing.amount;

    existing.delete(&txn).await?;

    if was_paid {
        if let Some(program_id) = program_id {
            // Deleting a paid donation reverses its credit
            apply_transition(
                &txn,
                program_id,
                DonationStatus::Paid,
                DonationStatus::Cancelled,
                amount,
            )
            .await?;
        }
    }

    txn.commit().await?;
    Ok(())
}

/// Applies the ledger adjustment for a status transition to one program.
///
/// Returns the program as of after the adjustment. A missing program row is
/// tolerated: the adjustment is skipped with a warning and None is returned,
/// so the caller's donation write still commits.
async fn apply_transition<C>(
    db: &C,
    program_id: i64,
    previous: DonationStatus,
    next: DonationStatus,
    amount: Decimal,
) -> Result<Option<program::Model>>
where
    C: ConnectionTrait,
{
    let Some(current) = Program::find_by_id(program_id).one(db).await? else {
        tracing::warn!(program_id, "skipping ledger adjustment for missing program");
        return Ok(None);
    };

    match crate::core::ledger::ledger_adjustment(previous, next, amount) {
        Some(delta) => {
            let adjusted =
                crate::core::program::adjust_collected_amount(db, program_id, delta).await?;
            Ok(Some(adjusted))
        }
        None => Ok(Some(current)),
    }
}

/// Returns a validation error unless `program_id` references a real program.
async fn ensure_program_exists<C>(db: &C, program_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    if Program::find_by_id(program_id).one(db).await?.is_none() {
        return Err(Error::Validation {
            errors: ValidationErrors::single("program_id", "Referenced program does not exist"),
        });
    }
    Ok(())
}

/// Finds a donation by its unique ID.
pub async fn get_donation_by_id(
    db: &DatabaseConnection,
    donation_id: i64,
) -> Result<Option<donation::Model>> {
    Donation::find_by_id(donation_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a donation by its unique code, used for receipt lookups.
pub async fn get_donation_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<donation::Model>> {
    Donation::find()
        .filter(donation::Column::Code.eq(code))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves one page of donations, newest first, applying the filters in
/// [`DonationListFilter`].
pub async fn list_donations(
    db: &DatabaseConnection,
    filter: DonationListFilter,
) -> Result<DonationPage> {
    let page = filter.page.unwrap_or(1).max(1);
    let per_page = filter
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    let mut query = Donation::find();

    if let Some(status) = filter.status {
        query = query.filter(donation::Column::Status.eq(status));
    }
    if let Some(source) = filter.source {
        query = query.filter(donation::Column::Source.eq(source));
    }
    if let Some(program_id) = filter.program_id {
        query = query.filter(donation::Column::ProgramId.eq(program_id));
    }
    if let Some(search) = filter.search.as_deref() {
        let search = search.trim();
        if !search.is_empty() {
            query = query.filter(
                Condition::any()
                    .add(donation::Column::Code.contains(search))
                    .add(donation::Column::DonorName.contains(search))
                    .add(donation::Column::DonorEmail.contains(search)),
            );
        }
    }

    let paginator = query
        .order_by_desc(donation::Column::CreatedAt)
        .order_by_desc(donation::Column::Id)
        .paginate(db, per_page);

    let total = paginator.num_items().await?;
    let total_pages = total.div_ceil(per_page).max(1);
    let items = paginator.fetch_page(page - 1).await?;

    Ok(DonationPage {
        items,
        total,
        page,
        per_page,
        total_pages,
    })
}

/// Sums the paid donation amounts earmarked for one program.
///
/// This is the reference value for the program's `collected_amount`;
/// reconciliation compares and repairs against it.
pub async fn sum_paid_amount_for_program<C>(db: &C, program_id: i64) -> Result<Decimal>
where
    C: ConnectionTrait,
{
    let total: Option<Option<Decimal>> = Donation::find()
        .select_only()
        .column_as(donation::Column::Amount.sum(), "total")
        .filter(donation::Column::ProgramId.eq(program_id))
        .filter(donation::Column::Status.eq(DonationStatus::Paid))
        .into_tuple()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}
