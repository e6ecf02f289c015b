//! Shared test utilities for the donation platform backend.
//!
//! This module provides common helper functions for setting up test
//! databases and creating test entities with sensible defaults.

use crate::{
    core::{
        donation::{self, ManualDonationInput, PendingDonationInput},
        program,
    },
    entities,
    entities::program::ProgramStatus,
    errors::Result,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test program with sensible defaults.
///
/// # Arguments
/// * `db` - Database connection
/// * `title` - Program title (the slug is derived from it)
///
/// # Defaults
/// * `category`: "health"
/// * `status`: active
/// * no target amount, not highlighted
pub async fn create_test_program(
    db: &DatabaseConnection,
    title: &str,
) -> Result<entities::program::Model> {
    program::create_program(
        db,
        title.to_string(),
        None,
        "health".to_string(),
        None,
        None,
        ProgramStatus::Active,
        false,
    )
    .await
}

/// Creates a test program with custom parameters.
/// Use this when you need to test specific program configurations.
pub async fn create_custom_program(
    db: &DatabaseConnection,
    title: &str,
    category: &str,
    status: ProgramStatus,
    is_highlighted: bool,
) -> Result<entities::program::Model> {
    program::create_program(
        db,
        title.to_string(),
        None,
        category.to_string(),
        None,
        None,
        status,
        is_highlighted,
    )
    .await
}

/// Builds a manual donation input with sensible defaults.
///
/// # Defaults
/// * `donor_name`: `"Test Donor"`, `donor_email`: `"test@example.org"`
/// * `amount`: 50000
/// * `payment_method`: "bank_transfer"
/// * not anonymous, no proof, no notes, `paid_at` auto
#[must_use]
pub fn test_manual_input(program_id: Option<i64>) -> ManualDonationInput {
    ManualDonationInput {
        program_id,
        donor_name: Some("Test Donor".to_string()),
        donor_email: Some("test@example.org".to_string()),
        donor_phone: None,
        amount: dec!(50000),
        is_anonymous: false,
        payment_method: Some("bank_transfer".to_string()),
        payment_channel: None,
        manual_proof_path: None,
        notes: None,
        paid_at: None,
    }
}

/// Creates a paid manual donation with a custom program link and amount.
pub async fn create_custom_manual_donation(
    db: &DatabaseConnection,
    program_id: Option<i64>,
    amount: Decimal,
) -> Result<(entities::donation::Model, Option<entities::program::Model>)> {
    donation::create_manual_donation(
        db,
        ManualDonationInput {
            amount,
            ..test_manual_input(program_id)
        },
    )
    .await
}

/// Creates a pending gateway donation with defaults.
pub async fn create_test_pending_donation(
    db: &DatabaseConnection,
    program_id: Option<i64>,
    amount: Decimal,
) -> Result<entities::donation::Model> {
    donation::create_pending_donation(
        db,
        PendingDonationInput {
            program_id,
            donor_name: None,
            donor_email: None,
            donor_phone: None,
            amount,
            is_anonymous: true,
            payment_method: Some("virtual_account".to_string()),
            payment_channel: None,
            gateway_order_id: None,
            notes: None,
        },
    )
    .await
}

/// Sets up a complete test environment with a program.
/// Returns (db, program) for common test scenarios.
pub async fn setup_with_program() -> Result<(DatabaseConnection, entities::program::Model)> {
    let db = setup_test_db().await?;
    let program = create_test_program(&db, "Test Program").await?;
    Ok((db, program))
}
