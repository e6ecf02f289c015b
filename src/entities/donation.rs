//! Donation entity - Represents an individual donation and its payment lifecycle.
//!
//! Donations carry a unique human-readable `code`, an optional link to the
//! program they are earmarked for, and a payment `status`. Only donations in
//! [`DonationStatus::Paid`] count towards a program's `collected_amount`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment lifecycle state of a donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    /// Awaiting payment confirmation
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Payment confirmed; counted in the program ledger
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Payment attempt failed
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Payment window elapsed without confirmation
    #[sea_orm(string_value = "expired")]
    Expired,
    /// Cancelled by the donor or an administrator
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl DonationStatus {
    /// Returns `true` if donations in this status count towards program totals.
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(self, Self::Paid)
    }
}

/// How the donation entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum DonationSource {
    /// Recorded by an administrator, e.g. a bank transfer with proof attached
    #[sea_orm(string_value = "manual")]
    Manual,
    /// Created through a payment gateway checkout
    #[sea_orm(string_value = "gateway")]
    Gateway,
}

/// Donation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    /// Unique identifier for the donation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique human-readable reference, e.g. `DPF-20250131-0007`
    #[sea_orm(unique)]
    pub code: String,
    /// Program this donation is earmarked for; None means the general fund
    pub program_id: Option<i64>,
    /// Donor's name, if given
    pub donor_name: Option<String>,
    /// Donor's email address, if given
    pub donor_email: Option<String>,
    /// Donor's phone number, if given
    pub donor_phone: Option<String>,
    /// Donated amount; always at least 1
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub amount: Decimal,
    /// Whether the donor's identity is hidden in public listings
    pub is_anonymous: bool,
    /// How the donation entered the system
    pub source: DonationSource,
    /// Payment method, e.g. "bank_transfer" or "virtual_account"
    pub payment_method: Option<String>,
    /// Payment channel within the method, e.g. the bank name
    pub payment_channel: Option<String>,
    /// Payment lifecycle state
    pub status: DonationStatus,
    /// Order id assigned by the payment gateway
    pub gateway_order_id: Option<String>,
    /// Transaction id assigned by the payment gateway
    pub gateway_transaction_id: Option<String>,
    /// Path to an uploaded transfer proof for manual donations
    pub manual_proof_path: Option<String>,
    /// Free-form administrator notes
    pub notes: Option<String>,
    /// When the payment was confirmed; None while not paid
    pub paid_at: Option<DateTimeUtc>,
    /// When the donation was recorded
    pub created_at: DateTimeUtc,
    /// When the donation was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Donation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each donation may be earmarked for one program
    #[sea_orm(
        belongs_to = "super::program::Entity",
        from = "Column::ProgramId",
        to = "super::program::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Program,
}

impl Related<super::program::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Program.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
