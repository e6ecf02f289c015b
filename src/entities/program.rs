//! Program entity - Represents a fundraising campaign donations can target.
//!
//! Each program has a title, unique slug, category, optional funding target and
//! a running `collected_amount` that mirrors the sum of its paid donations.
//! `collected_amount` is only ever touched by the ledger operations in
//! [`crate::core::program`]; nothing else may write it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publication state of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ProgramStatus {
    /// Being drafted, not yet visible to donors
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Open for donations
    #[sea_orm(string_value = "active")]
    Active,
    /// Funding goal reached or campaign closed
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Hidden from listings, kept for history
    #[sea_orm(string_value = "archived")]
    Archived,
}

/// Program database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "programs")]
pub struct Model {
    /// Unique identifier for the program
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable campaign title (e.g. "Clean Water for Sumba")
    pub title: String,
    /// URL-safe unique identifier derived from the title
    #[sea_orm(unique)]
    pub slug: String,
    /// Category label for grouping (e.g. "education", "health")
    pub category: String,
    /// Longer description shown on the campaign page
    pub description: Option<String>,
    /// Funding goal; None means open-ended
    #[sea_orm(column_type = "Decimal(Some((16, 2)))", nullable)]
    pub target_amount: Option<Decimal>,
    /// Running total of paid donations earmarked for this program
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub collected_amount: Decimal,
    /// Publication state
    pub status: ProgramStatus,
    /// Whether the program is featured on the landing page
    pub is_highlighted: bool,
    /// When the program was created
    pub created_at: DateTimeUtc,
    /// When the program was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Program and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One program has many donations
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
