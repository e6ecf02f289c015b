//! System state entity - Stores key-value pairs for system bookkeeping.
//! Used for operational markers like the timestamp of the last ledger
//! reconciliation run.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// System state database model - stores key-value bookkeeping pairs
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_state")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Bookkeeping key (e.g., `"last_reconcile_run"`)
    pub key: String,
    /// Bookkeeping value stored as string
    pub value: String,
    /// When this entry was last modified
    pub updated_at: DateTimeUtc,
}

/// `SystemState` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
