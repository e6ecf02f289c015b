//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using
//! `SeaORM`. It provides functions for establishing database connections and
//! creating all necessary tables based on the entity definitions, using
//! `SeaORM`'s `Schema::create_table_from_entity` so the database schema
//! always matches the Rust struct definitions without manual SQL.

use crate::entities::{Donation, Program, SystemState};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from the `DATABASE_URL` environment variable,
/// falling back to a local `SQLite` file created on demand.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://dpf.sqlite?mode=rwc".to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables from the entity definitions.
///
/// Programs are created before donations because the donations table carries
/// a foreign key to programs. Statements use `IF NOT EXISTS` so startup can
/// run against an already-initialized database.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut program_table = schema.create_table_from_entity(Program);
    let mut donation_table = schema.create_table_from_entity(Donation);
    let mut system_state_table = schema.create_table_from_entity(SystemState);

    db.execute_raw(builder.build(program_table.if_not_exists())).await?;
    db.execute_raw(builder.build(donation_table.if_not_exists())).await?;
    db.execute_raw(builder.build(system_state_table.if_not_exists())).await?;

    Ok(())
}
