//! Program seed configuration loading from config.toml
//!
//! This module provides functionality to load initial program definitions
//! from a TOML configuration file. The programs defined in config.toml are
//! used to seed the database on first run; existing programs (matched by
//! slug) are left untouched, so seeding is safe to repeat on every start.

use crate::{
    entities::program::ProgramStatus,
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// List of program definitions to seed
    pub programs: Vec<ProgramConfig>,
}

/// Configuration for a single program
#[derive(Debug, Deserialize, Clone)]
pub struct ProgramConfig {
    /// Campaign title
    pub title: String,
    /// Explicit slug; derived from the title when omitted
    pub slug: Option<String>,
    /// Category label (e.g., "education", "health")
    pub category: String,
    /// Longer description for the campaign page
    pub description: Option<String>,
    /// Funding goal; omit for open-ended campaigns
    pub target_amount: Option<Decimal>,
    /// Publication state; defaults to active
    pub status: Option<ProgramStatus>,
    /// Whether the program is featured on the landing page
    #[serde(default)]
    pub is_highlighted: bool,
}

/// Loads program configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads program configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}

/// Seeds the database with the configured programs, skipping any whose slug
/// already exists. Returns the number of programs created.
pub async fn seed_programs(db: &DatabaseConnection, config: &Config) -> Result<usize> {
    let mut created = 0;

    for entry in &config.programs {
        let slug = match &entry.slug {
            Some(slug) => slug.clone(),
            None => crate::core::program::slugify(&entry.title),
        };

        if crate::core::program::get_program_by_slug(db, &slug)
            .await?
            .is_some()
        {
            continue;
        }

        crate::core::program::create_program(
            db,
            entry.title.clone(),
            Some(slug),
            entry.category.clone(),
            entry.description.clone(),
            entry.target_amount,
            entry.status.unwrap_or(ProgramStatus::Active),
            entry.is_highlighted,
        )
        .await?;
        created += 1;
    }

    Ok(created)
}
