//! Unified error types and result handling.
//!
//! All fallible operations in the crate return [`Result`] with this [`Error`]
//! enum. Validation failures carry a per-field message map ([`ValidationErrors`])
//! so the API layer can return them in a structured body; everything else maps
//! onto a single human-readable message.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Per-field validation messages, keyed by the offending input field.
///
/// Fields are kept in a `BTreeMap` so serialized output (and error text) is
/// deterministic regardless of the order checks ran in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding a single field/message pair.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a message against a field. A field can accumulate several
    /// messages (e.g. "required" and "too short").
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// True when no messages have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts the collection into `Err(Error::Validation)` when any message
    /// was recorded, `Ok(())` otherwise. Lets validators end with
    /// `errors.into_result()?`.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { errors: self })
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Startup or configuration problem (bad env var, unreadable seed file).
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// User input failed one or more field-level checks.
    #[error("Validation failed: {errors}")]
    Validation {
        /// Field-to-messages map
        errors: ValidationErrors,
    },

    /// No program with the given id exists.
    #[error("Program {id} not found")]
    ProgramNotFound {
        /// Requested program id
        id: i64,
    },

    /// No donation with the given id exists.
    #[error("Donation {id} not found")]
    DonationNotFound {
        /// Requested donation id
        id: i64,
    },

    /// The program still has donations referencing it and cannot be deleted.
    #[error("Program {id} cannot be deleted: {donations} donation(s) still reference it")]
    ProgramInUse {
        /// Program id the delete targeted
        id: i64,
        /// How many donations reference it
        donations: u64,
    },

    /// Database-level failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure (listener binding, file access).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_validation_errors_accumulate_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("amount", "must be at least 1");
        errors.add("amount", "must be a number");
        errors.add("donor_name", "is required");

        assert!(!errors.is_empty());
        let rendered = errors.to_string();
        assert_eq!(
            rendered,
            "amount: must be at least 1; amount: must be a number; donor_name: is required"
        );
    }

    #[test]
    fn test_validation_errors_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let result = ValidationErrors::single("title", "is required").into_result();
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_validation_errors_serialize_as_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add("amount", "must be at least 1");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["amount"][0], "must be at least 1");
    }
}
