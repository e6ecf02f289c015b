//! Program business logic - Handles all program-related operations.
//!
//! Provides functions for creating, retrieving, updating, and deleting
//! fundraising programs, plus the atomic `collected_amount` adjustment that
//! the donation ledger operations build on. All functions are async and
//! return Result types for error handling.

use crate::{
    entities::{Donation, Program, donation, program, program::ProgramStatus},
    errors::{Error, Result, ValidationErrors},
};
use rust_decimal::Decimal;
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};

/// Derives a URL-safe slug from a program title.
///
/// Lowercases the title, keeps ASCII alphanumerics, and collapses every
/// other run of characters into a single hyphen. Leading and trailing
/// hyphens are stripped, so `"Clean Water for Sumba!"` becomes
/// `"clean-water-for-sumba"`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    slug.trim_end_matches('-').to_string()
}

/// Validates the writable program fields, returning a per-field error map.
fn validate_program_fields(
    title: &str,
    category: &str,
    target_amount: Option<Decimal>,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if title.trim().is_empty() {
        errors.add("title", "Title cannot be empty");
    }
    if category.trim().is_empty() {
        errors.add("category", "Category cannot be empty");
    }
    if let Some(target) = target_amount {
        if target < Decimal::ONE {
            errors.add("target_amount", "Target amount must be at least 1");
        }
    }

    errors
}

/// Checks that `slug` is not already taken by another program.
///
/// `exclude_id` skips the program being updated so it can keep its own slug.
async fn ensure_slug_available<C>(db: &C, slug: &str, exclude_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Program::find().filter(program::Column::Slug.eq(slug));
    if let Some(id) = exclude_id {
        query = query.filter(program::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(Error::Validation {
            errors: ValidationErrors::single("slug", "Slug is already in use"),
        });
    }

    Ok(())
}

/// Creates a new program, performing input validation first.
///
/// The slug is taken verbatim when supplied and derived from the title
/// otherwise; either way it must be unique. `collected_amount` always
/// starts at zero and is only ever changed by the ledger operations.
///
/// # Arguments
/// * `db` - Database connection
/// * `title` - Campaign title (required, non-empty)
/// * `slug` - Optional explicit slug; derived from the title when None
/// * `category` - Category label (required, non-empty)
/// * `description` - Optional longer description
/// * `target_amount` - Optional funding goal, at least 1 when given
/// * `status` - Initial publication state
/// * `is_highlighted` - Whether the program is featured
pub async fn create_program(
    db: &DatabaseConnection,
    title: String,
    slug: Option<String>,
    category: String,
    description: Option<String>,
    target_amount: Option<Decimal>,
    status: ProgramStatus,
    is_highlighted: bool,
) -> Result<program::Model> {
    validate_program_fields(&title, &category, target_amount).into_result()?;

    let slug = match slug {
        Some(s) => s,
        None => slugify(&title),
    };
    if slug.is_empty() {
        return Err(Error::Validation {
            errors: ValidationErrors::single("slug", "Slug cannot be empty"),
        });
    }
    ensure_slug_available(db, &slug, None).await?;

    let now = chrono::Utc::now();
    let model = program::ActiveModel {
        title: Set(title.trim().to_string()),
        slug: Set(slug),
        category: Set(category.trim().to_string()),
        description: Set(description),
        target_amount: Set(target_amount),
        collected_amount: Set(Decimal::ZERO),
        status: Set(status),
        is_highlighted: Set(is_highlighted),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    Ok(result)
}

/// Updates a program's editable fields.
///
/// Replaces title, category, description, target, status and highlight flag.
/// The slug only changes when one is explicitly supplied; `collected_amount`
/// is never writable through this path.
#[allow(clippy::too_many_arguments)]
pub async fn update_program(
    db: &DatabaseConnection,
    program_id: i64,
    title: String,
    slug: Option<String>,
    category: String,
    description: Option<String>,
    target_amount: Option<Decimal>,
    status: ProgramStatus,
    is_highlighted: bool,
) -> Result<program::Model> {
    validate_program_fields(&title, &category, target_amount).into_result()?;

    let existing = Program::find_by_id(program_id)
        .one(db)
        .await?
        .ok_or(Error::ProgramNotFound { id: program_id })?;

    let slug = match slug {
        Some(s) => {
            if s.is_empty() {
                return Err(Error::Validation {
                    errors: ValidationErrors::single("slug", "Slug cannot be empty"),
                });
            }
            ensure_slug_available(db, &s, Some(program_id)).await?;
            s
        }
        None => existing.slug.clone(),
    };

    let mut model: program::ActiveModel = existing.into();
    model.title = Set(title.trim().to_string());
    model.slug = Set(slug);
    model.category = Set(category.trim().to_string());
    model.description = Set(description);
    model.target_amount = Set(target_amount);
    model.status = Set(status);
    model.is_highlighted = Set(is_highlighted);
    model.updated_at = Set(chrono::Utc::now());

    let result = model.update(db).await?;
    Ok(result)
}

/// Finds a program by its unique ID.
pub async fn get_program_by_id(
    db: &DatabaseConnection,
    program_id: i64,
) -> Result<Option<program::Model>> {
    Program::find_by_id(program_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a program by its unique slug, used for public campaign page lookups.
pub async fn get_program_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<program::Model>> {
    Program::find()
        .filter(program::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves programs ordered newest first, optionally filtered by status
/// and highlight flag.
pub async fn list_programs(
    db: &DatabaseConnection,
    status: Option<ProgramStatus>,
    highlighted: Option<bool>,
) -> Result<Vec<program::Model>> {
    let mut query = Program::find();

    if let Some(status) = status {
        query = query.filter(program::Column::Status.eq(status));
    }
    if let Some(highlighted) = highlighted {
        query = query.filter(program::Column::IsHighlighted.eq(highlighted));
    }

    query
        .order_by_desc(program::Column::CreatedAt)
        .order_by_desc(program::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a program, refusing while any donation still references it.
///
/// The donations keep their history; an administrator must reassign or
/// delete them first. The guard and the delete share one transaction so a
/// donation created concurrently cannot slip between them.
pub async fn delete_program(db: &DatabaseConnection, program_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    Program::find_by_id(program_id)
        .one(&txn)
        .await?
        .ok_or(Error::ProgramNotFound { id: program_id })?;

    let referencing = Donation::find()
        .filter(donation::Column::ProgramId.eq(program_id))
        .count(&txn)
        .await?;
    if referencing > 0 {
        return Err(Error::ProgramInUse {
            id: program_id,
            donations: referencing,
        });
    }

    Program::delete_by_id(program_id).exec(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Adjusts a program's `collected_amount` by atomically adding a delta.
///
/// This is the single write path for the ledger column. Instead of reading
/// the current total, modifying it, and writing it back (which loses updates
/// under concurrency), this issues one SQL statement:
/// `UPDATE programs SET collected_amount = collected_amount + delta WHERE id = ?`
///
/// # Arguments
/// * `db` - Database connection or transaction
/// * `program_id` - ID of the program to adjust
/// * `delta` - Amount to add (negative to subtract)
///
/// # Returns
/// The updated program model
pub async fn adjust_collected_amount<C>(
    db: &C,
    program_id: i64,
    delta: Decimal,
) -> Result<program::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::{Expr, ExprTrait};

    // First verify the program exists
    let _program = Program::find_by_id(program_id)
        .one(db)
        .await?
        .ok_or(Error::ProgramNotFound { id: program_id })?;

    // Perform atomic update: collected_amount = collected_amount + delta
    Program::update_many()
        .col_expr(
            program::Column::CollectedAmount,
            Expr::col(program::Column::CollectedAmount).add(delta),
        )
        .filter(program::Column::Id.eq(program_id))
        .exec(db)
        .await?;

    // Return the updated program
    Program::find_by_id(program_id)
        .one(db)
        .await?
        .ok_or(Error::ProgramNotFound { id: program_id })
}
