//! Ledger reconciliation business logic.
//!
//! The incremental ledger in [`crate::core::donation`] keeps each program's
//! `collected_amount` in step with its paid donations. Reconciliation is the
//! safety net behind it: recompute the paid-donation sum for every program,
//! report any drift, and repair the stored total to the recomputed value.
//! Each run is recorded in the `system_state` table under
//! `last_reconcile_run`.

use crate::{
    entities::{Program, SystemState, program, system_state},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{Set, TransactionTrait, prelude::*};

const LAST_RECONCILE_RUN_KEY: &str = "last_reconcile_run";

/// Drift found (and repaired) on a single program.
#[derive(Debug, Clone)]
pub struct ProgramDrift {
    /// ID of the drifted program
    pub program_id: i64,
    /// Title of the drifted program
    pub title: String,
    /// `collected_amount` as stored before the repair
    pub stored_amount: Decimal,
    /// Sum of paid donations recomputed from the donations table
    pub computed_amount: Decimal,
}

impl ProgramDrift {
    /// Signed difference between the stored and recomputed totals.
    #[must_use]
    pub fn drift(&self) -> Decimal {
        self.stored_amount - self.computed_amount
    }
}

/// Result of one reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileResult {
    /// Number of programs checked
    pub programs_checked: usize,
    /// Programs whose stored total disagreed and were repaired
    pub drifted: Vec<ProgramDrift>,
    /// When the run happened
    pub run_at: DateTimeUtc,
}

impl ReconcileResult {
    /// Returns `true` when every checked program already matched its
    /// recomputed total.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.drifted.is_empty()
    }
}

/// Retrieves the timestamp of the last reconciliation run, if any.
pub async fn get_last_reconcile_run(db: &DatabaseConnection) -> Result<Option<DateTimeUtc>> {
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_RECONCILE_RUN_KEY))
        .one(db)
        .await?;

    match state {
        Some(s) => chrono::DateTime::parse_from_rfc3339(&s.value)
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(|e| Error::Config {
                message: format!("Failed to parse last reconcile timestamp: {e}"),
            }),
        None => Ok(None),
    }
}

/// Records the timestamp of a reconciliation run in `system_state`.
async fn set_last_reconcile_run<C>(db: &C, at: DateTimeUtc) -> Result<()>
where
    C: ConnectionTrait,
{
    let value = at.to_rfc3339();

    // Check if the key exists
    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_RECONCILE_RUN_KEY))
        .one(db)
        .await?;

    if let Some(state) = existing {
        // Update existing record
        let mut active_model: system_state::ActiveModel = state.into();
        active_model.value = Set(value);
        active_model.updated_at = Set(at);
        active_model.update(db).await?;
    } else {
        // Insert new record
        let new_state = system_state::ActiveModel {
            key: Set(LAST_RECONCILE_RUN_KEY.to_string()),
            value: Set(value),
            updated_at: Set(at),
            ..Default::default()
        };
        new_state.insert(db).await?;
    }

    Ok(())
}

/// Recomputes every program's paid-donation sum and repairs drifted totals.
/// This function:
///
/// 1. Loads all programs inside one transaction
/// 2. For each, recomputes `sum(amount)` over its paid donations
/// 3. Where the stored `collected_amount` disagrees, overwrites it with the
///    recomputed value and records the drift
/// 4. Stores the run timestamp in `system_state`
///
/// All repairs commit together or not at all.
pub async fn reconcile_collected_amounts(db: &DatabaseConnection) -> Result<ReconcileResult> {
    let txn = db.begin().await?;

    let now = Utc::now();
    let mut drifted = Vec::new();

    let programs = Program::find().all(&txn).await?;
    let programs_checked = programs.len();

    for prog in programs {
        let computed =
            crate::core::donation::sum_paid_amount_for_program(&txn, prog.id).await?;

        if prog.collected_amount != computed {
            drifted.push(ProgramDrift {
                program_id: prog.id,
                title: prog.title.clone(),
                stored_amount: prog.collected_amount,
                computed_amount: computed,
            });

            let mut active_model: program::ActiveModel = prog.into();
            active_model.collected_amount = Set(computed);
            active_model.updated_at = Set(now);
            active_model.update(&txn).await?;
        }
    }

    set_last_reconcile_run(&txn, now).await?;

    txn.commit().await?;

    Ok(ReconcileResult {
        programs_checked,
        drifted,
        run_at: now,
    })
}

/// Formats a reconciliation result into a human-readable summary string
/// for logging.
#[must_use]
pub fn format_reconcile_summary(result: &ReconcileResult) -> String {
    use std::fmt::Write;

    let mut summary = format!(
        "Reconciliation - checked {} programs, repaired {}\n",
        result.programs_checked,
        result.drifted.len()
    );

    for drift in &result.drifted {
        // write! is infallible when writing to String, so unwrap is safe
        writeln!(
            summary,
            "  #{} {} | stored {} -> computed {} (drift {})",
            drift.program_id,
            drift.title,
            drift.stored_amount,
            drift.computed_amount,
            drift.drift()
        )
        .unwrap();
    }

    summary
}
