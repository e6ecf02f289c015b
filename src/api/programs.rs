//! Program endpoints - CRUD, filtered listing, and ledger reconciliation

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AppState, MessageResponse};
use crate::core::{program, reconcile, report};
use crate::entities::{ProgramModel, ProgramStatus};
use crate::errors::{Error, Result};

/// Payload for creating a program.
#[derive(Debug, Deserialize)]
pub struct CreateProgramRequest {
    /// Program title shown to donors
    pub title: String,
    /// Explicit slug; derived from the title when omitted
    pub slug: Option<String>,
    /// Category label, e.g. "education"
    pub category: String,
    /// Longer description for the campaign page
    pub description: Option<String>,
    /// Fundraising target; None for open-ended programs
    pub target_amount: Option<Decimal>,
    /// Initial status; defaults to `draft`
    pub status: Option<ProgramStatus>,
    /// Feature the program on the landing page
    #[serde(default)]
    pub is_highlighted: bool,
}

/// Payload for replacing a program's editable fields.
#[derive(Debug, Deserialize)]
pub struct UpdateProgramRequest {
    /// New title
    pub title: String,
    /// New slug; the current slug is kept when omitted
    pub slug: Option<String>,
    /// New category label
    pub category: String,
    /// New description
    pub description: Option<String>,
    /// New fundraising target
    pub target_amount: Option<Decimal>,
    /// New status
    pub status: ProgramStatus,
    /// New highlight flag
    pub is_highlighted: bool,
}

/// Query-string filters for the program listing.
#[derive(Debug, Deserialize)]
pub struct ListProgramsQuery {
    /// Only programs in this status
    pub status: Option<ProgramStatus>,
    /// Only programs with this highlight flag
    pub highlighted: Option<bool>,
}

/// Program as returned by the API, with computed funding progress.
#[derive(Debug, Serialize)]
pub struct ProgramResponse {
    /// Database id
    pub id: i64,
    /// Program title
    pub title: String,
    /// URL-safe unique slug
    pub slug: String,
    /// Category label
    pub category: String,
    /// Campaign description
    pub description: Option<String>,
    /// Fundraising target, if any
    pub target_amount: Option<Decimal>,
    /// Total of paid donations credited to this program
    pub collected_amount: Decimal,
    /// Percent of the target collected; absent when no target is set
    pub progress_percent: Option<Decimal>,
    /// Lifecycle status
    pub status: ProgramStatus,
    /// Featured on the landing page
    pub is_highlighted: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl From<ProgramModel> for ProgramResponse {
    fn from(model: ProgramModel) -> Self {
        let progress_percent =
            report::program_progress(model.collected_amount, model.target_amount);

        Self {
            id: model.id,
            title: model.title,
            slug: model.slug,
            category: model.category,
            description: model.description,
            target_amount: model.target_amount,
            collected_amount: model.collected_amount,
            progress_percent,
            status: model.status,
            is_highlighted: model.is_highlighted,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Listing body with a count for quick client-side display.
#[derive(Debug, Serialize)]
pub struct ProgramListResponse {
    /// Number of programs returned
    pub count: usize,
    /// Programs, newest first
    pub programs: Vec<ProgramResponse>,
}

/// One repaired program in a reconciliation response.
#[derive(Debug, Serialize)]
pub struct DriftEntry {
    /// Program id
    pub program_id: i64,
    /// Program title
    pub title: String,
    /// Stored total before the repair
    pub stored_amount: Decimal,
    /// Recomputed total the program was repaired to
    pub computed_amount: Decimal,
    /// Signed stored-minus-computed difference
    pub drift: Decimal,
}

/// Body returned by the reconciliation endpoint.
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    /// Number of programs checked this run
    pub programs_checked: usize,
    /// Programs that disagreed with their recomputed totals
    pub repaired: Vec<DriftEntry>,
    /// When this run happened
    pub run_at: DateTime<Utc>,
    /// When the previous run happened, if any
    pub previous_run: Option<DateTime<Utc>>,
}

/// `GET /api/programs` - lists programs, optionally filtered by status and
/// highlight flag.
pub async fn list_programs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListProgramsQuery>,
) -> Result<Json<ProgramListResponse>> {
    let programs = program::list_programs(&state.db, query.status, query.highlighted).await?;
    let programs: Vec<ProgramResponse> = programs.into_iter().map(Into::into).collect();

    Ok(Json(ProgramListResponse {
        count: programs.len(),
        programs,
    }))
}

/// `POST /api/programs` - creates a program.
pub async fn create_program(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProgramRequest>,
) -> Result<(StatusCode, Json<ProgramResponse>)> {
    let created = program::create_program(
        &state.db,
        payload.title,
        payload.slug,
        payload.category,
        payload.description,
        payload.target_amount,
        payload.status.unwrap_or(ProgramStatus::Draft),
        payload.is_highlighted,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ProgramResponse::from(created))))
}

/// `GET /api/programs/:id` - fetches a single program.
pub async fn get_program(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ProgramResponse>> {
    let found = program::get_program_by_id(&state.db, id)
        .await?
        .ok_or(Error::ProgramNotFound { id })?;

    Ok(Json(ProgramResponse::from(found)))
}

/// `PUT /api/programs/:id` - replaces a program's editable fields. The
/// collected amount is never writable through this endpoint.
pub async fn update_program(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProgramRequest>,
) -> Result<Json<ProgramResponse>> {
    let updated = program::update_program(
        &state.db,
        id,
        payload.title,
        payload.slug,
        payload.category,
        payload.description,
        payload.target_amount,
        payload.status,
        payload.is_highlighted,
    )
    .await?;

    Ok(Json(ProgramResponse::from(updated)))
}

/// `DELETE /api/programs/:id` - deletes a program with no donations
/// referencing it.
pub async fn delete_program(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    program::delete_program(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: format!("Program {id} deleted"),
    }))
}

/// `POST /api/programs/reconcile` - recomputes every program's collected
/// amount from paid donations and repairs any rows that drifted.
pub async fn reconcile_programs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReconcileResponse>> {
    let previous_run = reconcile::get_last_reconcile_run(&state.db).await?;
    let result = reconcile::reconcile_collected_amounts(&state.db).await?;

    tracing::info!("{}", reconcile::format_reconcile_summary(&result));

    let repaired = result
        .drifted
        .iter()
        .map(|d| DriftEntry {
            program_id: d.program_id,
            title: d.title.clone(),
            stored_amount: d.stored_amount,
            computed_amount: d.computed_amount,
            drift: d.drift(),
        })
        .collect();

    Ok(Json(ReconcileResponse {
        programs_checked: result.programs_checked,
        repaired,
        run_at: result.run_at,
        previous_run,
    }))
}
