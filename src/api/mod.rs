//! HTTP API module - axum router, shared state, and error mapping

/// Donation endpoints
pub mod donations;
/// Program endpoints
pub mod programs;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, patch, post};
use axum::Router;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::errors::Error;

/// State shared by every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live database handle
    pub db: DatabaseConnection,
}

/// Builds the application router with all routes, permissive CORS, and
/// per-request tracing.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/programs",
            get(programs::list_programs).post(programs::create_program),
        )
        .route("/api/programs/reconcile", post(programs::reconcile_programs))
        .route(
            "/api/programs/:id",
            get(programs::get_program)
                .put(programs::update_program)
                .delete(programs::delete_program),
        )
        .route(
            "/api/donations",
            get(donations::list_donations).post(donations::create_manual_donation),
        )
        .route(
            "/api/donations/pending",
            post(donations::create_pending_donation),
        )
        .route("/api/donations/summary", get(donations::donation_summary))
        .route(
            "/api/donations/:id",
            get(donations::get_donation).delete(donations::delete_donation),
        )
        .route(
            "/api/donations/:id/status",
            patch(donations::update_donation_status),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Acknowledgement body returned by delete endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Liveness probe reporting the running crate version.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Error::Validation { errors } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({
                    "message": "Validation failed",
                    "errors": errors,
                }),
            ),
            Error::ProgramNotFound { .. } | Error::DonationNotFound { .. } => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "message": self.to_string() }),
            ),
            Error::ProgramInUse { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({ "message": self.to_string() }),
            ),
            Error::Config { .. } | Error::Database(_) | Error::Io(_) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "message": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
