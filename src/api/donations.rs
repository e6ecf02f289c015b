//! Donation endpoints - manual entry, gateway flow, status changes, and
//! the aggregate summary

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AppState, MessageResponse};
use crate::core::donation::{
    self, DonationListFilter, ManualDonationInput, PendingDonationInput,
};
use crate::core::{program, report};
use crate::entities::{DonationModel, DonationSource, DonationStatus, ProgramModel};
use crate::errors::{Error, Result};

/// Payload for recording an offline donation that is already paid.
#[derive(Debug, Deserialize)]
pub struct CreateManualDonationRequest {
    /// Program to credit; omit for a general donation
    pub program_id: Option<i64>,
    /// Donor's name
    pub donor_name: Option<String>,
    /// Donor's email address
    pub donor_email: Option<String>,
    /// Donor's phone number
    pub donor_phone: Option<String>,
    /// Donated amount
    pub amount: Decimal,
    /// Hide the donor in public listings
    #[serde(default)]
    pub is_anonymous: bool,
    /// Payment method, e.g. "bank_transfer"
    pub payment_method: Option<String>,
    /// Payment channel within the method
    pub payment_channel: Option<String>,
    /// Reference to an uploaded transfer proof
    pub manual_proof_path: Option<String>,
    /// Free-form administrator notes
    pub notes: Option<String>,
    /// Confirmation time; defaults to now when omitted
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<CreateManualDonationRequest> for ManualDonationInput {
    fn from(request: CreateManualDonationRequest) -> Self {
        Self {
            program_id: request.program_id,
            donor_name: request.donor_name,
            donor_email: request.donor_email,
            donor_phone: request.donor_phone,
            amount: request.amount,
            is_anonymous: request.is_anonymous,
            payment_method: request.payment_method,
            payment_channel: request.payment_channel,
            manual_proof_path: request.manual_proof_path,
            notes: request.notes,
            paid_at: request.paid_at,
        }
    }
}

/// Payload for opening a gateway donation that awaits payment.
#[derive(Debug, Deserialize)]
pub struct CreatePendingDonationRequest {
    /// Program to credit once paid; omit for a general donation
    pub program_id: Option<i64>,
    /// Donor's name
    pub donor_name: Option<String>,
    /// Donor's email address
    pub donor_email: Option<String>,
    /// Donor's phone number
    pub donor_phone: Option<String>,
    /// Donated amount
    pub amount: Decimal,
    /// Hide the donor in public listings
    #[serde(default)]
    pub is_anonymous: bool,
    /// Payment method chosen at checkout
    pub payment_method: Option<String>,
    /// Payment channel within the method
    pub payment_channel: Option<String>,
    /// Order id assigned by the payment gateway
    pub gateway_order_id: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

impl From<CreatePendingDonationRequest> for PendingDonationInput {
    fn from(request: CreatePendingDonationRequest) -> Self {
        Self {
            program_id: request.program_id,
            donor_name: request.donor_name,
            donor_email: request.donor_email,
            donor_phone: request.donor_phone,
            amount: request.amount,
            is_anonymous: request.is_anonymous,
            payment_method: request.payment_method,
            payment_channel: request.payment_channel,
            gateway_order_id: request.gateway_order_id,
            notes: request.notes,
        }
    }
}

/// Payload for moving a donation to a new status.
#[derive(Debug, Deserialize)]
pub struct UpdateDonationStatusRequest {
    /// Status to move the donation to
    pub status: DonationStatus,
    /// Explicit confirmation time; defaults to now when the move enters
    /// `paid` without one
    pub paid_at: Option<DateTime<Utc>>,
    /// Replacement notes; existing notes are kept when omitted
    pub notes: Option<String>,
}

/// Query-string filters for the donation listing.
#[derive(Debug, Deserialize)]
pub struct ListDonationsQuery {
    /// Only donations in this status
    pub status: Option<DonationStatus>,
    /// Only donations from this source
    pub source: Option<DonationSource>,
    /// Only donations for this program
    pub program_id: Option<i64>,
    /// Substring match over code, donor name, and donor email
    pub search: Option<String>,
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size
    pub per_page: Option<u64>,
}

/// Donation plus the program it credits, as returned by mutating endpoints.
#[derive(Debug, Serialize)]
pub struct DonationResponse {
    /// The donation record
    pub donation: DonationModel,
    /// The credited program with its current collected amount, when the
    /// donation is tied to one
    pub program: Option<ProgramModel>,
}

/// One page of donations plus paging metadata.
#[derive(Debug, Serialize)]
pub struct DonationListResponse {
    /// Donations on this page, newest first
    pub items: Vec<DonationModel>,
    /// Total matching donations across all pages
    pub total: u64,
    /// 1-based page number
    pub page: u64,
    /// Page size used
    pub per_page: u64,
    /// Total number of pages
    pub total_pages: u64,
}

/// Aggregate donation figures for the admin dashboard.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Sum of all paid donation amounts
    pub total_collected: Decimal,
    /// All donations, regardless of status
    pub total_donations: u64,
    /// Donations currently paid
    pub paid_count: u64,
    /// Donations awaiting payment
    pub pending_count: u64,
    /// Donations whose payment failed
    pub failed_count: u64,
    /// Donations whose payment window elapsed
    pub expired_count: u64,
    /// Donations that were cancelled
    pub cancelled_count: u64,
    /// Paid donations not earmarked for any program
    pub general_paid_count: u64,
}

/// `GET /api/donations` - lists donations with filters and paging.
pub async fn list_donations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListDonationsQuery>,
) -> Result<Json<DonationListResponse>> {
    let page = donation::list_donations(
        &state.db,
        DonationListFilter {
            status: query.status,
            source: query.source,
            program_id: query.program_id,
            search: query.search,
            page: query.page,
            per_page: query.per_page,
        },
    )
    .await?;

    Ok(Json(DonationListResponse {
        items: page.items,
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        total_pages: page.total_pages,
    }))
}

/// `POST /api/donations` - records a manual donation and credits its
/// program immediately.
pub async fn create_manual_donation(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateManualDonationRequest>,
) -> Result<(StatusCode, Json<DonationResponse>)> {
    let (created, program) =
        donation::create_manual_donation(&state.db, payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(DonationResponse {
            donation: created,
            program,
        }),
    ))
}

/// `POST /api/donations/pending` - opens a gateway donation awaiting
/// payment. Program totals are untouched until the donation is paid.
pub async fn create_pending_donation(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePendingDonationRequest>,
) -> Result<(StatusCode, Json<DonationModel>)> {
    let created = donation::create_pending_donation(&state.db, payload.into()).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/donations/summary` - aggregate figures for the dashboard.
pub async fn donation_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SummaryResponse>> {
    let summary = report::generate_donation_summary(&state.db).await?;

    Ok(Json(SummaryResponse {
        total_collected: summary.total_collected,
        total_donations: summary.total_donations,
        paid_count: summary.paid_count,
        pending_count: summary.pending_count,
        failed_count: summary.failed_count,
        expired_count: summary.expired_count,
        cancelled_count: summary.cancelled_count,
        general_paid_count: summary.general_paid_count,
    }))
}

/// `GET /api/donations/:id` - fetches a single donation with its program.
pub async fn get_donation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DonationResponse>> {
    let found = donation::get_donation_by_id(&state.db, id)
        .await?
        .ok_or(Error::DonationNotFound { id })?;

    let program = match found.program_id {
        Some(program_id) => program::get_program_by_id(&state.db, program_id).await?,
        None => None,
    };

    Ok(Json(DonationResponse {
        donation: found,
        program,
    }))
}

/// `PATCH /api/donations/:id/status` - moves a donation to a new status and
/// applies the matching ledger adjustment.
pub async fn update_donation_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateDonationStatusRequest>,
) -> Result<Json<DonationResponse>> {
    let (updated, program) = donation::update_donation_status(
        &state.db,
        id,
        payload.status,
        payload.paid_at,
        payload.notes,
    )
    .await?;

    Ok(Json(DonationResponse {
        donation: updated,
        program,
    }))
}

/// `DELETE /api/donations/:id` - removes a donation, debiting its program
/// first when the donation was paid.
pub async fn delete_donation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    donation::delete_donation(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: format!("Donation {id} deleted"),
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::api::create_router;
    use crate::test_utils::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use axum::Router;
    use rust_decimal_macros::dec;
    use sea_orm::DatabaseConnection;
    use serde_json::json;
    use tower::util::ServiceExt; // for `oneshot`

    async fn setup_test_app() -> crate::errors::Result<(Router, DatabaseConnection)> {
        let db = setup_test_db().await?;
        let app = create_router(Arc::new(AppState { db: db.clone() }));
        Ok((app, db))
    }

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn decimal_field(value: &serde_json::Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_manual_donation_credits_and_cancel_debits() -> crate::errors::Result<()> {
        let (app, db) = setup_test_app().await?;
        let program = create_test_program(&db, "Food Packages").await?;

        let request = json_request(
            Method::POST,
            "/api/donations",
            json!({
                "program_id": program.id,
                "donor_name": "Budi Santoso",
                "donor_email": "budi@example.org",
                "amount": 100000,
                "payment_method": "bank_transfer"
            }),
        );
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = read_json(response).await;
        let code = body["donation"]["code"].as_str().unwrap().to_string();
        assert!(code.starts_with("DPF-"));
        assert_eq!(body["donation"]["status"], "paid");
        assert!(!body["donation"]["paid_at"].is_null());
        assert_eq!(
            decimal_field(&body["program"]["collected_amount"]),
            dec!(100000)
        );

        let donation_id = body["donation"]["id"].as_i64().unwrap();

        let request = json_request(
            Method::PATCH,
            &format!("/api/donations/{donation_id}/status"),
            json!({ "status": "cancelled" }),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["donation"]["status"], "cancelled");
        assert_eq!(
            decimal_field(&body["program"]["collected_amount"]),
            Decimal::ZERO
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_create_manual_donation_validation_maps_to_422() -> crate::errors::Result<()> {
        let (app, _db) = setup_test_app().await?;

        let request = json_request(
            Method::POST,
            "/api/donations",
            json!({ "amount": 0, "donor_email": "not-an-email" }),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = read_json(response).await;
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"]["amount"][0], "Amount must be at least 1");
        assert_eq!(body["errors"]["donor_name"][0], "Donor name is required");
        assert_eq!(
            body["errors"]["donor_email"][0],
            "Donor email must be a valid email address"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_create_donation_for_unknown_program() -> crate::errors::Result<()> {
        let (app, _db) = setup_test_app().await?;

        let request = json_request(
            Method::POST,
            "/api/donations",
            json!({
                "program_id": 999,
                "donor_name": "Lost Donor",
                "amount": 10000
            }),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = read_json(response).await;
        assert_eq!(
            body["errors"]["program_id"][0],
            "Referenced program does not exist"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_pending_donation_then_payment_callback() -> crate::errors::Result<()> {
        let (app, db) = setup_test_app().await?;
        let program = create_test_program(&db, "Mosque Renovation").await?;

        let request = json_request(
            Method::POST,
            "/api/donations/pending",
            json!({
                "program_id": program.id,
                "amount": 50000,
                "is_anonymous": true,
                "payment_method": "virtual_account",
                "gateway_order_id": "ORDER-123"
            }),
        );
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = read_json(response).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(body["source"], "gateway");
        assert!(body["paid_at"].is_null());
        let donation_id = body["id"].as_i64().unwrap();

        // The program is untouched while the donation is pending
        let request = Request::builder()
            .uri(format!("/api/programs/{}", program.id))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let body = read_json(response).await;
        assert_eq!(decimal_field(&body["collected_amount"]), Decimal::ZERO);

        // Payment callback marks it paid and credits the program
        let request = json_request(
            Method::PATCH,
            &format!("/api/donations/{donation_id}/status"),
            json!({ "status": "paid" }),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["donation"]["status"], "paid");
        assert!(!body["donation"]["paid_at"].is_null());
        assert_eq!(
            decimal_field(&body["program"]["collected_amount"]),
            dec!(50000)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_list_donations_with_query() -> crate::errors::Result<()> {
        let (app, db) = setup_test_app().await?;
        let program = create_test_program(&db, "Scholarships").await?;

        create_custom_manual_donation(&db, Some(program.id), dec!(10000)).await?;
        create_custom_manual_donation(&db, Some(program.id), dec!(20000)).await?;
        create_test_pending_donation(&db, Some(program.id), dec!(30000)).await?;

        let request = Request::builder()
            .uri("/api/donations?status=paid")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);

        let request = Request::builder()
            .uri("/api/donations?per_page=2&page=2")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let body = read_json(response).await;
        assert_eq!(body["total"], 3);
        assert_eq!(body["page"], 2);
        assert_eq!(body["per_page"], 2);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);

        let request = Request::builder()
            .uri("/api/donations?search=Test+Donor")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let body = read_json(response).await;
        assert_eq!(body["total"], 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_donation_summary_endpoint() -> crate::errors::Result<()> {
        let (app, db) = setup_test_app().await?;
        let program = create_test_program(&db, "Summit").await?;

        create_custom_manual_donation(&db, Some(program.id), dec!(100000)).await?;
        create_custom_manual_donation(&db, None, dec!(25000)).await?;
        create_test_pending_donation(&db, Some(program.id), dec!(50000)).await?;

        let request = Request::builder()
            .uri("/api/donations/summary")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(decimal_field(&body["total_collected"]), dec!(125000));
        assert_eq!(body["total_donations"], 3);
        assert_eq!(body["paid_count"], 2);
        assert_eq!(body["pending_count"], 1);
        assert_eq!(body["general_paid_count"], 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_donation_includes_program() -> crate::errors::Result<()> {
        let (app, db) = setup_test_app().await?;
        let program = create_test_program(&db, "Orphanage Support").await?;
        let (created, _) =
            create_custom_manual_donation(&db, Some(program.id), dec!(75000)).await?;

        let request = Request::builder()
            .uri(format!("/api/donations/{}", created.id))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["donation"]["code"], created.code);
        assert_eq!(body["program"]["title"], "Orphanage Support");

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_donation_not_found() -> crate::errors::Result<()> {
        let (app, _db) = setup_test_app().await?;

        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/donations/42")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = read_json(response).await;
        assert_eq!(body["message"], "Donation 42 not found");

        Ok(())
    }
}
