//! # Admin Console API
//!
//! Authenticated endpoints for case handlers. Listings never carry
//! complaint content; only category, status, and timestamps.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use vigil_core::ComplaintId;
use vigil_state::ComplaintStatus;

use super::{AnchorOutcomeBody, AnchorReferenceBody, ComplaintSummaryBody};
use crate::auth::Admin;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Status change request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// One of `"Open"`, `"In Review"`, `"Resolved"`.
    pub status: String,
}

impl Validate for UpdateStatusRequest {
    fn validate(&self) -> Result<(), String> {
        ComplaintStatus::parse(&self.status)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Integrity check result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IntegrityReportBody {
    pub id: Uuid,
    /// Commitment recorded at submission.
    pub stored_commitment: String,
    /// Commitment over the content as it decrypts now. Absent when the
    /// stored ciphertext no longer decrypts.
    pub recomputed_commitment: Option<String>,
    pub intact: bool,
    pub anchor_reference: Option<AnchorReferenceBody>,
}

/// Build the admin router. The caller applies the auth middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/complaints", get(list_complaints))
        .route("/v1/admin/complaints/unanchored", get(list_unanchored))
        .route("/v1/admin/complaints/{id}/status", put(update_status))
        .route("/v1/admin/complaints/{id}/anchor", post(reconcile_anchor))
        .route("/v1/admin/complaints/{id}/integrity", get(verify_integrity))
}

/// GET /v1/admin/complaints: All complaints, newest first.
#[utoipa::path(
    get,
    path = "/v1/admin/complaints",
    responses(
        (status = 200, description = "Complaint summaries", body = Vec<ComplaintSummaryBody>),
        (status = 401, description = "Missing or invalid bearer token", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub(crate) async fn list_complaints(
    State(state): State<AppState>,
    Admin(admin): Admin,
) -> Result<Json<Vec<ComplaintSummaryBody>>, AppError> {
    let summaries = state.service.admin_list(&admin).await?;
    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

/// GET /v1/admin/complaints/unanchored: Complaints awaiting reconciliation.
#[utoipa::path(
    get,
    path = "/v1/admin/complaints/unanchored",
    responses(
        (status = 200, description = "Unanchored complaint summaries", body = Vec<ComplaintSummaryBody>),
        (status = 401, description = "Missing or invalid bearer token", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub(crate) async fn list_unanchored(
    State(state): State<AppState>,
    Admin(admin): Admin,
) -> Result<Json<Vec<ComplaintSummaryBody>>, AppError> {
    let summaries = state.service.admin_list_unanchored(&admin).await?;
    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

/// PUT /v1/admin/complaints/{id}/status: Change a complaint's status.
#[utoipa::path(
    put,
    path = "/v1/admin/complaints/{id}/status",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated summary", body = ComplaintSummaryBody),
        (status = 404, description = "Complaint not found", body = crate::error::ErrorBody),
        (status = 409, description = "Complaint is resolved", body = crate::error::ErrorBody),
        (status = 422, description = "Unknown status", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub(crate) async fn update_status(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<ComplaintSummaryBody>, AppError> {
    let req = extract_validated_json(body)?;
    let summary = state
        .service
        .admin_update_status(&admin, ComplaintId::from_uuid(id), &req.status)
        .await?;
    Ok(Json(summary.into()))
}

/// POST /v1/admin/complaints/{id}/anchor: Retry anchoring a complaint.
#[utoipa::path(
    post,
    path = "/v1/admin/complaints/{id}/anchor",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Anchoring outcome", body = AnchorOutcomeBody),
        (status = 404, description = "Complaint not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub(crate) async fn reconcile_anchor(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Path(id): Path<Uuid>,
) -> Result<Json<AnchorOutcomeBody>, AppError> {
    let outcome = state
        .service
        .reconcile_anchor(&admin, ComplaintId::from_uuid(id))
        .await?;
    Ok(Json(AnchorOutcomeBody::from(&outcome)))
}

/// GET /v1/admin/complaints/{id}/integrity: Recompute and compare the commitment.
#[utoipa::path(
    get,
    path = "/v1/admin/complaints/{id}/integrity",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Integrity report", body = IntegrityReportBody),
        (status = 404, description = "Complaint not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub(crate) async fn verify_integrity(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Path(id): Path<Uuid>,
) -> Result<Json<IntegrityReportBody>, AppError> {
    let report = state
        .service
        .verify_integrity(&admin, ComplaintId::from_uuid(id))
        .await?;
    Ok(Json(IntegrityReportBody {
        id: *report.id.as_uuid(),
        stored_commitment: report.stored.to_hex(),
        recomputed_commitment: report.recomputed.map(|d| d.to_hex()),
        intact: report.intact,
        anchor_reference: report.anchor.as_ref().map(AnchorReferenceBody::from),
    }))
}
