//! # Complaint Intake & Tracking
//!
//! - `POST /v1/complaints` accepts a complaint and returns its id, the
//!   retrieval PIN (shown once), the content commitment, and the anchoring
//!   outcome.
//! - `POST /v1/complaints/track` returns the status of a complaint against
//!   its PIN.
//!
//! Track rejections are byte-identical whether the id is malformed, unknown,
//! throttled, or paired with the wrong PIN.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use vigil_core::ComplaintId;
use vigil_intake::{ComplaintContent, IntakeError};

use super::{AnchorOutcomeBody, AnchorReferenceBody};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Validate};
use crate::state::AppState;

/// Complaint submission.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitComplaintRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: Option<String>,
    /// Incident date, free-form.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub anonymous: bool,
}

impl From<SubmitComplaintRequest> for ComplaintContent {
    fn from(req: SubmitComplaintRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            category: req.category,
            location: req.location,
            date: req.date,
            anonymous: req.anonymous,
        }
    }
}

impl Validate for SubmitComplaintRequest {
    fn validate(&self) -> Result<(), String> {
        ComplaintContent::from(self.clone())
            .validate()
            .map_err(|e| e.to_string())
    }
}

/// Submission receipt. The PIN is not recoverable later.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitComplaintResponse {
    pub id: uuid::Uuid,
    /// Six-digit retrieval PIN.
    pub pin: String,
    /// SHA-256 hex of the canonical content.
    pub commitment: String,
    /// `"anchored"`, `"skipped"`, or `"unavailable"`.
    pub anchor_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_reference: Option<AnchorReferenceBody>,
}

/// Track request. Both fields are taken as opaque strings.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TrackRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pin: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrackResponse {
    /// `"Open"`, `"In Review"`, or `"Resolved"`.
    pub status: String,
}

/// Build the reporter-facing router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/complaints", post(submit_complaint))
        .route("/v1/complaints/track", post(track_complaint))
}

/// POST /v1/complaints: Submit a complaint.
#[utoipa::path(
    post,
    path = "/v1/complaints",
    request_body = SubmitComplaintRequest,
    responses(
        (status = 201, description = "Complaint accepted", body = SubmitComplaintResponse),
        (status = 400, description = "Malformed JSON", body = crate::error::ErrorBody),
        (status = 422, description = "Validation failed", body = crate::error::ErrorBody),
        (status = 503, description = "Anchoring required and ledger unavailable", body = crate::error::ErrorBody),
    ),
    tag = "complaints"
)]
pub(crate) async fn submit_complaint(
    State(state): State<AppState>,
    body: Result<Json<SubmitComplaintRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitComplaintResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let receipt = state.service.submit(req.into()).await?;

    let anchor = AnchorOutcomeBody::from(&receipt.anchor);
    Ok((
        StatusCode::CREATED,
        Json(SubmitComplaintResponse {
            id: *receipt.id.as_uuid(),
            pin: receipt.pin.expose().to_string(),
            commitment: receipt.commitment.to_hex(),
            anchor_status: anchor.anchor_status,
            anchor_reference: anchor.anchor_reference,
        }),
    ))
}

/// POST /v1/complaints/track: Look up a complaint's status by id and PIN.
#[utoipa::path(
    post,
    path = "/v1/complaints/track",
    request_body = TrackRequest,
    responses(
        (status = 200, description = "Current status", body = TrackResponse),
        (status = 401, description = "Invalid complaint id or PIN", body = crate::error::ErrorBody),
    ),
    tag = "complaints"
)]
pub(crate) async fn track_complaint(
    State(state): State<AppState>,
    body: Result<Json<TrackRequest>, JsonRejection>,
) -> Result<Json<TrackResponse>, AppError> {
    let req = extract_json(body)?;

    let Ok(id) = req.id.parse::<ComplaintId>() else {
        metrics::counter!("vigil_track_rejections_total").increment(1);
        return Err(AppError::track_rejected());
    };
    if !state.throttle.allows(id) {
        metrics::counter!("vigil_track_rejections_total").increment(1);
        return Err(AppError::track_rejected());
    }

    match state.service.track(id, &req.pin).await {
        Ok(status) => Ok(Json(TrackResponse {
            status: status.to_string(),
        })),
        Err(IntakeError::NotFound(_) | IntakeError::Unauthorized) => {
            state.throttle.record_failure(id);
            Err(AppError::track_rejected())
        }
        Err(other) => Err(other.into()),
    }
}
