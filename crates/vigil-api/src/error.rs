//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps [`IntakeError`] to HTTP status codes and JSON error bodies.
//! Internal error details are logged, never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use vigil_intake::IntakeError;

/// Message returned for every rejected track request.
pub const TRACK_REJECTED_MESSAGE: &str = "invalid complaint id or PIN";

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure (401). The message is returned verbatim.
    #[error("{0}")]
    Unauthorized(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Anchoring is mandatory and the ledger is down (503).
    #[error("ledger anchoring is required and currently unavailable")]
    AnchorUnavailable,

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The generic rejection used by the track endpoint.
    pub fn track_rejected() -> Self {
        Self::Unauthorized(TRACK_REJECTED_MESSAGE.to_string())
    }

    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::AnchorUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "ANCHOR_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        (status, Json(ErrorBody::new(code, message))).into_response()
    }
}

/// Map service errors for the admin and submit paths.
///
/// The track handler does not use this: it collapses `NotFound` and
/// `Unauthorized` into [`AppError::track_rejected`] itself.
impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Validation(e) => Self::Validation(e.to_string()),
            IntakeError::NotFound(_) => Self::NotFound("complaint not found".into()),
            IntakeError::Unauthorized => Self::track_rejected(),
            IntakeError::InvalidTransition(e) => Self::Conflict(e.to_string()),
            IntakeError::AnchorRequired(reason) => {
                tracing::warn!(%reason, "submission refused: ledger unavailable");
                Self::AnchorUnavailable
            }
            IntakeError::Canonicalization(_) | IntakeError::Crypto(_) | IntakeError::Store(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<vigil_core::ValidationError> for AppError {
    fn from(err: vigil_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
