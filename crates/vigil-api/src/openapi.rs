//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented routes into one OpenAPI 3.1 document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vigil Complaint Intake API",
        version = "0.1.0",
        description = "Anonymous complaint submission with PIN-based tracking, tamper-evident content commitments, and optional ledger anchoring.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::complaints::submit_complaint,
        crate::routes::complaints::track_complaint,
        crate::routes::admin::list_complaints,
        crate::routes::admin::list_unanchored,
        crate::routes::admin::update_status,
        crate::routes::admin::reconcile_anchor,
        crate::routes::admin::verify_integrity,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::AnchorReferenceBody,
        crate::routes::AnchorOutcomeBody,
        crate::routes::ComplaintSummaryBody,
        crate::routes::complaints::SubmitComplaintRequest,
        crate::routes::complaints::SubmitComplaintResponse,
        crate::routes::complaints::TrackRequest,
        crate::routes::complaints::TrackResponse,
        crate::routes::admin::UpdateStatusRequest,
        crate::routes::admin::IntegrityReportBody,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "complaints", description = "Reporter-facing intake and tracking"),
        (name = "admin", description = "Authenticated case administration"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
