//! # vigil-api: Axum API Service for Vigil
//!
//! HTTP surface over [`vigil_intake::ComplaintService`].
//!
//! ## API Surface
//!
//! | Prefix                  | Module                  | Auth   |
//! |-------------------------|-------------------------|--------|
//! | `/v1/complaints*`       | [`routes::complaints`]  | none   |
//! | `/v1/admin/complaints*` | [`routes::admin`]       | bearer |
//! | `/health/*`             | here                    | none   |
//! | `/metrics`              | here                    | none   |
//! | `/openapi.json`         | [`openapi`]             | none   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer → TraceLayer → [admin only] AdminAuthMiddleware → Handler
//! ```

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod throttle;

use axum::extract::State;
use axum::http::{header, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsOrigins;
use crate::error::AppError;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Only the admin routes sit behind the auth middleware; the reporter
/// routes, health probes, metrics, and the OpenAPI document are open.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.cors);
    let admin = routes::admin::router()
        .route_layer(from_fn_with_state(state.clone(), auth::admin_auth_middleware));

    let api = Router::new()
        .merge(routes::complaints::router())
        .merge(admin)
        .merge(openapi::router())
        .route("/metrics", get(render_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api).layer(cors)
}

/// Browser access for the reporting frontend. Preflights are answered here,
/// before admin authentication runs.
fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::from(Any),
        CorsOrigins::List(list) => AllowOrigin::list(list.iter().cloned()),
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}

/// Prometheus text exposition, when the recorder is installed.
async fn render_metrics(State(state): State<AppState>) -> Result<String, AppError> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| AppError::NotFound("metrics exporter not installed".into()))
}
