//! # Admin Authentication Middleware
//!
//! Every `/v1/admin/*` request passes through [`admin_auth_middleware`],
//! which hands the bearer token to the configured [`AuthVerifier`] and
//! injects the resulting [`AdminPrincipal`] into request extensions.
//! Handlers take the [`Admin`] extractor.
//!
//! With no verifier configured, admin routes refuse every request.
//!
//! ## Verifiers
//!
//! - [`StaticTokenVerifier`](vigil_intake::StaticTokenVerifier) for a shared
//!   token from `VIGIL_AUTH_TOKEN`.
//! - [`IntrospectionVerifier`] for an external identity provider speaking
//!   OAuth 2.0 token introspection (RFC 7662), from
//!   `VIGIL_AUTH_VERIFIER_ENDPOINT`.

use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use vigil_intake::{AdminPrincipal, AuthError, AuthVerifier};

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

// ── Extractor ───────────────────────────────────────────────────────────────

/// The authenticated administrator, as injected by the middleware.
#[derive(Debug, Clone)]
pub struct Admin(pub AdminPrincipal);

impl<S: Send + Sync> axum::extract::FromRequestParts<S> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminPrincipal>()
            .cloned()
            .map(Admin)
            .ok_or_else(|| AppError::Unauthorized("authentication required".into()))
    }
}

// ── Middleware ──────────────────────────────────────────────────────────────

/// Authenticate admin requests against the configured verifier.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(verifier) = state.verifier.clone() else {
        tracing::warn!(
            path = %request.uri().path(),
            "admin request refused: no verifier configured"
        );
        return unauthorized_response("authentication required");
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or("");
    if token.is_empty() {
        return unauthorized_response("authentication required");
    }

    match verifier.verify(token).await {
        Ok(principal) => {
            tracing::debug!(admin = principal.subject(), "admin authenticated");
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(AuthError::Unavailable(reason)) => {
            tracing::warn!(%reason, "identity provider unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorBody::new(
                    "AUTH_UNAVAILABLE",
                    "authentication is temporarily unavailable",
                )),
            )
                .into_response()
        }
        Err(AuthError::Missing | AuthError::Invalid) => {
            tracing::debug!("admin credential rejected");
            unauthorized_response("invalid credentials")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        Json(ErrorBody::new("UNAUTHORIZED", message)),
    )
        .into_response()
}

// ── Introspection ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct IntrospectionResponse {
    active: bool,
    #[serde(default)]
    sub: Option<String>,
}

/// Verifier backed by an RFC 7662 token introspection endpoint.
#[derive(Debug, Clone)]
pub struct IntrospectionVerifier {
    client: reqwest::Client,
    endpoint: String,
}

impl IntrospectionVerifier {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl AuthVerifier for IntrospectionVerifier {
    async fn authenticate(&self, bearer: &str) -> Result<String, AuthError> {
        if bearer.is_empty() {
            return Err(AuthError::Missing);
        }

        let resp = self
            .client
            .post(&self.endpoint)
            .form(&[("token", bearer)])
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.without_url().to_string()))?;

        if !resp.status().is_success() {
            return Err(AuthError::Unavailable(format!(
                "introspection returned {}",
                resp.status()
            )));
        }

        let body: IntrospectionResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(e.without_url().to_string()))?;

        if !body.active {
            return Err(AuthError::Invalid);
        }
        Ok(body.sub.unwrap_or_else(|| "admin".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::middleware::from_fn_with_state;
    use axum::routing::{get, post};
    use axum::{Form, Router};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tower::ServiceExt;
    use vigil_intake::StaticTokenVerifier;

    async fn whoami(Admin(principal): Admin) -> String {
        principal.subject().to_string()
    }

    fn app(verifier: Option<Arc<dyn AuthVerifier>>) -> Router {
        let mut state = AppState::in_memory().unwrap();
        state.verifier = verifier;
        Router::new()
            .route("/v1/admin/whoami", get(whoami))
            .layer(from_fn_with_state(state.clone(), admin_auth_middleware))
            .with_state(state)
    }

    fn request(auth: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/v1/admin/whoami");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn static_verifier() -> Option<Arc<dyn AuthVerifier>> {
        Some(Arc::new(StaticTokenVerifier::new("s3cret").with_subject("ops")))
    }

    #[tokio::test]
    async fn valid_token_reaches_handler() {
        let resp = app(static_verifier())
            .oneshot(request(Some("Bearer s3cret")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_or_wrong_token_rejected() {
        for auth in [None, Some("Bearer wrong"), Some("Basic s3cret"), Some("Bearer ")] {
            let resp = app(static_verifier()).oneshot(request(auth)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{auth:?}");
            assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
        }
    }

    #[tokio::test]
    async fn no_verifier_fails_closed() {
        let resp = app(None).oneshot(request(Some("Bearer s3cret"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    async fn spawn_introspection() -> String {
        async fn introspect(Form(form): Form<HashMap<String, String>>) -> Json<serde_json::Value> {
            match form.get("token").map(String::as_str) {
                Some("good") => Json(serde_json::json!({"active": true, "sub": "alice"})),
                _ => Json(serde_json::json!({"active": false})),
            }
        }
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Router::new().route("/introspect", post(introspect));
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/introspect")
    }

    #[tokio::test]
    async fn introspection_active_and_inactive() {
        let verifier = IntrospectionVerifier::new(spawn_introspection().await).unwrap();
        assert_eq!(verifier.verify("good").await.unwrap().subject(), "alice");
        assert_eq!(verifier.verify("bad").await, Err(AuthError::Invalid));
        assert_eq!(verifier.verify("").await, Err(AuthError::Missing));
    }

    #[tokio::test]
    async fn introspection_unreachable_is_unavailable() {
        let verifier = IntrospectionVerifier::new("http://127.0.0.1:9/introspect").unwrap();
        assert!(matches!(
            verifier.verify("good").await,
            Err(AuthError::Unavailable(_))
        ));
    }
}
