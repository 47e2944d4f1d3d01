//! # Admin Authentication
//!
//! Administrative operations take an [`AdminPrincipal`]. Its constructor is
//! private to this crate: verifiers implement
//! [`AuthVerifier::authenticate`], which yields a subject, and
//! [`AuthVerifier::verify`] wraps that subject. A service method that
//! receives a principal therefore knows some verifier admitted the caller.
//!
//! The track path never consults a verifier; reporters authenticate with
//! their PIN alone.

use async_trait::async_trait;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// An authenticated administrator.
///
/// Code outside this crate cannot mint one:
///
/// ```compile_fail
/// let _ = vigil_intake::AdminPrincipal::authenticated("intruder");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPrincipal {
    subject: String,
}

impl AdminPrincipal {
    pub(crate) fn authenticated(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    /// Stable identifier of the administrator, for audit logs.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Admin authentication failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential was presented.
    #[error("missing credential")]
    Missing,

    /// The credential was presented and refused.
    #[error("invalid credential")]
    Invalid,

    /// The identity provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Turns a bearer credential into an [`AdminPrincipal`].
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    /// Check `bearer` (the token without the `Bearer ` prefix) and return
    /// the administrator's subject.
    async fn authenticate(&self, bearer: &str) -> Result<String, AuthError>;

    /// Authenticate `bearer` and mint the principal. A blank subject is
    /// refused.
    async fn verify(&self, bearer: &str) -> Result<AdminPrincipal, AuthError> {
        let subject = self.authenticate(bearer).await?;
        if subject.trim().is_empty() {
            return Err(AuthError::Invalid);
        }
        Ok(AdminPrincipal::authenticated(subject))
    }
}

/// Verifier for a single shared admin token.
pub struct StaticTokenVerifier {
    token: String,
    subject: String,
}

impl StaticTokenVerifier {
    /// Accept exactly `token`, authenticating as `"admin"`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            subject: "admin".to_string(),
        }
    }

    /// Override the subject recorded for this token.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }
}

impl std::fmt::Debug for StaticTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenVerifier")
            .field("token", &"[REDACTED]")
            .field("subject", &self.subject)
            .finish()
    }
}

#[async_trait]
impl AuthVerifier for StaticTokenVerifier {
    async fn authenticate(&self, bearer: &str) -> Result<String, AuthError> {
        if bearer.is_empty() {
            return Err(AuthError::Missing);
        }
        if constant_time_token_eq(bearer, &self.token) {
            Ok(self.subject.clone())
        } else {
            Err(AuthError::Invalid)
        }
    }
}

/// Constant-time token comparison. A length mismatch still performs a
/// comparison so timing does not reveal the expected length.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}
