//! # Intake Errors

use thiserror::Error;

use vigil_core::{CanonicalizationError, ComplaintId, ValidationError};
use vigil_crypto::CryptoError;
use vigil_state::StatusError;

use crate::store::StoreError;

/// Errors from [`ComplaintService`](crate::ComplaintService) operations.
///
/// `NotFound` and `Unauthorized` are distinct here so the service can log
/// and count them; the track endpoint renders both identically.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("complaint {0} not found")]
    NotFound(ComplaintId),

    #[error("retrieval PIN rejected")]
    Unauthorized,

    #[error(transparent)]
    InvalidTransition(#[from] StatusError),

    /// Anchoring is required and the ledger could not record the commitment.
    #[error("ledger anchoring required but unavailable: {0}")]
    AnchorRequired(String),

    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_state::ComplaintStatus;

    #[test]
    fn conversions() {
        let err: IntakeError = ValidationError::MissingField("title").into();
        assert!(matches!(err, IntakeError::Validation(_)));
        assert_eq!(err.to_string(), "missing required field: title");

        let err: IntakeError = StatusError::Terminal {
            from: ComplaintStatus::Resolved,
            to: ComplaintStatus::Open,
        }
        .into();
        assert!(matches!(err, IntakeError::InvalidTransition(_)));

        let err: IntakeError = StoreError::Backend("connection reset".into()).into();
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn unauthorized_message_is_generic() {
        assert_eq!(IntakeError::Unauthorized.to_string(), "retrieval PIN rejected");
    }
}
