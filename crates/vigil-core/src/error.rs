//! # Error Types
//!
//! Errors shared by every crate in the workspace. Crate-specific failures
//! (cryptography, storage, anchoring) have their own enums next to the code
//! that raises them.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Non-integer numbers have no canonical representation here.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Malformed or missing input. User-correctable; messages are safe to
/// return to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field exceeded its length limit.
    #[error("field {field} exceeds {max} characters")]
    TooLong {
        /// Field name.
        field: &'static str,
        /// Maximum permitted length in characters.
        max: usize,
    },

    /// Status string outside the enumerated lifecycle set.
    #[error("invalid status {0:?}: expected one of \"Open\", \"In Review\", \"Resolved\"")]
    InvalidStatus(String),

    /// Identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Digest string is not 64 hex characters.
    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}
