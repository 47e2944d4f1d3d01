//! # Commitment Builder
//!
//! A complaint's commitment is `SHA-256(JCS(content))` over exactly these
//! fields:
//!
//! ```text
//! { anonymous, category, date, description, location, title }
//! ```
//!
//! Absent optional fields canonicalize as `""`. JCS sorts keys, so the
//! order in which a client sent the fields has no effect. Values are hashed
//! exactly as submitted, without trimming or case folding, so anyone holding
//! the disclosed content can reproduce the digest.

use serde::Serialize;

use vigil_core::{sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest};

use crate::complaint::ComplaintContent;

#[derive(Serialize)]
struct CommittedFields<'a> {
    anonymous: bool,
    category: &'a str,
    date: &'a str,
    description: &'a str,
    location: &'a str,
    title: &'a str,
}

impl<'a> From<&'a ComplaintContent> for CommittedFields<'a> {
    fn from(c: &'a ComplaintContent) -> Self {
        Self {
            anonymous: c.anonymous,
            category: &c.category,
            date: c.date_or_empty(),
            description: &c.description,
            location: c.location_or_empty(),
            title: &c.title,
        }
    }
}

/// Canonical bytes of the committed fields.
pub fn canonicalize(content: &ComplaintContent) -> Result<CanonicalBytes, CanonicalizationError> {
    CanonicalBytes::new(&CommittedFields::from(content))
}

/// The commitment digest of `content`.
pub fn commit(content: &ComplaintContent) -> Result<ContentDigest, CanonicalizationError> {
    Ok(sha256_digest(&canonicalize(content)?))
}

/// Third-party check: does `content` hash to `expected_hex`?
///
/// Malformed `expected_hex` is a mismatch, not an error.
pub fn verify_commitment(content: &ComplaintContent, expected_hex: &str) -> bool {
    let Ok(expected) = ContentDigest::from_hex(&expected_hex.trim().to_ascii_lowercase()) else {
        return false;
    };
    matches!(commit(content), Ok(actual) if actual == expected)
}
