//! # SHA-256 Text Hashing
//!
//! One-way, fixed-length hashing for short secrets. Commitments do not use
//! this path; they hash `CanonicalBytes` through `vigil_core::sha256_digest`.

use sha2::{Digest, Sha256};

/// SHA-256 of the UTF-8 bytes of `text`, as 64 lowercase hex characters.
///
/// No salt: the same input always yields the same digest.
pub fn hash_text(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
