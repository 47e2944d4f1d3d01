//! # vigil-core: Foundational Types for Vigil
//!
//! The leaf crate of the workspace. Defines the primitives that every other
//! crate builds on: the canonical byte representation used for commitments,
//! the SHA-256 content digest, and typed complaint identifiers.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All commitment hashing flows through
//!    `CanonicalBytes::new()`. A digest over non-canonical bytes cannot be
//!    expressed, so two parties hashing the same disclosed content always
//!    agree on the result.
//!
//! 2. **`sha256_digest()` accepts only `&CanonicalBytes`.** Free-form text
//!    hashing (PIN digests) lives in `vigil-crypto` and is a separate path.
//!
//! 3. **Newtype identifiers.** `ComplaintId` wraps a UUID so that a complaint
//!    id can never be confused with any other string in an API signature.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vigil-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::ComplaintId;
