//! # vigil-crypto: Cryptographic Primitives
//!
//! - **Field encryption** (`field.rs`): ChaCha20-Poly1305 encrypt-at-rest for
//!   the sensitive text fields of a complaint, with an explicit empty
//!   sentinel for absent values.
//! - **Keys** (`key.rs`): the 256-bit field encryption key, zeroized on drop.
//! - **Text hashing** (`sha256.rs`): unsalted SHA-256 hex digests. Unsalted
//!   on purpose: PIN verification compares digests directly.
//! - **Retrieval PIN** (`pin.rs`): 6-digit secret generation from the OS
//!   CSPRNG and fail-closed, constant-time verification.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vigil-*` crates.
//! - No mocking of cryptographic operations in tests.
//! - Secret-bearing types never print their contents through `Debug`.

pub mod error;
pub mod field;
pub mod key;
pub mod pin;
pub mod sha256;

pub use error::CryptoError;
pub use field::{decrypt_field, encrypt_field, SealedField};
pub use key::EncryptionKey;
pub use pin::{pin_hash, verify_pin, RetrievalPin, PIN_LENGTH};
pub use sha256::hash_text;
