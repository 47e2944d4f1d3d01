//! # Cryptographic Error Types

use thiserror::Error;

/// Errors from cryptographic operations.
///
/// Messages describe the failure class only; they never include key
/// material, plaintext, or PINs.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Key material could not be parsed.
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),

    /// The AEAD cipher refused to encrypt.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The ciphertext was not produced by `encrypt_field` under this key,
    /// or has been altered.
    #[error("decryption failed: {0}")]
    Decryption(String),
}
