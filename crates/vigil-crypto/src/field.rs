//! # Sensitive Field Encryption
//!
//! Encrypt-at-rest for complaint text fields using ChaCha20-Poly1305.
//!
//! ## Format
//!
//! `base64(nonce[12] || ciphertext || tag[16])`, standard alphabet with
//! padding. Each call draws a fresh random nonce, so encrypting the same
//! plaintext twice yields different ciphertexts. The authentication tag
//! makes any modification of a stored value a decryption failure.
//!
//! ## Empty Sentinel
//!
//! Absent or empty input maps to the empty string and never reaches the
//! cipher. The sentinel decrypts back to `""`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::key::EncryptionKey;

/// ChaCha20-Poly1305 nonce length.
pub const NONCE_LEN: usize = 12;

/// Poly1305 tag length.
pub const TAG_LEN: usize = 16;

/// An encrypted field value as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SealedField(String);

impl SealedField {
    /// The explicit empty sentinel.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Rehydrate a value read back from storage.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// Whether this is the empty sentinel.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stored representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the stored representation.
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Encrypt a field value under `key`.
pub fn encrypt_field(plaintext: &str, key: &EncryptionKey) -> Result<SealedField, CryptoError> {
    if plaintext.is_empty() {
        return Ok(SealedField::empty());
    }

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(SealedField(STANDARD.encode(out)))
}

/// Decrypt a value produced by [`encrypt_field`] under the same key.
pub fn decrypt_field(sealed: &SealedField, key: &EncryptionKey) -> Result<String, CryptoError> {
    if sealed.is_empty() {
        return Ok(String::new());
    }

    let raw = STANDARD
        .decode(sealed.as_str())
        .map_err(|_| CryptoError::Decryption("value is not valid base64".into()))?;
    if raw.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::Decryption(format!(
            "value too short: {} bytes",
            raw.len()
        )));
    }

    let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::Decryption("authentication failed".into()))?;

    String::from_utf8(plaintext)
        .map_err(|_| CryptoError::Decryption("plaintext is not UTF-8".into()))
}
