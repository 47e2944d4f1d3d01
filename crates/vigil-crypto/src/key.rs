//! # Field Encryption Key
//!
//! A 256-bit symmetric key for ChaCha20-Poly1305. Key material lives only in
//! memory, is zeroized on drop, and is redacted from `Debug` output.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Length of the encryption key in bytes.
pub const KEY_LEN: usize = 32;

/// Symmetric key for sensitive-field encryption.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a key from 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        if s.len() != KEY_LEN * 2 {
            return Err(CryptoError::InvalidKey(format!(
                "expected {} hex chars, got {}",
                KEY_LEN * 2,
                s.len()
            )));
        }
        let mut bytes = [0u8; KEY_LEN];
        if let Err(e) = hex::decode_to_slice(s, &mut bytes) {
            bytes.zeroize();
            return Err(CryptoError::InvalidKey(e.to_string()));
        }
        Ok(Self(bytes))
    }

    /// Generate a fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Hex encoding of the key. Only for provisioning output (`vigil keygen`).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}
