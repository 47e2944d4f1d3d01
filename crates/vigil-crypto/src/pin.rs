//! # Retrieval PIN
//!
//! The PIN is the only credential an anonymous reporter holds. It is drawn
//! uniformly from `[100000, 999999]` (900,000 values, leading digit never
//! zero so the width is always 6), shown once, and stored only as an
//! unsalted SHA-256 digest.
//!
//! ## Verification
//!
//! [`verify_pin`] fails closed: malformed candidates, malformed stored
//! digests and mismatches all return `false`, never an error. Digests are
//! compared with `subtle::ConstantTimeEq`.

use rand::rngs::OsRng;
use rand::Rng;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::sha256::hash_text;

/// Number of digits in a retrieval PIN.
pub const PIN_LENGTH: usize = 6;

const PIN_MIN: u32 = 100_000;
const PIN_MAX: u32 = 999_999;
const DIGEST_HEX_LEN: usize = 64;

/// A freshly generated retrieval PIN.
///
/// Zeroized on drop; `Debug` never prints the digits.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RetrievalPin(String);

impl RetrievalPin {
    /// Draw a new PIN from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut rng = OsRng;
        let value: u32 = rng.gen_range(PIN_MIN..=PIN_MAX);
        Self(value.to_string())
    }

    /// The plaintext digits, for the one-time submission response.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Digest to persist in place of the PIN.
    pub fn digest(&self) -> String {
        pin_hash(&self.0)
    }
}

impl std::fmt::Debug for RetrievalPin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RetrievalPin([REDACTED])")
    }
}

/// Digest of a PIN as stored.
pub fn pin_hash(pin: &str) -> String {
    hash_text(pin)
}

/// Check `candidate` against a stored PIN digest. Never panics or errors.
pub fn verify_pin(candidate: &str, stored_digest: &str) -> bool {
    if !is_well_formed(candidate) || !is_digest(stored_digest) {
        return false;
    }
    let computed = pin_hash(candidate);
    computed
        .as_bytes()
        .ct_eq(stored_digest.to_ascii_lowercase().as_bytes())
        .into()
}

fn is_well_formed(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    bytes.len() == PIN_LENGTH && bytes[0] != b'0' && bytes.iter().all(u8::is_ascii_digit)
}

fn is_digest(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}
