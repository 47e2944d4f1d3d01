//! # Ledger Clients
//!
//! The [`LedgerClient`] trait is the seam between intake and whatever
//! append-only ledger records commitments. It is **sealed**: only the
//! clients in this crate exist, so every implementation that can report a
//! commitment as anchored has been reviewed here.
//!
//! ## Security Invariant
//!
//! `submit_commitment()` returns `Ok` only once the ledger has accepted the
//! transaction carrying the commitment. Returning `Ok` for an unrecorded
//! commitment would let a record claim an anchor that does not exist.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vigil_core::ContentDigest;

/// Errors from ledger submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnchorError {
    /// The client configuration or request was refused before submission.
    #[error("anchor rejected: {0}")]
    Rejected(String),

    /// The ledger endpoint could not be reached or answered malformed data.
    #[error("ledger {ledger} unavailable: {reason}")]
    LedgerUnavailable {
        /// Ledger identifier.
        ledger: String,
        /// Failure detail.
        reason: String,
    },

    /// The ledger answered but refused the transaction.
    #[error("anchor transaction failed on {ledger}: {reason}")]
    TransactionFailed {
        /// Ledger identifier.
        ledger: String,
        /// Failure detail.
        reason: String,
    },

    /// The submission did not complete within the configured bound.
    #[error("ledger {ledger} did not answer within {after_ms} ms")]
    Timeout {
        /// Ledger identifier.
        ledger: String,
        /// The bound that elapsed.
        after_ms: u64,
    },
}

/// What a ledger returns for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    /// Ledger identifier.
    pub ledger: String,
    /// Transaction hash or equivalent reference.
    pub transaction_id: String,
}

/// Proof-of-existence reference stored on a complaint record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorReference {
    /// Ledger identifier.
    pub ledger: String,
    /// Transaction hash or equivalent reference.
    pub transaction_id: String,
    /// When the ledger accepted the submission.
    pub anchored_at: DateTime<Utc>,
}

impl AnchorReference {
    /// Stamp a receipt with the current time.
    pub fn from_receipt(receipt: LedgerReceipt) -> Self {
        Self {
            ledger: receipt.ledger,
            transaction_id: receipt.transaction_id,
            anchored_at: Utc::now(),
        }
    }
}

/// An append-only ledger that accepts commitment digests.
#[async_trait]
pub trait LedgerClient: private::Sealed + Send + Sync + std::fmt::Debug {
    /// Record `commitment` on the ledger.
    async fn submit_commitment(
        &self,
        commitment: &ContentDigest,
    ) -> Result<LedgerReceipt, AnchorError>;

    /// Identifier of the ledger this client writes to.
    fn ledger_id(&self) -> &str;
}

mod private {
    pub trait Sealed {}
    impl Sealed for super::MockLedgerClient {}
    #[cfg(feature = "evm-anchor")]
    impl Sealed for super::EvmLedgerClient {}
}

// ─── Mock Ledger ────────────────────────────────────────────────────────

/// In-process ledger for development and tests.
///
/// Transaction ids are derived from the commitment, so the same digest
/// always yields the same id. Failure and latency can be scripted at run
/// time to exercise degraded anchoring.
///
/// Provides NO proof of existence. Never configure it in production.
#[derive(Debug, Default)]
pub struct MockLedgerClient {
    ledger: String,
    failing: AtomicBool,
    delay_ms: AtomicU64,
    submissions: AtomicU64,
}

impl MockLedgerClient {
    /// Create a mock ledger with the given identifier.
    pub fn new(ledger: impl Into<String>) -> Self {
        Self {
            ledger: ledger.into(),
            ..Self::default()
        }
    }

    /// Make subsequent submissions fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay every subsequent submission by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.delay_ms.store(ms, Ordering::SeqCst);
    }

    /// Number of submissions attempted so far, including failed ones.
    pub fn submissions(&self) -> u64 {
        self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn submit_commitment(
        &self,
        commitment: &ContentDigest,
    ) -> Result<LedgerReceipt, AnchorError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(AnchorError::LedgerUnavailable {
                ledger: self.ledger.clone(),
                reason: "mock ledger configured to fail".to_string(),
            });
        }

        let hex = commitment.to_hex();
        Ok(LedgerReceipt {
            ledger: self.ledger.clone(),
            transaction_id: format!("mock-tx-{}", hex.get(..16).unwrap_or("unknown")),
        })
    }

    fn ledger_id(&self) -> &str {
        &self.ledger
    }
}

// ─── EVM JSON-RPC Ledger ────────────────────────────────────────────────

#[cfg(feature = "evm-anchor")]
mod evm;

#[cfg(feature = "evm-anchor")]
pub use evm::{EvmLedgerClient, EvmLedgerConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{sha256_digest, CanonicalBytes};

    fn digest(label: &str) -> ContentDigest {
        sha256_digest(&CanonicalBytes::new(&serde_json::json!({ "label": label })).unwrap())
    }

    #[tokio::test]
    async fn mock_submission_succeeds() {
        let ledger = MockLedgerClient::new("mock-ledger");
        let receipt = ledger.submit_commitment(&digest("a")).await.unwrap();
        assert_eq!(receipt.ledger, "mock-ledger");
        assert!(receipt.transaction_id.starts_with("mock-tx-"));
        assert_eq!(ledger.submissions(), 1);
    }

    #[tokio::test]
    async fn mock_transaction_id_is_deterministic() {
        let ledger = MockLedgerClient::new("mock-ledger");
        let a = ledger.submit_commitment(&digest("a")).await.unwrap();
        let again = ledger.submit_commitment(&digest("a")).await.unwrap();
        let b = ledger.submit_commitment(&digest("b")).await.unwrap();
        assert_eq!(a.transaction_id, again.transaction_id);
        assert_ne!(a.transaction_id, b.transaction_id);
        assert_eq!(
            a.transaction_id,
            format!("mock-tx-{}", &digest("a").to_hex()[..16])
        );
    }

    #[tokio::test]
    async fn mock_failure_is_scriptable() {
        let ledger = MockLedgerClient::new("mock-ledger");
        ledger.set_failing(true);
        let err = ledger.submit_commitment(&digest("a")).await.unwrap_err();
        assert!(matches!(err, AnchorError::LedgerUnavailable { .. }));

        ledger.set_failing(false);
        assert!(ledger.submit_commitment(&digest("a")).await.is_ok());
        assert_eq!(ledger.submissions(), 2);
    }

    #[test]
    fn ledger_id() {
        assert_eq!(MockLedgerClient::new("sepolia").ledger_id(), "sepolia");
    }

    #[test]
    fn reference_from_receipt_keeps_ids() {
        let reference = AnchorReference::from_receipt(LedgerReceipt {
            ledger: "sepolia".into(),
            transaction_id: "0xabc".into(),
        });
        assert_eq!(reference.ledger, "sepolia");
        assert_eq!(reference.transaction_id, "0xabc");
    }

    #[test]
    fn anchor_error_display() {
        let err = AnchorError::Timeout {
            ledger: "sepolia".into(),
            after_ms: 5000,
        };
        assert_eq!(err.to_string(), "ledger sepolia did not answer within 5000 ms");

        let err = AnchorError::TransactionFailed {
            ledger: "sepolia".into(),
            reason: "insufficient funds".into(),
        };
        assert!(err.to_string().contains("insufficient funds"));
    }
}
