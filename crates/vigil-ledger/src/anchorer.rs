//! # Anchorer
//!
//! Bounded, policy-aware anchoring. The anchorer never returns an error:
//! every ledger failure or timeout becomes [`AnchorOutcome::Unavailable`],
//! and the caller decides from [`AnchorPolicy`] whether that blocks intake.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use vigil_core::ContentDigest;

use crate::anchor::{AnchorError, AnchorReference, LedgerClient};

/// Default bound on a single ledger submission.
pub const DEFAULT_ANCHOR_TIMEOUT: Duration = Duration::from_secs(5);

/// Whether anchoring runs, and whether its failure blocks intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPolicy {
    /// Never contact the ledger.
    Disabled,
    /// Anchor when possible; an unavailable ledger degrades to an unanchored record.
    #[default]
    BestEffort,
    /// An unavailable ledger rejects the submission.
    Required,
}

impl AnchorPolicy {
    /// Configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::BestEffort => "best_effort",
            Self::Required => "required",
        }
    }
}

impl std::fmt::Display for AnchorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnchorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" => Ok(Self::Disabled),
            "best_effort" | "best-effort" => Ok(Self::BestEffort),
            "required" => Ok(Self::Required),
            other => Err(format!(
                "unknown anchor policy {other:?}: expected disabled, best_effort or required"
            )),
        }
    }
}

/// Result of one anchoring attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnchorOutcome {
    /// The ledger accepted the commitment.
    Anchored(AnchorReference),
    /// No attempt was made.
    Skipped,
    /// The attempt failed or timed out.
    Unavailable {
        /// Failure detail, for operators.
        reason: String,
    },
}

impl AnchorOutcome {
    /// Short label used in responses, logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Anchored(_) => "anchored",
            Self::Skipped => "skipped",
            Self::Unavailable { .. } => "unavailable",
        }
    }

    /// The ledger reference, when anchored.
    pub fn reference(&self) -> Option<&AnchorReference> {
        match self {
            Self::Anchored(reference) => Some(reference),
            _ => None,
        }
    }
}

/// A ledger client with a timeout and a policy.
#[derive(Debug, Clone)]
pub struct Anchorer {
    client: Option<Arc<dyn LedgerClient>>,
    policy: AnchorPolicy,
    timeout: Duration,
}

impl Anchorer {
    /// Anchor through `client` under `policy`, bounding each call by `timeout`.
    pub fn new(client: Arc<dyn LedgerClient>, policy: AnchorPolicy, timeout: Duration) -> Self {
        Self {
            client: Some(client),
            policy,
            timeout,
        }
    }

    /// An anchorer that never contacts a ledger.
    pub fn disabled() -> Self {
        Self {
            client: None,
            policy: AnchorPolicy::Disabled,
            timeout: DEFAULT_ANCHOR_TIMEOUT,
        }
    }

    /// The configured policy.
    pub fn policy(&self) -> AnchorPolicy {
        self.policy
    }

    /// Whether an `Unavailable` outcome must reject the caller's operation.
    pub fn is_required(&self) -> bool {
        self.policy == AnchorPolicy::Required
    }

    /// Identifier of the configured ledger, if any.
    pub fn ledger_id(&self) -> Option<&str> {
        self.client.as_deref().map(|c| c.ledger_id())
    }

    /// Submit `commitment` and classify the result.
    pub async fn anchor(&self, commitment: &ContentDigest) -> AnchorOutcome {
        let client = match (&self.client, self.policy) {
            (Some(client), AnchorPolicy::BestEffort | AnchorPolicy::Required) => client,
            _ => return AnchorOutcome::Skipped,
        };

        let result = tokio::time::timeout(self.timeout, client.submit_commitment(commitment))
            .await
            .unwrap_or_else(|_| {
                Err(AnchorError::Timeout {
                    ledger: client.ledger_id().to_string(),
                    after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                })
            });

        match result {
            Ok(receipt) => {
                tracing::info!(
                    ledger = %receipt.ledger,
                    tx = %receipt.transaction_id,
                    commitment = %commitment,
                    "commitment anchored"
                );
                AnchorOutcome::Anchored(AnchorReference::from_receipt(receipt))
            }
            Err(e) => {
                tracing::warn!(
                    ledger = %client.ledger_id(),
                    commitment = %commitment,
                    error = %e,
                    "commitment anchoring unavailable"
                );
                AnchorOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}
