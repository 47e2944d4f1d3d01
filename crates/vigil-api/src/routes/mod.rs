//! # API Route Modules
//!
//! - `complaints`: reporter-facing submission and PIN tracking. No
//!   authentication; the PIN is the only credential.
//! - `admin`: listing, status changes, anchor reconciliation, and
//!   integrity checks. Mounted behind the admin auth middleware.
//!
//! Response DTOs shared by both live here.

pub mod admin;
pub mod complaints;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use vigil_intake::ComplaintSummary;
use vigil_ledger::{AnchorOutcome, AnchorReference};

/// Where a commitment was recorded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnchorReferenceBody {
    /// Ledger name, e.g. `"polygon-amoy"` or `"mock-ledger"`.
    pub ledger: String,
    pub transaction_id: String,
    pub anchored_at: DateTime<Utc>,
}

impl From<&AnchorReference> for AnchorReferenceBody {
    fn from(r: &AnchorReference) -> Self {
        Self {
            ledger: r.ledger.clone(),
            transaction_id: r.transaction_id.clone(),
            anchored_at: r.anchored_at,
        }
    }
}

/// Result of an anchoring attempt.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnchorOutcomeBody {
    /// `"anchored"`, `"skipped"`, or `"unavailable"`.
    pub anchor_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_reference: Option<AnchorReferenceBody>,
}

impl From<&AnchorOutcome> for AnchorOutcomeBody {
    fn from(outcome: &AnchorOutcome) -> Self {
        Self {
            anchor_status: outcome.label().to_string(),
            anchor_reference: outcome.reference().map(AnchorReferenceBody::from),
        }
    }
}

/// A complaint in an admin listing. Carries no content.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComplaintSummaryBody {
    pub id: uuid::Uuid,
    pub category: String,
    /// `"Open"`, `"In Review"`, or `"Resolved"`.
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub anchored: bool,
}

impl From<ComplaintSummary> for ComplaintSummaryBody {
    fn from(s: ComplaintSummary) -> Self {
        Self {
            id: *s.id.as_uuid(),
            category: s.category,
            status: s.status.to_string(),
            created_at: s.created_at,
            anchored: s.anchored,
        }
    }
}
