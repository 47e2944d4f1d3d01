//! # Complaint Status
//!
//! Wire names are human-readable (`"Open"`, `"In Review"`, `"Resolved"`)
//! because reporters see them verbatim on the track path.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vigil_core::ValidationError;

// ─── Status ──────────────────────────────────────────────────────────

/// The lifecycle state of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintStatus {
    /// Newly submitted, not yet picked up.
    #[serde(rename = "Open")]
    Open,
    /// An administrator is working on it.
    #[serde(rename = "In Review")]
    InReview,
    /// Closed out (terminal).
    #[serde(rename = "Resolved")]
    Resolved,
}

impl ComplaintStatus {
    /// Every state, in lifecycle order.
    pub const ALL: [ComplaintStatus; 3] = [Self::Open, Self::InReview, Self::Resolved];

    /// Parse a wire name. Exact match only; no case folding or trimming.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "Open" => Ok(Self::Open),
            "In Review" => Ok(Self::InReview),
            "Resolved" => Ok(Self::Resolved),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }

    /// The wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InReview => "In Review",
            Self::Resolved => "Resolved",
        }
    }

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ComplaintStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// A status change that the lifecycle forbids.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// The complaint is already in a terminal state.
    #[error("complaint is {from}; cannot move to {to}")]
    Terminal {
        /// Current state.
        from: ComplaintStatus,
        /// Attempted target state.
        to: ComplaintStatus,
    },
}

// ─── Transition ──────────────────────────────────────────────────────

/// Validate a move from `from` to `to` and return the resulting state.
///
/// Same-state moves are accepted as no-ops. Nothing may leave `Resolved`.
pub fn transition(
    from: ComplaintStatus,
    to: ComplaintStatus,
) -> Result<ComplaintStatus, StatusError> {
    if from == to {
        return Ok(to);
    }
    if from.is_terminal() {
        return Err(StatusError::Terminal { from, to });
    }
    Ok(to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wire_names() {
        assert_eq!(ComplaintStatus::parse("Open").unwrap(), ComplaintStatus::Open);
        assert_eq!(
            ComplaintStatus::parse("In Review").unwrap(),
            ComplaintStatus::InReview
        );
        assert_eq!(
            ComplaintStatus::parse("Resolved").unwrap(),
            ComplaintStatus::Resolved
        );
    }

    #[test]
    fn parse_rejects_unknown() {
        for bad in ["Deleted", "open", "InReview", " Open", ""] {
            assert_eq!(
                ComplaintStatus::parse(bad),
                Err(ValidationError::InvalidStatus(bad.to_string()))
            );
        }
    }

    #[test]
    fn display_matches_wire_name() {
        for status in ComplaintStatus::ALL {
            assert_eq!(ComplaintStatus::parse(&status.to_string()).unwrap(), status);
        }
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&ComplaintStatus::InReview).unwrap();
        assert_eq!(json, "\"In Review\"");
        let back: ComplaintStatus = serde_json::from_str("\"Resolved\"").unwrap();
        assert_eq!(back, ComplaintStatus::Resolved);
        assert!(serde_json::from_str::<ComplaintStatus>("\"Deleted\"").is_err());
    }

    #[test]
    fn forward_and_backward_moves_allowed() {
        use ComplaintStatus::*;
        assert_eq!(transition(Open, InReview), Ok(InReview));
        assert_eq!(transition(InReview, Resolved), Ok(Resolved));
        assert_eq!(transition(Open, Resolved), Ok(Resolved));
        assert_eq!(transition(InReview, Open), Ok(Open));
    }

    #[test]
    fn same_state_is_noop() {
        for status in ComplaintStatus::ALL {
            assert_eq!(transition(status, status), Ok(status));
        }
    }

    #[test]
    fn resolved_is_terminal() {
        use ComplaintStatus::*;
        for to in [Open, InReview] {
            let err = transition(Resolved, to).unwrap_err();
            assert_eq!(err, StatusError::Terminal { from: Resolved, to });
            assert!(err.to_string().contains("Resolved"));
        }
    }
}
