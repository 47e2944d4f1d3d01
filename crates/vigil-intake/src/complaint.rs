//! # Complaint Types
//!
//! [`ComplaintContent`] is what a reporter discloses. [`ComplaintRecord`] is
//! what gets stored: sensitive text sealed, the PIN reduced to a digest, and
//! the commitment fixed at creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vigil_core::{ComplaintId, ContentDigest, ValidationError};
use vigil_crypto::{RetrievalPin, SealedField};
use vigil_ledger::{AnchorOutcome, AnchorReference};
use vigil_state::ComplaintStatus;

/// Maximum title length, in characters.
pub const MAX_TITLE_LEN: usize = 200;
/// Maximum category length, in characters.
pub const MAX_CATEGORY_LEN: usize = 64;
/// Maximum location length, in characters.
pub const MAX_LOCATION_LEN: usize = 200;
/// Maximum incident date length, in characters.
pub const MAX_DATE_LEN: usize = 64;
/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 10_000;

// ─── Disclosed Content ──────────────────────────────────────────────────

/// Complaint content as submitted.
///
/// `Debug` omits the free-text fields so content cannot leak into logs.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintContent {
    /// Short summary.
    pub title: String,
    /// Full account of the incident.
    pub description: String,
    /// Clear-text category used for triage.
    pub category: String,
    /// Where it happened.
    #[serde(default)]
    pub location: Option<String>,
    /// When it happened, free-form.
    #[serde(default)]
    pub date: Option<String>,
    /// Whether the reporter asked to stay anonymous.
    #[serde(default)]
    pub anonymous: bool,
}

impl ComplaintContent {
    /// Location, or `""` when absent.
    pub fn location_or_empty(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }

    /// Incident date, or `""` when absent.
    pub fn date_or_empty(&self) -> &str {
        self.date.as_deref().unwrap_or("")
    }

    /// Check required fields and length limits.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("category", &self.category)?;
        require("description", &self.description)?;

        limit("title", &self.title, MAX_TITLE_LEN)?;
        limit("category", &self.category, MAX_CATEGORY_LEN)?;
        limit("description", &self.description, MAX_DESCRIPTION_LEN)?;
        limit("location", self.location_or_empty(), MAX_LOCATION_LEN)?;
        limit("date", self.date_or_empty(), MAX_DATE_LEN)?;
        Ok(())
    }
}

impl std::fmt::Debug for ComplaintContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplaintContent")
            .field("category", &self.category)
            .field("anonymous", &self.anonymous)
            .finish_non_exhaustive()
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

fn limit(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

// ─── Stored Record ──────────────────────────────────────────────────────

/// A complaint as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub id: ComplaintId,
    pub title: SealedField,
    pub description: SealedField,
    pub location: SealedField,
    pub category: String,
    /// `""` when absent.
    pub incident_date: String,
    pub anonymous: bool,
    /// Commitment over the disclosed content, fixed at creation.
    pub commitment: ContentDigest,
    /// Ledger reference; set at most once.
    pub anchor: Option<AnchorReference>,
    /// SHA-256 hex of the retrieval PIN.
    pub pin_hash: String,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}

impl ComplaintRecord {
    /// Listing view.
    pub fn summary(&self) -> ComplaintSummary {
        ComplaintSummary {
            id: self.id,
            category: self.category.clone(),
            status: self.status,
            created_at: self.created_at,
            anchored: self.anchor.is_some(),
        }
    }
}

/// Listing view of a complaint; never carries content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintSummary {
    pub id: ComplaintId,
    pub category: String,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub anchored: bool,
}

// ─── Operation Results ──────────────────────────────────────────────────

/// Returned once from a successful submission.
///
/// The PIN is in plaintext here and nowhere else.
#[derive(Debug)]
pub struct SubmissionReceipt {
    pub id: ComplaintId,
    pub pin: RetrievalPin,
    pub commitment: ContentDigest,
    pub anchor: AnchorOutcome,
}

/// Result of recomputing a stored complaint's commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub id: ComplaintId,
    /// Commitment stored at creation.
    pub stored: ContentDigest,
    /// Commitment over the decrypted content as it reads now; `None` when
    /// the stored ciphertext no longer decrypts.
    pub recomputed: Option<ContentDigest>,
    pub intact: bool,
    pub anchor: Option<AnchorReference>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> ComplaintContent {
        ComplaintContent {
            title: "Bribery at office".into(),
            description: "Cash demanded for permit approval".into(),
            category: "corruption".into(),
            location: None,
            date: None,
            anonymous: true,
        }
    }

    #[test]
    fn valid_content_passes() {
        assert!(content().validate().is_ok());
    }

    #[test]
    fn blank_required_fields_rejected() {
        let mut c = content();
        c.title = "   ".into();
        assert_eq!(c.validate(), Err(ValidationError::MissingField("title")));

        let mut c = content();
        c.category.clear();
        assert_eq!(c.validate(), Err(ValidationError::MissingField("category")));

        let mut c = content();
        c.description.clear();
        assert_eq!(c.validate(), Err(ValidationError::MissingField("description")));
    }

    #[test]
    fn length_limits_count_characters() {
        let mut c = content();
        c.title = "é".repeat(MAX_TITLE_LEN);
        assert!(c.validate().is_ok());

        c.title.push('é');
        assert_eq!(
            c.validate(),
            Err(ValidationError::TooLong { field: "title", max: MAX_TITLE_LEN })
        );

        let mut c = content();
        c.location = Some("x".repeat(MAX_LOCATION_LEN + 1));
        assert!(matches!(
            c.validate(),
            Err(ValidationError::TooLong { field: "location", .. })
        ));

        let mut c = content();
        c.description = "x".repeat(MAX_DESCRIPTION_LEN + 1);
        assert!(c.validate().is_err());
    }

    #[test]
    fn optional_fields_default_when_missing() {
        let c: ComplaintContent = serde_json::from_str(
            r#"{"title":"t","description":"d","category":"c"}"#,
        )
        .unwrap();
        assert_eq!(c.location_or_empty(), "");
        assert_eq!(c.date_or_empty(), "");
        assert!(!c.anonymous);
    }

    #[test]
    fn debug_omits_free_text() {
        let dbg = format!("{:?}", content());
        assert!(dbg.contains("corruption"));
        assert!(!dbg.contains("Bribery"));
        assert!(!dbg.contains("Cash"));
    }
}
