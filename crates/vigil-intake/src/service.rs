//! # Complaint Lifecycle Service
//!
//! Orchestrates intake, tracking and administration. All collaborators are
//! injected through [`ComplaintServiceBuilder`]; the service reads no
//! environment and holds no globals.
//!
//! ## Submission
//!
//! ```text
//! validate → commit → anchor (per policy) → PIN → seal fields → store
//! ```
//!
//! Nothing is stored until the commitment is fixed, and under
//! [`AnchorPolicy::Required`](vigil_ledger::AnchorPolicy::Required) nothing
//! is stored at all unless the ledger accepted it.
//!
//! ## Tracking
//!
//! A missing record and a wrong PIN are different errors here so they can be
//! counted, but both run one PIN verification so their latency matches.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use vigil_core::ComplaintId;
use vigil_crypto::{decrypt_field, encrypt_field, verify_pin, EncryptionKey, RetrievalPin};
use vigil_ledger::{AnchorOutcome, Anchorer};
use vigil_state::{transition, ComplaintStatus};

use crate::auth::AdminPrincipal;
use crate::commitment;
use crate::complaint::{
    ComplaintContent, ComplaintRecord, ComplaintSummary, IntegrityReport, SubmissionReceipt,
};
use crate::error::IntakeError;
use crate::store::{ComplaintStore, StoreError};

/// Digest compared against when the complaint does not exist (SHA-256 of "").
const DUMMY_PIN_HASH: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Attempts at a compare-and-set status update before giving up.
const STATUS_UPDATE_ATTEMPTS: usize = 3;

/// The complaint lifecycle manager.
pub struct ComplaintService {
    store: Arc<dyn ComplaintStore>,
    key: EncryptionKey,
    anchorer: Anchorer,
}

impl std::fmt::Debug for ComplaintService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplaintService")
            .field("key", &self.key)
            .field("anchorer", &self.anchorer)
            .finish_non_exhaustive()
    }
}

impl ComplaintService {
    /// Start building a service.
    pub fn builder() -> ComplaintServiceBuilder {
        ComplaintServiceBuilder::default()
    }

    /// The configured anchorer.
    pub fn anchorer(&self) -> &Anchorer {
        &self.anchorer
    }

    // ── Reporter operations ─────────────────────────────────────────────

    /// Accept a complaint. The returned receipt holds the only copy of the PIN.
    pub async fn submit(
        &self,
        content: ComplaintContent,
    ) -> Result<SubmissionReceipt, IntakeError> {
        content.validate()?;

        let commitment = commitment::commit(&content)?;

        let anchor = self.anchorer.anchor(&commitment).await;
        metrics::counter!("vigil_anchor_outcomes_total", "outcome" => anchor.label()).increment(1);
        if self.anchorer.is_required() {
            if let AnchorOutcome::Unavailable { reason } = &anchor {
                tracing::warn!(commitment = %commitment, "submission rejected: anchoring required");
                return Err(IntakeError::AnchorRequired(reason.clone()));
            }
        }

        let pin = RetrievalPin::generate();
        let record = ComplaintRecord {
            id: ComplaintId::new(),
            title: encrypt_field(&content.title, &self.key)?,
            description: encrypt_field(&content.description, &self.key)?,
            location: encrypt_field(content.location_or_empty(), &self.key)?,
            category: content.category.clone(),
            incident_date: content.date_or_empty().to_string(),
            anonymous: content.anonymous,
            commitment,
            anchor: anchor.reference().cloned(),
            pin_hash: pin.digest(),
            status: ComplaintStatus::Open,
            created_at: Utc::now(),
        };
        let id = record.id;

        self.store.create(record).await?;
        metrics::counter!("vigil_complaints_submitted_total").increment(1);
        tracing::info!(
            complaint_id = %id,
            commitment = %commitment,
            anchor = anchor.label(),
            "complaint submitted"
        );

        Ok(SubmissionReceipt {
            id,
            pin,
            commitment,
            anchor,
        })
    }

    /// Status of `id`, released only against the matching PIN.
    pub async fn track(&self, id: ComplaintId, pin: &str) -> Result<ComplaintStatus, IntakeError> {
        let Some(record) = self.store.get(id).await? else {
            std::hint::black_box(verify_pin(std::hint::black_box(pin), DUMMY_PIN_HASH));
            metrics::counter!("vigil_track_rejections_total").increment(1);
            tracing::debug!(complaint_id = %id, "track rejected: unknown complaint");
            return Err(IntakeError::NotFound(id));
        };

        if !verify_pin(pin, &record.pin_hash) {
            metrics::counter!("vigil_track_rejections_total").increment(1);
            tracing::debug!(complaint_id = %id, "track rejected: PIN mismatch");
            return Err(IntakeError::Unauthorized);
        }

        Ok(record.status)
    }

    // ── Administrative operations ───────────────────────────────────────

    /// Every complaint, newest first, without content.
    pub async fn admin_list(
        &self,
        principal: &AdminPrincipal,
    ) -> Result<Vec<ComplaintSummary>, IntakeError> {
        let records = self.store.list_recent().await?;
        tracing::debug!(admin = principal.subject(), count = records.len(), "complaints listed");
        Ok(records.iter().map(ComplaintRecord::summary).collect())
    }

    /// Move `id` to `new_status`.
    ///
    /// Unknown status strings are rejected before the store is touched.
    pub async fn admin_update_status(
        &self,
        principal: &AdminPrincipal,
        id: ComplaintId,
        new_status: &str,
    ) -> Result<ComplaintSummary, IntakeError> {
        let target = ComplaintStatus::parse(new_status)?;

        for _ in 0..STATUS_UPDATE_ATTEMPTS {
            let current = self
                .store
                .get(id)
                .await?
                .ok_or(IntakeError::NotFound(id))?
                .status;
            transition(current, target)?;

            if let Some(updated) = self.store.update_status(id, current, target).await? {
                tracing::info!(
                    complaint_id = %id,
                    from = %current,
                    to = %target,
                    admin = principal.subject(),
                    "complaint status updated"
                );
                return Ok(updated.summary());
            }
        }

        Err(StoreError::Backend(format!("status of {id} kept changing concurrently")).into())
    }

    /// Complaints whose commitment has not been anchored yet.
    pub async fn admin_list_unanchored(
        &self,
        principal: &AdminPrincipal,
    ) -> Result<Vec<ComplaintSummary>, IntakeError> {
        let records = self.store.list_unanchored().await?;
        tracing::debug!(
            admin = principal.subject(),
            count = records.len(),
            "unanchored complaints listed"
        );
        Ok(records.iter().map(ComplaintRecord::summary).collect())
    }

    /// Retry anchoring the stored commitment of `id`.
    ///
    /// An already-anchored record returns its reference without contacting
    /// the ledger.
    pub async fn reconcile_anchor(
        &self,
        principal: &AdminPrincipal,
        id: ComplaintId,
    ) -> Result<AnchorOutcome, IntakeError> {
        let record = self.store.get(id).await?.ok_or(IntakeError::NotFound(id))?;
        if let Some(existing) = record.anchor {
            return Ok(AnchorOutcome::Anchored(existing));
        }

        let outcome = self.anchorer.anchor(&record.commitment).await;
        metrics::counter!("vigil_anchor_outcomes_total", "outcome" => outcome.label()).increment(1);

        if let AnchorOutcome::Anchored(reference) = &outcome {
            if !self.store.set_anchor(id, reference.clone()).await? {
                // Lost a race with another reconciliation; report what is stored.
                if let Some(stored) = self.store.get(id).await?.and_then(|r| r.anchor) {
                    return Ok(AnchorOutcome::Anchored(stored));
                }
            }
        }

        tracing::info!(
            complaint_id = %id,
            outcome = outcome.label(),
            admin = principal.subject(),
            "anchor reconciliation"
        );
        Ok(outcome)
    }

    /// Recompute the commitment of `id` from its decrypted content.
    pub async fn verify_integrity(
        &self,
        principal: &AdminPrincipal,
        id: ComplaintId,
    ) -> Result<IntegrityReport, IntakeError> {
        let record = self.store.get(id).await?.ok_or(IntakeError::NotFound(id))?;

        let recomputed = match self.disclosed_content(&record) {
            Ok(content) => Some(commitment::commit(&content)?),
            Err(e) => {
                tracing::warn!(complaint_id = %id, error = %e, "stored content no longer decrypts");
                None
            }
        };
        let intact = recomputed == Some(record.commitment);
        if !intact {
            tracing::warn!(
                complaint_id = %id,
                admin = principal.subject(),
                "integrity check failed"
            );
        }

        Ok(IntegrityReport {
            id,
            stored: record.commitment,
            recomputed,
            intact,
            anchor: record.anchor,
        })
    }

    fn disclosed_content(
        &self,
        record: &ComplaintRecord,
    ) -> Result<ComplaintContent, vigil_crypto::CryptoError> {
        Ok(ComplaintContent {
            title: decrypt_field(&record.title, &self.key)?,
            description: decrypt_field(&record.description, &self.key)?,
            category: record.category.clone(),
            location: Some(decrypt_field(&record.location, &self.key)?),
            date: Some(record.incident_date.clone()),
            anonymous: record.anonymous,
        })
    }
}

// ─── Builder ────────────────────────────────────────────────────────────

/// A required collaborator was not supplied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceBuildError {
    #[error("complaint store not configured")]
    MissingStore,
    #[error("encryption key not configured")]
    MissingKey,
}

/// Builder for [`ComplaintService`]. Anchoring defaults to disabled.
#[derive(Default)]
pub struct ComplaintServiceBuilder {
    store: Option<Arc<dyn ComplaintStore>>,
    key: Option<EncryptionKey>,
    anchorer: Option<Anchorer>,
}

impl ComplaintServiceBuilder {
    pub fn store(mut self, store: Arc<dyn ComplaintStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn encryption_key(mut self, key: EncryptionKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn anchorer(mut self, anchorer: Anchorer) -> Self {
        self.anchorer = Some(anchorer);
        self
    }

    pub fn build(self) -> Result<ComplaintService, ServiceBuildError> {
        Ok(ComplaintService {
            store: self.store.ok_or(ServiceBuildError::MissingStore)?,
            key: self.key.ok_or(ServiceBuildError::MissingKey)?,
            anchorer: self.anchorer.unwrap_or_else(Anchorer::disabled),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use vigil_crypto::SealedField;
    use vigil_ledger::{AnchorPolicy, MockLedgerClient, DEFAULT_ANCHOR_TIMEOUT};

    use crate::store::InMemoryComplaintStore;

    fn admin() -> AdminPrincipal {
        AdminPrincipal::authenticated("admin")
    }

    fn bribery() -> ComplaintContent {
        ComplaintContent {
            title: "Bribery at office".into(),
            description: "Cash demanded for permit approval".into(),
            category: "corruption".into(),
            location: None,
            date: None,
            anonymous: true,
        }
    }

    fn service_with(
        store: InMemoryComplaintStore,
        ledger: Option<(Arc<MockLedgerClient>, AnchorPolicy)>,
    ) -> ComplaintService {
        let mut builder = ComplaintService::builder()
            .store(Arc::new(store))
            .encryption_key(EncryptionKey::generate());
        if let Some((client, policy)) = ledger {
            builder = builder.anchorer(Anchorer::new(client, policy, DEFAULT_ANCHOR_TIMEOUT));
        }
        builder.build().unwrap()
    }

    #[test]
    fn builder_requires_store_and_key() {
        let err = ComplaintService::builder()
            .encryption_key(EncryptionKey::generate())
            .build()
            .unwrap_err();
        assert_eq!(err, ServiceBuildError::MissingStore);

        let err = ComplaintService::builder()
            .store(Arc::new(InMemoryComplaintStore::new()))
            .build()
            .unwrap_err();
        assert_eq!(err, ServiceBuildError::MissingKey);
    }

    #[tokio::test]
    async fn submitted_record_is_sealed() {
        let store = InMemoryComplaintStore::new();
        let service = service_with(store.clone(), None);
        let receipt = service.submit(bribery()).await.unwrap();

        let record = store.get(receipt.id).await.unwrap().unwrap();
        assert_ne!(record.title.as_str(), "Bribery at office");
        assert!(!record.title.is_empty());
        assert_eq!(record.location, SealedField::empty());
        assert_eq!(record.category, "corruption");
        assert_eq!(record.status, ComplaintStatus::Open);
        assert_eq!(record.commitment, receipt.commitment);
        assert_ne!(record.pin_hash, receipt.pin.expose());
        assert_eq!(record.pin_hash, receipt.pin.digest());
    }

    #[tokio::test]
    async fn invalid_content_stores_nothing() {
        let store = InMemoryComplaintStore::new();
        let service = service_with(store.clone(), None);
        let mut content = bribery();
        content.description = "  ".into();
        assert!(matches!(
            service.submit(content).await,
            Err(IntakeError::Validation(_))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn track_requires_matching_pin() {
        let service = service_with(InMemoryComplaintStore::new(), None);
        let receipt = service.submit(bribery()).await.unwrap();

        assert_eq!(
            service.track(receipt.id, receipt.pin.expose()).await.unwrap(),
            ComplaintStatus::Open
        );
        assert!(matches!(
            service.track(receipt.id, "not-a-pin").await,
            Err(IntakeError::Unauthorized)
        ));
        assert!(matches!(
            service.track(ComplaintId::new(), receipt.pin.expose()).await,
            Err(IntakeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn status_update_and_terminal_state() {
        let service = service_with(InMemoryComplaintStore::new(), None);
        let receipt = service.submit(bribery()).await.unwrap();

        let summary = service
            .admin_update_status(&admin(), receipt.id, "In Review")
            .await
            .unwrap();
        assert_eq!(summary.status, ComplaintStatus::InReview);

        service
            .admin_update_status(&admin(), receipt.id, "Resolved")
            .await
            .unwrap();
        assert!(matches!(
            service.admin_update_status(&admin(), receipt.id, "Open").await,
            Err(IntakeError::InvalidTransition(_))
        ));
        assert_eq!(
            service.track(receipt.id, receipt.pin.expose()).await.unwrap(),
            ComplaintStatus::Resolved
        );
    }

    #[tokio::test]
    async fn unknown_status_leaves_record_unchanged() {
        let service = service_with(InMemoryComplaintStore::new(), None);
        let receipt = service.submit(bribery()).await.unwrap();

        let err = service
            .admin_update_status(&admin(), receipt.id, "Deleted")
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::Validation(_)));
        assert_eq!(
            service.track(receipt.id, receipt.pin.expose()).await.unwrap(),
            ComplaintStatus::Open
        );

        assert!(matches!(
            service.admin_update_status(&admin(), ComplaintId::new(), "Resolved").await,
            Err(IntakeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn reconciliation_anchors_once() {
        let ledger = Arc::new(MockLedgerClient::new("mock-ledger"));
        ledger.set_failing(true);
        let service = service_with(
            InMemoryComplaintStore::new(),
            Some((ledger.clone(), AnchorPolicy::BestEffort)),
        );

        let receipt = service.submit(bribery()).await.unwrap();
        assert!(matches!(receipt.anchor, AnchorOutcome::Unavailable { .. }));
        let unanchored = service.admin_list_unanchored(&admin()).await.unwrap();
        assert_eq!(unanchored.len(), 1);
        assert!(!unanchored[0].anchored);

        ledger.set_failing(false);
        let first = service.reconcile_anchor(&admin(), receipt.id).await.unwrap();
        assert!(first.reference().is_some());
        assert_eq!(ledger.submissions(), 2);

        let second = service.reconcile_anchor(&admin(), receipt.id).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(ledger.submissions(), 2);
        assert!(service.admin_list_unanchored(&admin()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn required_policy_timeout_rejects_submission() {
        let store = InMemoryComplaintStore::new();
        let ledger = Arc::new(MockLedgerClient::new("slow-ledger"));
        ledger.set_delay(Duration::from_secs(30));
        let service = ComplaintService::builder()
            .store(Arc::new(store.clone()))
            .encryption_key(EncryptionKey::generate())
            .anchorer(Anchorer::new(ledger, AnchorPolicy::Required, Duration::from_millis(20)))
            .build()
            .unwrap();

        assert!(matches!(
            service.submit(bribery()).await,
            Err(IntakeError::AnchorRequired(_))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn integrity_check_passes_for_untouched_record() {
        let service = service_with(InMemoryComplaintStore::new(), None);
        let receipt = service.submit(bribery()).await.unwrap();
        let report = service.verify_integrity(&admin(), receipt.id).await.unwrap();
        assert!(report.intact);
        assert_eq!(report.recomputed, Some(receipt.commitment));
    }

    #[tokio::test]
    async fn integrity_check_detects_tampering() {
        let store = InMemoryComplaintStore::new();
        let service = service_with(store.clone(), None);

        let a = service.submit(bribery()).await.unwrap();
        let mut other = bribery();
        other.title = "Something else".into();
        let b = service.submit(other).await.unwrap();

        // Swap in a validly sealed title from another record.
        let foreign_title = store.get(b.id).await.unwrap().unwrap().title;
        assert!(store.tamper(a.id, |r| r.title = foreign_title));
        let report = service.verify_integrity(&admin(), a.id).await.unwrap();
        assert!(!report.intact);
        assert!(report.recomputed.is_some());

        // Corrupt ciphertext outright.
        assert!(store.tamper(b.id, |r| {
            r.description = SealedField::from_stored("A".repeat(40))
        }));
        let report = service.verify_integrity(&admin(), b.id).await.unwrap();
        assert!(!report.intact);
        assert_eq!(report.recomputed, None);
    }
}
