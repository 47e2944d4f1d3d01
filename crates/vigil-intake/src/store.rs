//! # Complaint Store
//!
//! The persistence seam. Records are created whole and afterwards only two
//! things may change: `status`, and `anchor` exactly once.
//!
//! Each method is atomic per record. [`InMemoryComplaintStore`] applies every
//! mutation under a single `parking_lot` write lock that is never held
//! across an `.await`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

use vigil_core::ComplaintId;
use vigil_ledger::AnchorReference;
use vigil_state::ComplaintStatus;

use crate::complaint::ComplaintRecord;

/// Storage backend failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A record with this id already exists.
    #[error("complaint {0} already exists")]
    Duplicate(ComplaintId),

    /// The backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored row could not be mapped back to a record.
    #[error("corrupt stored record {id}: {reason}")]
    Corrupt {
        /// The affected record.
        id: String,
        /// What was wrong.
        reason: String,
    },
}

/// Document store for complaint records.
#[async_trait]
pub trait ComplaintStore: Send + Sync {
    /// Persist a new record.
    async fn create(&self, record: ComplaintRecord) -> Result<(), StoreError>;

    /// Fetch a record by id.
    async fn get(&self, id: ComplaintId) -> Result<Option<ComplaintRecord>, StoreError>;

    /// Set the status of `id` to `status` if it is currently `expected`.
    /// Returns the updated record, or `None` if the record does not exist or
    /// its status is no longer `expected`.
    async fn update_status(
        &self,
        id: ComplaintId,
        expected: ComplaintStatus,
        status: ComplaintStatus,
    ) -> Result<Option<ComplaintRecord>, StoreError>;

    /// Set the anchor if none is set. Returns `true` if this call set it.
    async fn set_anchor(
        &self,
        id: ComplaintId,
        anchor: AnchorReference,
    ) -> Result<bool, StoreError>;

    /// All records, newest first.
    async fn list_recent(&self) -> Result<Vec<ComplaintRecord>, StoreError>;

    /// Records without an anchor, newest first.
    async fn list_unanchored(&self) -> Result<Vec<ComplaintRecord>, StoreError>;
}

// ─── In-Memory Store ────────────────────────────────────────────────────

/// Thread-safe, cloneable in-memory store for development and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryComplaintStore {
    data: Arc<RwLock<HashMap<ComplaintId, ComplaintRecord>>>,
}

impl InMemoryComplaintStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mutate a stored record directly, bypassing the write rules.
    #[cfg(test)]
    pub(crate) fn tamper(&self, id: ComplaintId, f: impl FnOnce(&mut ComplaintRecord)) -> bool {
        self.data.write().get_mut(&id).map(f).is_some()
    }

    fn sorted(mut records: Vec<ComplaintRecord>) -> Vec<ComplaintRecord> {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        records
    }
}

#[async_trait]
impl ComplaintStore for InMemoryComplaintStore {
    async fn create(&self, record: ComplaintRecord) -> Result<(), StoreError> {
        let mut guard = self.data.write();
        if guard.contains_key(&record.id) {
            return Err(StoreError::Duplicate(record.id));
        }
        guard.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: ComplaintId) -> Result<Option<ComplaintRecord>, StoreError> {
        Ok(self.data.read().get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: ComplaintId,
        expected: ComplaintStatus,
        status: ComplaintStatus,
    ) -> Result<Option<ComplaintRecord>, StoreError> {
        let mut guard = self.data.write();
        match guard.get_mut(&id) {
            Some(record) if record.status == expected => {
                record.status = status;
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn set_anchor(
        &self,
        id: ComplaintId,
        anchor: AnchorReference,
    ) -> Result<bool, StoreError> {
        let mut guard = self.data.write();
        match guard.get_mut(&id) {
            Some(record) if record.anchor.is_none() => {
                record.anchor = Some(anchor);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_recent(&self) -> Result<Vec<ComplaintRecord>, StoreError> {
        let records = self.data.read().values().cloned().collect();
        Ok(Self::sorted(records))
    }

    async fn list_unanchored(&self) -> Result<Vec<ComplaintRecord>, StoreError> {
        let records = self
            .data
            .read()
            .values()
            .filter(|r| r.anchor.is_none())
            .cloned()
            .collect();
        Ok(Self::sorted(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use vigil_core::ContentDigest;
    use vigil_crypto::SealedField;

    fn record(age_secs: i64) -> ComplaintRecord {
        ComplaintRecord {
            id: ComplaintId::new(),
            title: SealedField::from_stored("sealed-title".into()),
            description: SealedField::from_stored("sealed-description".into()),
            location: SealedField::empty(),
            category: "corruption".into(),
            incident_date: String::new(),
            anonymous: true,
            commitment: ContentDigest::from_bytes([7; 32]),
            anchor: None,
            pin_hash: "0".repeat(64),
            status: ComplaintStatus::Open,
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    fn reference(tx: &str) -> AnchorReference {
        AnchorReference {
            ledger: "mock-ledger".into(),
            transaction_id: tx.into(),
            anchored_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_and_get() {
        let store = InMemoryComplaintStore::new();
        let r = record(0);
        store.create(r.clone()).await.unwrap();
        assert_eq!(store.get(r.id).await.unwrap(), Some(r));
        assert_eq!(store.get(ComplaintId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_create_rejected() {
        let store = InMemoryComplaintStore::new();
        let r = record(0);
        store.create(r.clone()).await.unwrap();
        assert!(matches!(
            store.create(r).await,
            Err(StoreError::Duplicate(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_status_touches_only_status() {
        let store = InMemoryComplaintStore::new();
        let r = record(0);
        store.create(r.clone()).await.unwrap();

        let updated = store
            .update_status(r.id, ComplaintStatus::Open, ComplaintStatus::InReview)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, ComplaintStatus::InReview);
        assert_eq!(updated.commitment, r.commitment);
        assert_eq!(updated.title, r.title);

        assert!(store
            .update_status(ComplaintId::new(), ComplaintStatus::Open, ComplaintStatus::Resolved)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_status_is_compare_and_set() {
        let store = InMemoryComplaintStore::new();
        let r = record(0);
        store.create(r.clone()).await.unwrap();

        let stale = store
            .update_status(r.id, ComplaintStatus::InReview, ComplaintStatus::Resolved)
            .await
            .unwrap();
        assert!(stale.is_none());
        assert_eq!(
            store.get(r.id).await.unwrap().unwrap().status,
            ComplaintStatus::Open
        );
    }

    #[tokio::test]
    async fn anchor_is_write_once() {
        let store = InMemoryComplaintStore::new();
        let r = record(0);
        store.create(r.clone()).await.unwrap();

        assert!(store.set_anchor(r.id, reference("0x01")).await.unwrap());
        assert!(!store.set_anchor(r.id, reference("0x02")).await.unwrap());

        let stored = store.get(r.id).await.unwrap().unwrap();
        assert_eq!(stored.anchor.unwrap().transaction_id, "0x01");
        assert!(!store.set_anchor(ComplaintId::new(), reference("0x03")).await.unwrap());
    }

    #[tokio::test]
    async fn listings_are_newest_first() {
        let store = InMemoryComplaintStore::new();
        let old = record(300);
        let mid = record(200);
        let new = record(100);
        for r in [mid.clone(), new.clone(), old.clone()] {
            store.create(r).await.unwrap();
        }
        store.set_anchor(mid.id, reference("0x01")).await.unwrap();

        let ids: Vec<_> = store.list_recent().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![new.id, mid.id, old.id]);

        let ids: Vec<_> = store
            .list_unanchored()
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![new.id, old.id]);
    }
}
