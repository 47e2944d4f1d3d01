//! Complaint persistence on the `complaints` table.
//!
//! Every mutation is a single statement, so per-record atomicity comes from
//! Postgres. `update_status` compares the current status in its `WHERE`
//! clause and `set_anchor` only matches rows with `anchor_tx IS NULL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use vigil_core::{ComplaintId, ContentDigest};
use vigil_crypto::SealedField;
use vigil_intake::{ComplaintRecord, ComplaintStore, StoreError};
use vigil_ledger::AnchorReference;
use vigil_state::ComplaintStatus;

const COLUMNS: &str = "id, title, description, location, category, incident_date, anonymous,
     commitment, anchor_ledger, anchor_tx, anchored_at, pin_hash, status, created_at";

/// [`ComplaintStore`] backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgComplaintStore {
    pool: PgPool,
}

impl PgComplaintStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(&self, filter: &str) -> Result<Vec<ComplaintRecord>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM complaints {filter} ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ComplaintRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(ComplaintRow::into_record).collect()
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl ComplaintStore for PgComplaintStore {
    async fn create(&self, record: ComplaintRecord) -> Result<(), StoreError> {
        let (anchor_ledger, anchor_tx, anchored_at) = match &record.anchor {
            Some(a) => (
                Some(a.ledger.as_str()),
                Some(a.transaction_id.as_str()),
                Some(a.anchored_at),
            ),
            None => (None, None, None),
        };

        let result = sqlx::query(
            "INSERT INTO complaints (id, title, description, location, category, incident_date,
             anonymous, commitment, anchor_ledger, anchor_tx, anchored_at, pin_hash, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(record.id.as_uuid())
        .bind(record.title.as_str())
        .bind(record.description.as_str())
        .bind(record.location.as_str())
        .bind(&record.category)
        .bind(&record.incident_date)
        .bind(record.anonymous)
        .bind(record.commitment.to_hex())
        .bind(anchor_ledger)
        .bind(anchor_tx)
        .bind(anchored_at)
        .bind(&record.pin_hash)
        .bind(record.status.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate(record.id))
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn get(&self, id: ComplaintId) -> Result<Option<ComplaintRecord>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM complaints WHERE id = $1");
        let row = sqlx::query_as::<_, ComplaintRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.map(ComplaintRow::into_record).transpose()
    }

    async fn update_status(
        &self,
        id: ComplaintId,
        expected: ComplaintStatus,
        status: ComplaintStatus,
    ) -> Result<Option<ComplaintRecord>, StoreError> {
        let sql = format!(
            "UPDATE complaints SET status = $3 WHERE id = $1 AND status = $2 RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ComplaintRow>(&sql)
            .bind(id.as_uuid())
            .bind(expected.as_str())
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.map(ComplaintRow::into_record).transpose()
    }

    async fn set_anchor(
        &self,
        id: ComplaintId,
        anchor: AnchorReference,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE complaints SET anchor_ledger = $2, anchor_tx = $3, anchored_at = $4
             WHERE id = $1 AND anchor_tx IS NULL",
        )
        .bind(id.as_uuid())
        .bind(&anchor.ledger)
        .bind(&anchor.transaction_id)
        .bind(anchor.anchored_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_recent(&self) -> Result<Vec<ComplaintRecord>, StoreError> {
        self.fetch_many("").await
    }

    async fn list_unanchored(&self) -> Result<Vec<ComplaintRecord>, StoreError> {
        self.fetch_many("WHERE anchor_tx IS NULL").await
    }
}

/// Internal row type for SQLx mapping.
#[derive(Debug, sqlx::FromRow)]
struct ComplaintRow {
    id: Uuid,
    title: String,
    description: String,
    location: String,
    category: String,
    incident_date: String,
    anonymous: bool,
    commitment: String,
    anchor_ledger: Option<String>,
    anchor_tx: Option<String>,
    anchored_at: Option<DateTime<Utc>>,
    pin_hash: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl ComplaintRow {
    fn into_record(self) -> Result<ComplaintRecord, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            id: self.id.to_string(),
            reason,
        };

        let commitment = ContentDigest::from_hex(&self.commitment)
            .map_err(|e| corrupt(format!("commitment: {e}")))?;
        let status = ComplaintStatus::parse(&self.status)
            .map_err(|e| corrupt(format!("status: {e}")))?;
        let anchor = match (self.anchor_ledger, self.anchor_tx, self.anchored_at) {
            (Some(ledger), Some(transaction_id), Some(anchored_at)) => Some(AnchorReference {
                ledger,
                transaction_id,
                anchored_at,
            }),
            (None, None, None) => None,
            _ => return Err(corrupt("partial anchor reference".into())),
        };

        Ok(ComplaintRecord {
            id: ComplaintId::from_uuid(self.id),
            title: SealedField::from_stored(self.title),
            description: SealedField::from_stored(self.description),
            location: SealedField::from_stored(self.location),
            category: self.category,
            incident_date: self.incident_date,
            anonymous: self.anonymous,
            commitment,
            anchor,
            pin_hash: self.pin_hash,
            status,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ComplaintRow {
        ComplaintRow {
            id: Uuid::new_v4(),
            title: "c2VhbGVk".into(),
            description: "c2VhbGVk".into(),
            location: String::new(),
            category: "corruption".into(),
            incident_date: String::new(),
            anonymous: true,
            commitment: "ab".repeat(32),
            anchor_ledger: None,
            anchor_tx: None,
            anchored_at: None,
            pin_hash: "cd".repeat(32),
            status: "In Review".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_maps_to_record() {
        let r = row();
        let id = r.id;
        let record = r.into_record().unwrap();
        assert_eq!(*record.id.as_uuid(), id);
        assert_eq!(record.status, ComplaintStatus::InReview);
        assert_eq!(record.commitment.to_hex(), "ab".repeat(32));
        assert!(record.location.is_empty());
        assert!(record.anchor.is_none());
    }

    #[test]
    fn anchored_row_maps_reference() {
        let mut r = row();
        r.anchor_ledger = Some("polygon-amoy".into());
        r.anchor_tx = Some("0xfeed".into());
        r.anchored_at = Some(Utc::now());
        let anchor = r.into_record().unwrap().anchor.unwrap();
        assert_eq!(anchor.ledger, "polygon-amoy");
        assert_eq!(anchor.transaction_id, "0xfeed");
    }

    #[test]
    fn corrupt_rows_rejected() {
        let mut r = row();
        r.status = "Deleted".into();
        assert!(matches!(r.into_record(), Err(StoreError::Corrupt { .. })));

        let mut r = row();
        r.commitment = "not-hex".into();
        assert!(matches!(r.into_record(), Err(StoreError::Corrupt { .. })));

        let mut r = row();
        r.anchor_tx = Some("0xfeed".into());
        assert!(matches!(r.into_record(), Err(StoreError::Corrupt { .. })));
    }
}
