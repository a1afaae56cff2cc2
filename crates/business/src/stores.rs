//! # Store Interfaces
//!
//! Collaborator interfaces consumed by the engines. Implementations live
//! outside this crate (SQLite in `ganacert-persistence`, in-memory in
//! [`crate::memory`]); each component receives the stores it needs at
//! construction time.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ganacert_core::{AuditEntry, CertificationRecord, KPISnapshot, LogoStats};
use ganacert_core::{BrandStatus, CattlePurpose, Department};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Stale version for {id}: expected {expected}, found {found}")]
    StaleVersion {
        id: String,
        expected: i64,
        found: i64,
    },

    #[error("Duplicate {entity}: {id}")]
    Duplicate { entity: &'static str, id: String },

    #[error("Referential integrity violation: {0}")]
    ForeignKey(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Record query filter. Time windows are half-open: `from` inclusive,
/// `to` exclusive.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordFilter {
    pub status: Option<BrandStatus>,
    pub department: Option<Department>,
    pub purpose: Option<CattlePurpose>,
    pub national_id: Option<String>,
    pub registered_from: Option<DateTime<Utc>>,
    pub registered_to: Option<DateTime<Utc>>,
    pub processed_from: Option<DateTime<Utc>>,
    pub processed_to: Option<DateTime<Utc>>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: BrandStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn in_department(mut self, department: Department) -> Self {
        self.department = Some(department);
        self
    }

    pub fn with_purpose(mut self, purpose: CattlePurpose) -> Self {
        self.purpose = Some(purpose);
        self
    }

    pub fn for_producer(mut self, national_id: &str) -> Self {
        self.national_id = Some(national_id.to_string());
        self
    }

    pub fn registered_between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.registered_from = Some(from);
        self.registered_to = Some(to);
        self
    }

    pub fn processed_between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.processed_from = Some(from);
        self.processed_to = Some(to);
        self
    }

    /// Whether a record satisfies every set criterion.
    pub fn matches(&self, record: &CertificationRecord) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(department) = self.department {
            if record.department != department {
                return false;
            }
        }
        if let Some(purpose) = self.purpose {
            if record.purpose != purpose {
                return false;
            }
        }
        if let Some(national_id) = &self.national_id {
            if &record.national_id != national_id {
                return false;
            }
        }
        if let Some(from) = self.registered_from {
            if record.registered_at < from {
                return false;
            }
        }
        if let Some(to) = self.registered_to {
            if record.registered_at >= to {
                return false;
            }
        }
        if self.processed_from.is_some() || self.processed_to.is_some() {
            let Some(processed_at) = record.processed_at else {
                return false;
            };
            if let Some(from) = self.processed_from {
                if processed_at < from {
                    return false;
                }
            }
            if let Some(to) = self.processed_to {
                if processed_at >= to {
                    return false;
                }
            }
        }
        true
    }
}

/// Persistence seam for certification records. `save` creates records with
/// version 0 and updates saved ones under an optimistic version check; the
/// stored version is bumped on every write.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, id: &str) -> StoreResult<CertificationRecord>;

    async fn get_by_brand_number(&self, brand_number: &str) -> StoreResult<CertificationRecord>;

    /// List matching records ordered by id, page-sized.
    async fn list(
        &self,
        filter: &RecordFilter,
        limit: u32,
        offset: u32,
    ) -> StoreResult<Vec<CertificationRecord>>;

    async fn save(&self, record: &CertificationRecord) -> StoreResult<()>;

    async fn count_by(&self, filter: &RecordFilter) -> StoreResult<u64>;
}

/// Entries per day, from [`AuditTrailStore::aggregate_by_day`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Append-only store of status-change events. No update or delete is
/// exposed.
#[async_trait]
pub trait AuditTrailStore: Send + Sync {
    /// Append one entry; fails with [`StoreError::ForeignKey`] when the
    /// referenced record does not exist.
    async fn append(&self, entry: &AuditEntry) -> StoreResult<()>;

    /// Entries for one record, newest first.
    async fn list_for_record(&self, record_id: &str) -> StoreResult<Vec<AuditEntry>>;

    /// Entries at or after `since`, newest first.
    async fn list_recent(&self, since: DateTime<Utc>) -> StoreResult<Vec<AuditEntry>>;

    async fn aggregate_by_actor(&self) -> StoreResult<HashMap<String, u64>>;

    /// Daily entry counts at or after `since`, oldest first.
    async fn aggregate_by_day(&self, since: DateTime<Utc>) -> StoreResult<Vec<DailyCount>>;
}

/// KPI snapshot store keyed by date; upsert replaces, never appends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn upsert(&self, snapshot: &KPISnapshot) -> StoreResult<()>;

    async fn get(&self, date: NaiveDate) -> StoreResult<Option<KPISnapshot>>;

    async fn latest(&self) -> StoreResult<Option<KPISnapshot>>;

    /// Snapshots with `start <= date <= end`, oldest first.
    async fn list_between(&self, start: NaiveDate, end: NaiveDate)
        -> StoreResult<Vec<KPISnapshot>>;
}

/// Windowed statistics from the AI logo-generation subsystem, opaque to
/// this core.
#[async_trait]
pub trait LogoStatsProvider: Send + Sync {
    async fn stats_for_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<LogoStats>;
}

/// Atomic seam used by the transition engine: the record update (under its
/// version check) and the audit append land together or not at all.
#[async_trait]
pub trait TransitionUnit: Send + Sync {
    async fn commit(&self, record: &CertificationRecord, entry: &AuditEntry) -> StoreResult<()>;
}

/// Page size used when draining a filtered scan.
pub(crate) const SCAN_PAGE: u32 = 500;

/// Drain every record matching `filter`, paging through the store.
pub async fn collect_records(
    store: &dyn RecordStore,
    filter: &RecordFilter,
) -> StoreResult<Vec<CertificationRecord>> {
    let mut all = Vec::new();
    let mut offset = 0;
    loop {
        let page = store.list(filter, SCAN_PAGE, offset).await?;
        let short = (page.len() as u32) < SCAN_PAGE;
        offset += page.len() as u32;
        all.extend(page);
        if short {
            break;
        }
    }
    Ok(all)
}
