//! # In-Memory Stores
//!
//! Reference implementation of every store interface over a single mutex,
//! used by the engine tests and as executable documentation of the store
//! contracts. The production SQLite implementation lives in
//! `ganacert-persistence`.

use crate::stores::{
    AuditTrailStore, DailyCount, LogoStatsProvider, RecordFilter, RecordStore, SnapshotStore,
    StoreError, StoreResult, TransitionUnit,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ganacert_core::{AuditEntry, CertificationRecord, KPISnapshot, LogoRecord, LogoStats};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    records: HashMap<String, CertificationRecord>,
    brand_index: HashMap<String, String>,
    audits: Vec<AuditEntry>,
    snapshots: BTreeMap<NaiveDate, KPISnapshot>,
    logos: Vec<LogoRecord>,
}

impl Inner {
    fn check_version(&self, record: &CertificationRecord) -> StoreResult<()> {
        match self.records.get(&record.id) {
            None => Err(StoreError::not_found("Record", &record.id)),
            Some(existing) if existing.version != record.version => Err(StoreError::StaleVersion {
                id: record.id.clone(),
                expected: record.version,
                found: existing.version,
            }),
            Some(_) => Ok(()),
        }
    }

    fn store_record(&mut self, record: &CertificationRecord) {
        let mut stored = record.clone();
        stored.version = record.version + 1;
        self.brand_index
            .insert(stored.brand_number.clone(), stored.id.clone());
        self.records.insert(stored.id.clone(), stored);
    }
}

/// All store interfaces over one `Mutex<HashMap>` world. Holding the lock
/// across a record write and its audit append is what makes
/// [`TransitionUnit::commit`] atomic here.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a logo-generation attempt, for tests and demos.
    pub fn push_logo(&self, logo: LogoRecord) {
        self.inner.lock().expect("memory store lock").logos.push(logo);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store lock")
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, id: &str) -> StoreResult<CertificationRecord> {
        self.lock()
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Record", id))
    }

    async fn get_by_brand_number(&self, brand_number: &str) -> StoreResult<CertificationRecord> {
        let inner = self.lock();
        inner
            .brand_index
            .get(brand_number)
            .and_then(|id| inner.records.get(id))
            .cloned()
            .ok_or_else(|| StoreError::not_found("Record", brand_number))
    }

    async fn list(
        &self,
        filter: &RecordFilter,
        limit: u32,
        offset: u32,
    ) -> StoreResult<Vec<CertificationRecord>> {
        let inner = self.lock();
        let mut matched: Vec<CertificationRecord> = inner
            .records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matched
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn save(&self, record: &CertificationRecord) -> StoreResult<()> {
        let mut inner = self.lock();
        if inner.records.contains_key(&record.id) {
            inner.check_version(record)?;
        } else {
            // A nonzero version claims the record was saved before.
            if record.version != 0 {
                return Err(StoreError::not_found("Record", &record.id));
            }
            if let Some(owner) = inner.brand_index.get(&record.brand_number) {
                if owner != &record.id {
                    return Err(StoreError::Duplicate {
                        entity: "brand number",
                        id: record.brand_number.clone(),
                    });
                }
            }
        }
        inner.store_record(record);
        Ok(())
    }

    async fn count_by(&self, filter: &RecordFilter) -> StoreResult<u64> {
        let inner = self.lock();
        Ok(inner.records.values().filter(|r| filter.matches(r)).count() as u64)
    }
}

#[async_trait]
impl AuditTrailStore for MemoryStore {
    async fn append(&self, entry: &AuditEntry) -> StoreResult<()> {
        let mut inner = self.lock();
        if !inner.records.contains_key(&entry.record_id) {
            return Err(StoreError::ForeignKey(format!(
                "audit entry {} references missing record {}",
                entry.id, entry.record_id
            )));
        }
        inner.audits.push(entry.clone());
        Ok(())
    }

    async fn list_for_record(&self, record_id: &str) -> StoreResult<Vec<AuditEntry>> {
        let inner = self.lock();
        let mut entries: Vec<AuditEntry> = inner
            .audits
            .iter()
            .filter(|e| e.record_id == record_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
        Ok(entries)
    }

    async fn list_recent(&self, since: DateTime<Utc>) -> StoreResult<Vec<AuditEntry>> {
        let inner = self.lock();
        let mut entries: Vec<AuditEntry> = inner
            .audits
            .iter()
            .filter(|e| e.changed_at >= since)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
        Ok(entries)
    }

    async fn aggregate_by_actor(&self) -> StoreResult<HashMap<String, u64>> {
        let inner = self.lock();
        let mut counts = HashMap::new();
        for entry in &inner.audits {
            *counts.entry(entry.actor.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn aggregate_by_day(&self, since: DateTime<Utc>) -> StoreResult<Vec<DailyCount>> {
        let inner = self.lock();
        let mut by_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for entry in inner.audits.iter().filter(|e| e.changed_at >= since) {
            *by_day.entry(entry.changed_at.date_naive()).or_insert(0) += 1;
        }
        Ok(by_day
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect())
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn upsert(&self, snapshot: &KPISnapshot) -> StoreResult<()> {
        self.lock().snapshots.insert(snapshot.date, snapshot.clone());
        Ok(())
    }

    async fn get(&self, date: NaiveDate) -> StoreResult<Option<KPISnapshot>> {
        Ok(self.lock().snapshots.get(&date).cloned())
    }

    async fn latest(&self) -> StoreResult<Option<KPISnapshot>> {
        Ok(self
            .lock()
            .snapshots
            .last_key_value()
            .map(|(_, snapshot)| snapshot.clone()))
    }

    async fn list_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<KPISnapshot>> {
        Ok(self
            .lock()
            .snapshots
            .range(start..=end)
            .map(|(_, snapshot)| snapshot.clone())
            .collect())
    }
}

#[async_trait]
impl LogoStatsProvider for MemoryStore {
    async fn stats_for_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<LogoStats> {
        let inner = self.lock();
        let in_window: Vec<&LogoRecord> = inner
            .logos
            .iter()
            .filter(|l| l.generated_at >= start && l.generated_at < end)
            .collect();
        let total = in_window.len() as u64;
        let successful = in_window.iter().filter(|l| l.success).count() as u64;
        let average_generation_seconds = if total == 0 {
            0.0
        } else {
            in_window.iter().map(|l| l.generation_seconds as f64).sum::<f64>() / total as f64
        };
        Ok(LogoStats {
            total,
            successful,
            average_generation_seconds,
        })
    }
}

#[async_trait]
impl TransitionUnit for MemoryStore {
    async fn commit(&self, record: &CertificationRecord, entry: &AuditEntry) -> StoreResult<()> {
        let mut inner = self.lock();
        inner.check_version(record)?;
        if entry.record_id != record.id {
            return Err(StoreError::ForeignKey(format!(
                "audit entry {} does not reference record {}",
                entry.id, record.id
            )));
        }
        inner.store_record(record);
        inner.audits.push(entry.clone());
        Ok(())
    }
}

/// Provider returning the same stats for every window; for tests that
/// need logo figures without seeding logo rows.
pub struct StaticLogoStats(pub LogoStats);

#[async_trait]
impl LogoStatsProvider for StaticLogoStats {
    async fn stats_for_window(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> StoreResult<LogoStats> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ganacert_core::{BrandStatus, CattleBreed, CattlePurpose, Department};
    use rust_decimal_macros::dec;

    fn record(id: &str, brand: &str) -> CertificationRecord {
        CertificationRecord::new(
            id,
            brand,
            "Ana Quispe",
            "4455667",
            CattleBreed::Angus,
            CattlePurpose::Breeding,
            8,
            Department::Tarija,
            "Yacuiba",
            dec!(120),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_assigns_versions() {
        let store = MemoryStore::new();
        let r = record("MRC_0001", "BR-1");
        store.save(&r).await.unwrap();

        let stored = crate::RecordStore::get(&store, "MRC_0001").await.unwrap();
        assert_eq!(stored.version, 1);

        store.save(&stored).await.unwrap();
        assert_eq!(
            crate::RecordStore::get(&store, "MRC_0001")
                .await
                .unwrap()
                .version,
            2
        );
    }

    #[tokio::test]
    async fn test_stale_save_rejected() {
        let store = MemoryStore::new();
        let r = record("MRC_0001", "BR-1");
        store.save(&r).await.unwrap();

        // Version 0 copy is now stale.
        let err = store.save(&r).await.unwrap_err();
        assert!(matches!(err, StoreError::StaleVersion { found: 1, .. }));
    }

    #[tokio::test]
    async fn test_duplicate_brand_number_rejected() {
        let store = MemoryStore::new();
        store.save(&record("MRC_0001", "BR-1")).await.unwrap();

        let err = store.save(&record("MRC_0002", "BR-1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_get_by_brand_number() {
        let store = MemoryStore::new();
        store.save(&record("MRC_0001", "BR-1")).await.unwrap();

        assert_eq!(
            store.get_by_brand_number("BR-1").await.unwrap().id,
            "MRC_0001"
        );
        assert!(store.get_by_brand_number("BR-9").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_append_requires_existing_record() {
        let store = MemoryStore::new();
        let entry = AuditEntry::new(
            "MRC_0404",
            BrandStatus::Pending,
            BrandStatus::Approved,
            Utc::now(),
            "system",
            None,
        )
        .unwrap();

        let err = store.append(&entry).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey(_)));
    }

    #[tokio::test]
    async fn test_audit_aggregations() {
        let store = MemoryStore::new();
        store.save(&record("MRC_0001", "BR-1")).await.unwrap();

        let day1 = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2024, 3, 3, 10, 0, 0).unwrap();
        for (at, actor, from, to) in [
            (day1, "ana", BrandStatus::Pending, BrandStatus::InReview),
            (day2, "ana", BrandStatus::InReview, BrandStatus::Approved),
            (day2, "luis", BrandStatus::Pending, BrandStatus::Rejected),
        ] {
            let entry = AuditEntry::new("MRC_0001", from, to, at, actor, None).unwrap();
            store.append(&entry).await.unwrap();
        }

        let by_actor = store.aggregate_by_actor().await.unwrap();
        assert_eq!(by_actor["ana"], 2);
        assert_eq!(by_actor["luis"], 1);

        let by_day = store
            .aggregate_by_day(day1 - chrono::Duration::days(1))
            .await
            .unwrap();
        assert_eq!(by_day.len(), 2);
        assert_eq!(by_day[0].count, 1);
        assert_eq!(by_day[1].count, 2);

        let recent = store.list_recent(day2).await.unwrap();
        assert_eq!(recent.len(), 2);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let store = MemoryStore::new();
        for i in 1..=5 {
            store
                .save(&record(
                    &CertificationRecord::generate_id(i),
                    &format!("BR-{i}"),
                ))
                .await
                .unwrap();
        }

        let filter = RecordFilter::new();
        let page1 = store.list(&filter, 2, 0).await.unwrap();
        let page2 = store.list(&filter, 2, 2).await.unwrap();
        let page3 = store.list(&filter, 2, 4).await.unwrap();

        assert_eq!(page1.len(), 2);
        assert_eq!(page2.len(), 2);
        assert_eq!(page3.len(), 1);
        assert_eq!(page1[0].id, "MRC_0001");
        assert_eq!(page3[0].id, "MRC_0005");
        assert_eq!(store.count_by(&filter).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_snapshot_upsert_replaces() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut snapshot = empty_snapshot(date);
        store.upsert(&snapshot).await.unwrap();

        snapshot.registered = 7;
        snapshot.purposes.meat = 7;
        snapshot.departments.other = 7;
        store.upsert(&snapshot).await.unwrap();

        let stored = crate::SnapshotStore::get(&store, date)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.registered, 7);
        assert_eq!(store.list_between(date, date).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_latest_snapshot() {
        let store = MemoryStore::new();
        assert!(store.latest().await.unwrap().is_none());

        for day in [1, 3, 2] {
            let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
            store.upsert(&empty_snapshot(date)).await.unwrap();
        }
        assert_eq!(
            store.latest().await.unwrap().unwrap().date,
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()
        );
    }

    fn empty_snapshot(date: NaiveDate) -> KPISnapshot {
        KPISnapshot {
            date,
            registered: 0,
            approved: 0,
            pending: 0,
            rejected: 0,
            approval_rate: 0.0,
            average_processing_hours: 0.0,
            total_head_count: 0,
            average_head_per_brand: 0.0,
            purposes: Default::default(),
            departments: Default::default(),
            logo_success_rate: 0.0,
            logo_count: 0,
            average_logo_generation_seconds: 0.0,
            computed_at: Utc::now(),
        }
    }
}
