//! # Metrics Aggregator
//!
//! Derives daily KPI snapshots from the record population and the logo
//! provider. Runs as a batch/cron job concurrent with live traffic: the
//! scan takes no global lock, so a transition landing mid-scan may or may
//! not be reflected. That is accepted - snapshots are recomputed daily and
//! idempotently - but it is also why bucket sums are reconciled to the
//! registered total instead of trusted blindly.

use crate::cancel::CancelToken;
use crate::error::{BusinessError, BusinessResult};
use crate::stores::{collect_records, LogoStatsProvider, RecordFilter, RecordStore, SnapshotStore};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use ganacert_core::{
    BrandStatus, CattlePurpose, CertificationRecord, Department, DepartmentBreakdown, KPISnapshot,
    LogoStats, PurposeBreakdown,
};
use std::sync::Arc;

/// The 24h UTC window for a snapshot date: [midnight, next midnight).
pub fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Absorb any disagreement between a bucket sum and its expected total
/// into the largest bucket - the remainder is never dropped. A no-op when
/// the sum already matches.
fn reconcile_buckets(buckets: &mut [u64], total: u64) {
    let sum: u64 = buckets.iter().sum();
    if sum == total || buckets.is_empty() {
        return;
    }
    if sum < total {
        let idx = largest_bucket(buckets);
        buckets[idx] += total - sum;
        return;
    }
    let mut excess = sum - total;
    while excess > 0 {
        let idx = largest_bucket(buckets);
        let take = excess.min(buckets[idx]);
        if take == 0 {
            break;
        }
        buckets[idx] -= take;
        excess -= take;
    }
}

fn largest_bucket(buckets: &[u64]) -> usize {
    let mut idx = 0;
    for (i, value) in buckets.iter().enumerate() {
        if *value > buckets[idx] {
            idx = i;
        }
    }
    idx
}

/// Outcome of a ranged snapshot computation. Per-date failures are
/// collected, not fatal; `interrupted` marks an early cancel.
#[derive(Debug, Default)]
pub struct RangeOutcome {
    pub computed: Vec<NaiveDate>,
    pub failed: Vec<(NaiveDate, BusinessError)>,
    pub interrupted: bool,
}

/// Scans the record store and the logo provider to produce per-date
/// KPI snapshots. Holds no state beyond the injected stores.
pub struct MetricsAggregator {
    records: Arc<dyn RecordStore>,
    snapshots: Arc<dyn SnapshotStore>,
    logos: Arc<dyn LogoStatsProvider>,
}

impl MetricsAggregator {
    pub fn new(
        records: Arc<dyn RecordStore>,
        snapshots: Arc<dyn SnapshotStore>,
        logos: Arc<dyn LogoStatsProvider>,
    ) -> Self {
        Self {
            records,
            snapshots,
            logos,
        }
    }

    /// Compute the snapshot for one date and upsert it by date key.
    /// Re-running with unchanged data produces identical values and
    /// replaces the stored row rather than appending.
    pub async fn compute_snapshot(&self, date: NaiveDate) -> BusinessResult<KPISnapshot> {
        let (start, end) = day_window(date);

        let registered = collect_records(
            self.records.as_ref(),
            &RecordFilter::new().registered_between(start, end),
        )
        .await?;
        let processed = collect_records(
            self.records.as_ref(),
            &RecordFilter::new().processed_between(start, end),
        )
        .await?;
        let logo_stats = self.logos.stats_for_window(start, end).await?;

        let snapshot = build_snapshot(date, &registered, &processed, logo_stats);
        snapshot
            .validate()
            .map_err(|err| BusinessError::Aggregation {
                date,
                reason: err.to_string(),
            })?;

        self.snapshots.upsert(&snapshot).await?;
        tracing::debug!(%date, registered = snapshot.registered, "snapshot upserted");
        Ok(snapshot)
    }

    /// Compute snapshots for every date in `[start, end]`. Failures are
    /// logged and collected per date; an `Integrity` failure aborts, and
    /// cancellation between dates leaves committed snapshots in place.
    pub async fn compute_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        cancel: &CancelToken,
    ) -> BusinessResult<RangeOutcome> {
        let mut outcome = RangeOutcome::default();
        let mut date = start;
        while date <= end {
            if cancel.is_cancelled() {
                outcome.interrupted = true;
                break;
            }
            match self.compute_snapshot(date).await {
                Ok(_) => outcome.computed.push(date),
                Err(err @ BusinessError::Integrity(_)) => return Err(err),
                Err(err) => {
                    tracing::warn!(%date, error = %err, "snapshot computation failed");
                    outcome.failed.push((
                        date,
                        BusinessError::Aggregation {
                            date,
                            reason: err.to_string(),
                        },
                    ));
                }
            }
            date = date + Duration::days(1);
        }
        Ok(outcome)
    }
}

/// Pure rollup over the two scanned populations; everything here is
/// deterministic so recomputation is bit-identical given the same data.
fn build_snapshot(
    date: NaiveDate,
    registered: &[CertificationRecord],
    processed: &[CertificationRecord],
    logo_stats: LogoStats,
) -> KPISnapshot {
    let registered_count = registered.len() as u64;
    let approved = count_status(registered, BrandStatus::Approved);
    let pending = count_status(registered, BrandStatus::Pending);
    let rejected = count_status(registered, BrandStatus::Rejected);

    let decided = approved + rejected;
    let approval_rate = if decided == 0 {
        0.0
    } else {
        approved as f64 / decided as f64 * 100.0
    };

    let hours: Vec<i64> = processed
        .iter()
        .filter_map(|r| r.processing_hours)
        .collect();
    let average_processing_hours = if hours.is_empty() {
        0.0
    } else {
        hours.iter().sum::<i64>() as f64 / hours.len() as f64
    };

    let total_head_count: u64 = registered.iter().map(|r| r.head_count as u64).sum();
    let average_head_per_brand = if registered_count == 0 {
        0.0
    } else {
        total_head_count as f64 / registered_count as f64
    };

    let mut purpose_buckets = [0u64; 4];
    for record in registered {
        let idx = match record.purpose {
            CattlePurpose::Meat => 0,
            CattlePurpose::Dairy => 1,
            CattlePurpose::DualPurpose => 2,
            CattlePurpose::Breeding => 3,
        };
        purpose_buckets[idx] += 1;
    }
    reconcile_buckets(&mut purpose_buckets, registered_count);

    let mut department_buckets = [0u64; 4];
    for record in registered {
        let idx = match record.department {
            Department::SantaCruz => 0,
            Department::Beni => 1,
            Department::LaPaz => 2,
            _ => 3,
        };
        department_buckets[idx] += 1;
    }
    reconcile_buckets(&mut department_buckets, registered_count);

    KPISnapshot {
        date,
        registered: registered_count,
        approved,
        pending,
        rejected,
        approval_rate,
        average_processing_hours,
        total_head_count,
        average_head_per_brand,
        purposes: PurposeBreakdown {
            meat: purpose_buckets[0],
            dairy: purpose_buckets[1],
            dual_purpose: purpose_buckets[2],
            breeding: purpose_buckets[3],
        },
        departments: DepartmentBreakdown {
            santa_cruz: department_buckets[0],
            beni: department_buckets[1],
            la_paz: department_buckets[2],
            other: department_buckets[3],
        },
        logo_success_rate: logo_stats.success_rate(),
        logo_count: logo_stats.total,
        average_logo_generation_seconds: logo_stats.average_generation_seconds,
        computed_at: Utc::now(),
    }
}

fn count_status(records: &[CertificationRecord], status: BrandStatus) -> u64 {
    records.iter().filter(|r| r.status == status).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use chrono::TimeZone;
    use ganacert_core::{AiModel, CattleBreed, LogoRecord};
    use rust_decimal_macros::dec;

    const DAY: u32 = 15;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, DAY).unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, DAY, hour, 0, 0).unwrap()
    }

    fn seeded_record(
        n: u64,
        purpose: CattlePurpose,
        department: Department,
        head: u32,
        registered_at: DateTime<Utc>,
    ) -> CertificationRecord {
        CertificationRecord::new(
            CertificationRecord::generate_id(n),
            format!("BR-{n}"),
            "Ana Quispe",
            "4455667",
            CattleBreed::Nelore,
            purpose,
            head,
            department,
            "Warnes",
            dec!(350),
            registered_at,
        )
        .unwrap()
    }

    async fn seed(store: &MemoryStore) {
        use crate::stores::RecordStore;
        // Three registered on the day: one approved, one rejected, one pending.
        let mut approved = seeded_record(1, CattlePurpose::Meat, Department::SantaCruz, 30, at(8));
        approved.status = BrandStatus::Approved;
        approved.processed_at = Some(at(14));
        approved.processing_hours = Some(6);

        let mut rejected = seeded_record(2, CattlePurpose::Meat, Department::Beni, 10, at(9));
        rejected.status = BrandStatus::Rejected;
        rejected.processed_at = Some(at(13));
        rejected.processing_hours = Some(4);

        let pending = seeded_record(3, CattlePurpose::Dairy, Department::Pando, 20, at(10));

        // Registered the day before, processed on the day: only counts for
        // the processing-hours average.
        let mut earlier =
            seeded_record(4, CattlePurpose::Breeding, Department::LaPaz, 5, at(8) - Duration::days(1));
        earlier.status = BrandStatus::Approved;
        earlier.processed_at = Some(at(11));
        earlier.processing_hours = Some(26);

        for record in [&approved, &rejected, &pending, &earlier] {
            store.save(record).await.unwrap();
        }
    }

    fn aggregator(store: Arc<MemoryStore>) -> MetricsAggregator {
        MetricsAggregator::new(store.clone(), store.clone(), store)
    }

    #[test]
    fn test_day_window() {
        let (start, end) = day_window(date());
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, DAY, 0, 0, 0).unwrap());
        assert_eq!(end - start, Duration::days(1));
    }

    #[test]
    fn test_reconcile_noop_when_sums_match() {
        let mut buckets = [3, 2, 1, 0];
        reconcile_buckets(&mut buckets, 6);
        assert_eq!(buckets, [3, 2, 1, 0]);
    }

    #[test]
    fn test_reconcile_absorbs_deficit_into_largest() {
        let mut buckets = [3, 2, 1, 0];
        reconcile_buckets(&mut buckets, 8);
        assert_eq!(buckets, [5, 2, 1, 0]);
    }

    #[test]
    fn test_reconcile_drains_overshoot_from_largest() {
        let mut buckets = [3, 2, 1, 0];
        reconcile_buckets(&mut buckets, 4);
        assert_eq!(buckets, [1, 2, 1, 0]);

        // Overshoot larger than the biggest bucket drains across buckets.
        let mut buckets = [3, 2, 1, 0];
        reconcile_buckets(&mut buckets, 1);
        assert_eq!(buckets.iter().sum::<u64>(), 1);
    }

    #[tokio::test]
    async fn test_compute_snapshot_counts() {
        let store = Arc::new(MemoryStore::new());
        seed(&store).await;

        let snapshot = aggregator(store).compute_snapshot(date()).await.unwrap();

        assert_eq!(snapshot.registered, 3);
        assert_eq!(snapshot.approved, 1);
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.pending, 1);
        assert_eq!(snapshot.approval_rate, 50.0);

        // 6, 4, and 26 hours were completed inside the window.
        assert_eq!(snapshot.average_processing_hours, 12.0);

        assert_eq!(snapshot.total_head_count, 60);
        assert_eq!(snapshot.average_head_per_brand, 20.0);

        assert_eq!(snapshot.purposes.meat, 2);
        assert_eq!(snapshot.purposes.dairy, 1);
        assert_eq!(snapshot.purposes.total(), snapshot.registered);

        assert_eq!(snapshot.departments.santa_cruz, 1);
        assert_eq!(snapshot.departments.beni, 1);
        assert_eq!(snapshot.departments.other, 1);
        assert_eq!(snapshot.departments.total(), snapshot.registered);
    }

    #[tokio::test]
    async fn test_zero_decided_means_zero_rate() {
        let store = Arc::new(MemoryStore::new());
        use crate::stores::RecordStore;
        store
            .save(&seeded_record(1, CattlePurpose::Meat, Department::Oruro, 3, at(9)))
            .await
            .unwrap();

        let snapshot = aggregator(store).compute_snapshot(date()).await.unwrap();
        assert_eq!(snapshot.approval_rate, 0.0);
        assert_eq!(snapshot.average_processing_hours, 0.0);
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        seed(&store).await;
        let aggregator = aggregator(store.clone());

        let first = aggregator.compute_snapshot(date()).await.unwrap();
        let second = aggregator.compute_snapshot(date()).await.unwrap();

        // Identical values apart from the computation timestamp, and still
        // a single stored row for the date.
        let mut comparable = second.clone();
        comparable.computed_at = first.computed_at;
        assert_eq!(first, comparable);

        use crate::stores::SnapshotStore;
        let stored = store.list_between(date(), date()).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_logo_stats_flow_into_snapshot() {
        let store = Arc::new(MemoryStore::new());
        seed(&store).await;
        for (n, success, secs) in [(1, true, 10), (2, true, 14), (3, false, 30)] {
            store.push_logo(LogoRecord {
                id: format!("LOGO_{n:03}"),
                record_id: CertificationRecord::generate_id(n),
                url: "https://cdn.example/logo.png".to_string(),
                success,
                generation_seconds: secs,
                model: AiModel::DallE3,
                generated_at: at(12),
            });
        }

        let snapshot = aggregator(store).compute_snapshot(date()).await.unwrap();
        assert_eq!(snapshot.logo_count, 3);
        assert!((snapshot.logo_success_rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(snapshot.average_logo_generation_seconds, 18.0);
    }

    #[tokio::test]
    async fn test_compute_range_continues_past_empty_days() {
        let store = Arc::new(MemoryStore::new());
        seed(&store).await;
        let aggregator = aggregator(store);

        let outcome = aggregator
            .compute_range(
                date() - Duration::days(1),
                date() + Duration::days(1),
                &CancelToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.computed.len(), 3);
        assert!(outcome.failed.is_empty());
        assert!(!outcome.interrupted);
    }

    #[tokio::test]
    async fn test_compute_range_honors_cancellation() {
        let store = Arc::new(MemoryStore::new());
        seed(&store).await;
        let aggregator = aggregator(store);

        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = aggregator
            .compute_range(date(), date() + Duration::days(5), &cancel)
            .await
            .unwrap();

        assert!(outcome.interrupted);
        assert!(outcome.computed.is_empty());
    }
}
