//! # Report Generator
//!
//! Read-only consumer building period-scoped aggregates from the record,
//! snapshot, and audit stores. An empty period is a valid report, never an
//! error.

use chrono::NaiveDate;
use ganacert_business::{
    collect_records, day_window, AuditTrailStore, BusinessResult, RecordFilter, RecordStore,
    SnapshotStore,
};
use ganacert_core::{
    BrandStatus, CertificationRecord, Department, DepartmentRow, KPISnapshot, PeriodTotals,
    ProducerDetail, ProducerRecordRow, ReportData, ReportType, Trend,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds [`ReportData`] for a period. Holds no state beyond the injected
/// stores.
pub struct ReportGenerator {
    records: Arc<dyn RecordStore>,
    snapshots: Arc<dyn SnapshotStore>,
    audit: Arc<dyn AuditTrailStore>,
}

impl ReportGenerator {
    pub fn new(
        records: Arc<dyn RecordStore>,
        snapshots: Arc<dyn SnapshotStore>,
        audit: Arc<dyn AuditTrailStore>,
    ) -> Self {
        Self {
            records,
            snapshots,
            audit,
        }
    }

    /// Generate the requested report over `[start, end]` (whole days,
    /// inclusive).
    pub async fn generate(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        report_type: ReportType,
    ) -> BusinessResult<ReportData> {
        let (window_start, _) = day_window(start);
        let (_, window_end) = day_window(end);

        let mut filter = RecordFilter::new().registered_between(window_start, window_end);
        if let ReportType::Producer { national_id } = &report_type {
            filter = filter.for_producer(national_id);
        }

        let records = collect_records(self.records.as_ref(), &filter).await?;
        let snapshots = self.snapshots.list_between(start, end).await?;

        if records.is_empty() && snapshots.is_empty() {
            tracing::debug!(%start, %end, kind = report_type.as_str(), "empty report period");
            return Ok(ReportData::empty(report_type, start, end));
        }

        let totals = period_totals(&records);
        let trend = compute_trend(&snapshots);

        let departments = match report_type {
            ReportType::DepartmentComparison => department_rows(&records),
            _ => Vec::new(),
        };

        let producer = match &report_type {
            ReportType::Producer { national_id } => {
                Some(self.producer_detail(national_id, &records).await?)
            }
            _ => None,
        };

        Ok(ReportData {
            report_type,
            start,
            end,
            empty: false,
            totals,
            trend,
            departments,
            producer,
            generated_at: chrono::Utc::now(),
        })
    }

    async fn producer_detail(
        &self,
        national_id: &str,
        records: &[CertificationRecord],
    ) -> BusinessResult<ProducerDetail> {
        let mut audit_entry_count = 0u64;
        for record in records {
            audit_entry_count += self.audit.list_for_record(&record.id).await?.len() as u64;
        }

        let rows = records
            .iter()
            .map(|record| ProducerRecordRow {
                record_id: record.id.clone(),
                brand_number: record.brand_number.clone(),
                status: record.status,
                head_count: record.head_count,
                department: record.department,
                registered_at: record.registered_at,
            })
            .collect();

        Ok(ProducerDetail {
            national_id: national_id.to_string(),
            owner_name: records
                .first()
                .map(|r| r.owner_name.clone())
                .unwrap_or_default(),
            records: rows,
            audit_entry_count,
        })
    }
}

fn period_totals(records: &[CertificationRecord]) -> PeriodTotals {
    let count_status = |status: BrandStatus| -> u64 {
        records.iter().filter(|r| r.status == status).count() as u64
    };

    let hours: Vec<i64> = records.iter().filter_map(|r| r.processing_hours).collect();
    let average_processing_hours = if hours.is_empty() {
        0.0
    } else {
        hours.iter().sum::<i64>() as f64 / hours.len() as f64
    };

    PeriodTotals {
        registered: records.len() as u64,
        approved: count_status(BrandStatus::Approved),
        rejected: count_status(BrandStatus::Rejected),
        pending: count_status(BrandStatus::Pending),
        total_head_count: records.iter().map(|r| r.head_count as u64).sum(),
        total_certification_amount: records
            .iter()
            .map(|r| r.certification_amount)
            .sum::<Decimal>(),
        average_processing_hours,
    }
}

/// Trend over the period: first vs last snapshot's registered count.
/// Needs at least two snapshots to say anything.
fn compute_trend(snapshots: &[KPISnapshot]) -> Option<Trend> {
    let (first, last) = match (snapshots.first(), snapshots.last()) {
        (Some(first), Some(last)) if snapshots.len() >= 2 => (first, last),
        _ => return None,
    };
    Some(match last.registered.cmp(&first.registered) {
        std::cmp::Ordering::Greater => Trend::Increasing,
        std::cmp::Ordering::Less => Trend::Decreasing,
        std::cmp::Ordering::Equal => Trend::Stable,
    })
}

fn department_rows(records: &[CertificationRecord]) -> Vec<DepartmentRow> {
    let mut grouped: BTreeMap<&'static str, (Department, Vec<&CertificationRecord>)> =
        BTreeMap::new();
    for record in records {
        grouped
            .entry(record.department.as_str())
            .or_insert_with(|| (record.department, Vec::new()))
            .1
            .push(record);
    }

    let mut rows: Vec<DepartmentRow> = grouped
        .into_values()
        .map(|(department, records)| {
            let approved = records
                .iter()
                .filter(|r| r.status == BrandStatus::Approved)
                .count() as u64;
            let rejected = records
                .iter()
                .filter(|r| r.status == BrandStatus::Rejected)
                .count() as u64;
            let decided = approved + rejected;
            DepartmentRow {
                department,
                registered: records.len() as u64,
                approved,
                rejected,
                head_count: records.iter().map(|r| r.head_count as u64).sum(),
                certification_amount: records
                    .iter()
                    .map(|r| r.certification_amount)
                    .sum::<Decimal>(),
                approval_rate: if decided == 0 {
                    0.0
                } else {
                    approved as f64 / decided as f64 * 100.0
                },
            }
        })
        .collect();

    // Busiest departments first; name breaks ties deterministically.
    rows.sort_by(|a, b| {
        b.registered
            .cmp(&a.registered)
            .then_with(|| a.department.as_str().cmp(b.department.as_str()))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use ganacert_business::{MemoryStore, SnapshotStore as _};
    use ganacert_core::{CattleBreed, CattlePurpose, DepartmentBreakdown, PurposeBreakdown};
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn at(d: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, hour, 0, 0).unwrap()
    }

    fn seeded(
        n: u64,
        national_id: &str,
        department: Department,
        status: BrandStatus,
        registered_at: DateTime<Utc>,
    ) -> CertificationRecord {
        let mut record = CertificationRecord::new(
            CertificationRecord::generate_id(n),
            format!("BR-{n:04}"),
            "Ana Quispe",
            national_id,
            CattleBreed::Brahman,
            CattlePurpose::Meat,
            10,
            department,
            "Warnes",
            dec!(100),
            registered_at,
        )
        .unwrap();
        record.status = status;
        if status.is_terminal() {
            record.processed_at = Some(registered_at + chrono::Duration::hours(12));
            record.processing_hours = Some(12);
        }
        record
    }

    fn snapshot(date: NaiveDate, registered: u64) -> KPISnapshot {
        KPISnapshot {
            date,
            registered,
            approved: 0,
            pending: registered,
            rejected: 0,
            approval_rate: 0.0,
            average_processing_hours: 0.0,
            total_head_count: 0,
            average_head_per_brand: 0.0,
            purposes: PurposeBreakdown {
                meat: registered,
                ..Default::default()
            },
            departments: DepartmentBreakdown {
                other: registered,
                ..Default::default()
            },
            logo_success_rate: 0.0,
            logo_count: 0,
            average_logo_generation_seconds: 0.0,
            computed_at: Utc::now(),
        }
    }

    fn generator(store: &Arc<MemoryStore>) -> ReportGenerator {
        ReportGenerator::new(store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_empty_period_never_raises() {
        let store = Arc::new(MemoryStore::new());
        let report = generator(&store)
            .generate(day(1), day(31), ReportType::PeriodSummary)
            .await
            .unwrap();

        assert!(report.empty);
        assert_eq!(report.totals.registered, 0);
        assert_eq!(report.totals.total_certification_amount, Decimal::ZERO);
        assert!(report.trend.is_none());
    }

    #[tokio::test]
    async fn test_period_summary_totals() {
        let store = Arc::new(MemoryStore::new());
        use ganacert_business::RecordStore as _;
        for (n, status) in [
            (1, BrandStatus::Approved),
            (2, BrandStatus::Rejected),
            (3, BrandStatus::Pending),
        ] {
            store
                .save(&seeded(n, "4455667", Department::SantaCruz, status, at(5, 9)))
                .await
                .unwrap();
        }
        // Outside the period; must not be counted.
        store
            .save(&seeded(
                4,
                "4455667",
                Department::SantaCruz,
                BrandStatus::Pending,
                at(20, 9),
            ))
            .await
            .unwrap();

        let report = generator(&store)
            .generate(day(1), day(10), ReportType::PeriodSummary)
            .await
            .unwrap();

        assert!(!report.empty);
        assert_eq!(report.totals.registered, 3);
        assert_eq!(report.totals.approved, 1);
        assert_eq!(report.totals.rejected, 1);
        assert_eq!(report.totals.pending, 1);
        assert_eq!(report.totals.total_head_count, 30);
        assert_eq!(report.totals.total_certification_amount, dec!(300));
        assert_eq!(report.totals.average_processing_hours, 12.0);
    }

    #[tokio::test]
    async fn test_trend_from_snapshots() {
        let store = Arc::new(MemoryStore::new());
        store.upsert(&snapshot(day(1), 5)).await.unwrap();
        store.upsert(&snapshot(day(2), 9)).await.unwrap();

        let generator = generator(&store);
        let report = generator
            .generate(day(1), day(2), ReportType::PeriodSummary)
            .await
            .unwrap();
        assert_eq!(report.trend, Some(Trend::Increasing));

        store.upsert(&snapshot(day(3), 2)).await.unwrap();
        let report = generator
            .generate(day(1), day(3), ReportType::PeriodSummary)
            .await
            .unwrap();
        assert_eq!(report.trend, Some(Trend::Decreasing));

        let report = generator
            .generate(day(3), day(3), ReportType::PeriodSummary)
            .await
            .unwrap();
        // A single snapshot says nothing about direction.
        assert!(report.trend.is_none());

        store.upsert(&snapshot(day(4), 2)).await.unwrap();
        let report = generator
            .generate(day(3), day(4), ReportType::PeriodSummary)
            .await
            .unwrap();
        assert_eq!(report.trend, Some(Trend::Stable));
    }

    #[tokio::test]
    async fn test_department_comparison() {
        let store = Arc::new(MemoryStore::new());
        use ganacert_business::RecordStore as _;
        for (n, department, status) in [
            (1, Department::Beni, BrandStatus::Approved),
            (2, Department::Beni, BrandStatus::Rejected),
            (3, Department::Beni, BrandStatus::Approved),
            (4, Department::LaPaz, BrandStatus::Pending),
        ] {
            store
                .save(&seeded(n, "4455667", department, status, at(5, 9)))
                .await
                .unwrap();
        }

        let report = generator(&store)
            .generate(day(1), day(10), ReportType::DepartmentComparison)
            .await
            .unwrap();

        assert_eq!(report.departments.len(), 2);
        let beni = &report.departments[0];
        assert_eq!(beni.department, Department::Beni);
        assert_eq!(beni.registered, 3);
        assert_eq!(beni.approved, 2);
        assert!((beni.approval_rate - 200.0 / 3.0).abs() < 1e-9);

        let la_paz = &report.departments[1];
        assert_eq!(la_paz.registered, 1);
        assert_eq!(la_paz.approval_rate, 0.0);

        let total_registered: u64 = report.departments.iter().map(|d| d.registered).sum();
        assert_eq!(total_registered, report.totals.registered);
    }

    #[tokio::test]
    async fn test_producer_report() {
        let store = Arc::new(MemoryStore::new());
        use ganacert_business::{AuditTrailStore as _, RecordStore as _};
        store
            .save(&seeded(
                1,
                "4455667",
                Department::SantaCruz,
                BrandStatus::Approved,
                at(5, 9),
            ))
            .await
            .unwrap();
        store
            .save(&seeded(
                2,
                "4455667",
                Department::Beni,
                BrandStatus::Pending,
                at(6, 9),
            ))
            .await
            .unwrap();
        // Someone else's record.
        store
            .save(&seeded(
                3,
                "9988776",
                Department::Beni,
                BrandStatus::Pending,
                at(6, 10),
            ))
            .await
            .unwrap();

        let entry = ganacert_core::AuditEntry::new(
            "MRC_0001",
            BrandStatus::Pending,
            BrandStatus::Approved,
            at(5, 21),
            "ana",
            None,
        )
        .unwrap();
        store.append(&entry).await.unwrap();

        let report = generator(&store)
            .generate(
                day(1),
                day(10),
                ReportType::Producer {
                    national_id: "4455667".to_string(),
                },
            )
            .await
            .unwrap();

        let producer = report.producer.unwrap();
        assert_eq!(producer.national_id, "4455667");
        assert_eq!(producer.owner_name, "Ana Quispe");
        assert_eq!(producer.records.len(), 2);
        assert_eq!(producer.audit_entry_count, 1);
        assert_eq!(report.totals.registered, 2);
    }
}
