//! SQLite implementations of the store interfaces.
//!
//! One `SqliteStore` over a connection pool implements every trait the
//! engines consume. `TransitionUnit::commit` wraps the guarded record
//! update and the audit append in a single transaction, so the optimistic
//! version check and the append-only trail cannot diverge.

use crate::error::{backend, PersistenceError};
use crate::sqlite::schema::{AuditRow, LogoRow, RecordRow, SnapshotRow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ganacert_business::{
    AuditTrailStore, DailyCount, LogoStatsProvider, RecordFilter, RecordStore, SnapshotStore,
    StoreError, StoreResult, TransitionUnit,
};
use ganacert_core::{AuditEntry, CertificationRecord, KPISnapshot, LogoRecord, LogoStats};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;

/// All store interfaces over one SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Seed a logo-generation outcome. Fails when the record is unknown,
    /// like the audit append.
    pub async fn insert_logo(&self, logo: &LogoRecord) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await.map_err(backend)?;
        record_must_exist(&mut conn, &logo.record_id, &logo.id).await?;
        sqlx::query(
            r#"
            INSERT INTO logos (id, record_id, url, success, generation_seconds, model, generated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&logo.id)
        .bind(&logo.record_id)
        .bind(&logo.url)
        .bind(logo.success)
        .bind(logo.generation_seconds)
        .bind(logo.model.as_str())
        .bind(logo.generated_at)
        .execute(&mut *conn)
        .await
        .map_err(backend)?;
        Ok(())
    }

    /// List logo rows for a record, newest first.
    pub async fn list_logos(&self, record_id: &str) -> StoreResult<Vec<LogoRecord>> {
        let rows = sqlx::query_as::<_, LogoRow>(
            "SELECT * FROM logos WHERE record_id = ? ORDER BY generated_at DESC",
        )
        .bind(record_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.into_iter()
            .map(|row| row.into_logo().map_err(StoreError::from))
            .collect()
    }
}

/// Append the WHERE clause for a record filter.
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &RecordFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(department) = filter.department {
        qb.push(" AND department = ").push_bind(department.as_str());
    }
    if let Some(purpose) = filter.purpose {
        qb.push(" AND purpose = ").push_bind(purpose.as_str());
    }
    if let Some(national_id) = filter.national_id.clone() {
        qb.push(" AND national_id = ").push_bind(national_id);
    }
    if let Some(from) = filter.registered_from {
        qb.push(" AND registered_at >= ").push_bind(from);
    }
    if let Some(to) = filter.registered_to {
        qb.push(" AND registered_at < ").push_bind(to);
    }
    if let Some(from) = filter.processed_from {
        qb.push(" AND processed_at IS NOT NULL AND processed_at >= ")
            .push_bind(from);
    }
    if let Some(to) = filter.processed_to {
        qb.push(" AND processed_at IS NOT NULL AND processed_at < ")
            .push_bind(to);
    }
}

/// Guarded update: bumps the stored version only when the caller's copy
/// is current. Returns affected rows; 0 means stale or missing.
async fn update_guarded(
    conn: &mut SqliteConnection,
    record: &CertificationRecord,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE records SET
            brand_number = ?, owner_name = ?, national_id = ?, phone = ?,
            breed = ?, purpose = ?, head_count = ?, department = ?,
            municipality = ?, community = ?, certification_amount = ?,
            status = ?, processed_at = ?, processing_hours = ?, notes = ?,
            created_by = ?, updated_at = ?, version = version + 1
        WHERE id = ? AND version = ?
        "#,
    )
    .bind(&record.brand_number)
    .bind(&record.owner_name)
    .bind(&record.national_id)
    .bind(&record.phone)
    .bind(record.breed.as_str())
    .bind(record.purpose.as_str())
    .bind(record.head_count as i64)
    .bind(record.department.as_str())
    .bind(&record.municipality)
    .bind(&record.community)
    .bind(record.certification_amount.to_string())
    .bind(record.status.as_str())
    .bind(record.processed_at)
    .bind(record.processing_hours)
    .bind(&record.notes)
    .bind(&record.created_by)
    .bind(record.updated_at)
    .bind(&record.id)
    .bind(record.version)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

/// Distinguish a stale version from a missing record after a guarded
/// update touched nothing.
async fn version_check_failure(
    conn: &mut SqliteConnection,
    record: &CertificationRecord,
) -> StoreError {
    let found: Result<Option<(i64,)>, sqlx::Error> =
        sqlx::query_as("SELECT version FROM records WHERE id = ?")
            .bind(&record.id)
            .fetch_optional(&mut *conn)
            .await;
    match found {
        Ok(None) => StoreError::not_found("Record", &record.id),
        Ok(Some((found,))) => StoreError::StaleVersion {
            id: record.id.clone(),
            expected: record.version,
            found,
        },
        Err(err) => backend(err),
    }
}

/// Fail with ForeignKey when `record_id` does not exist.
async fn record_must_exist(
    conn: &mut SqliteConnection,
    record_id: &str,
    referrer: &str,
) -> StoreResult<()> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM records WHERE id = ?")
        .bind(record_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(backend)?;
    if exists.is_none() {
        return Err(StoreError::ForeignKey(format!(
            "{referrer} references missing record {record_id}"
        )));
    }
    Ok(())
}

async fn insert_audit(conn: &mut SqliteConnection, entry: &AuditEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO audit_trail (id, record_id, previous_status, new_status, changed_at, actor, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.record_id)
    .bind(entry.previous_status.as_str())
    .bind(entry.new_status.as_str())
    .bind(entry.changed_at)
    .bind(&entry.actor)
    .bind(&entry.notes)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get(&self, id: &str) -> StoreResult<CertificationRecord> {
        let row = sqlx::query_as::<_, RecordRow>("SELECT * FROM records WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .ok_or_else(|| StoreError::not_found("Record", id))?;
        Ok(row.into_record()?)
    }

    async fn get_by_brand_number(&self, brand_number: &str) -> StoreResult<CertificationRecord> {
        let row = sqlx::query_as::<_, RecordRow>("SELECT * FROM records WHERE brand_number = ?")
            .bind(brand_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .ok_or_else(|| StoreError::not_found("Record", brand_number))?;
        Ok(row.into_record()?)
    }

    async fn list(
        &self,
        filter: &RecordFilter,
        limit: u32,
        offset: u32,
    ) -> StoreResult<Vec<CertificationRecord>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM records");
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY id LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(offset as i64);

        let rows: Vec<RecordRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter()
            .map(|row| row.into_record().map_err(StoreError::from))
            .collect()
    }

    async fn save(&self, record: &CertificationRecord) -> StoreResult<()> {
        if record.version == 0 {
            let result = sqlx::query(
                r#"
                INSERT INTO records (
                    id, brand_number, owner_name, national_id, phone,
                    breed, purpose, head_count, department, municipality,
                    community, certification_amount, status, registered_at,
                    processed_at, processing_hours, notes, created_by,
                    updated_at, version
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)
                "#,
            )
            .bind(&record.id)
            .bind(&record.brand_number)
            .bind(&record.owner_name)
            .bind(&record.national_id)
            .bind(&record.phone)
            .bind(record.breed.as_str())
            .bind(record.purpose.as_str())
            .bind(record.head_count as i64)
            .bind(record.department.as_str())
            .bind(&record.municipality)
            .bind(&record.community)
            .bind(record.certification_amount.to_string())
            .bind(record.status.as_str())
            .bind(record.registered_at)
            .bind(record.processed_at)
            .bind(record.processing_hours)
            .bind(&record.notes)
            .bind(&record.created_by)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await;

            return match result {
                Ok(_) => Ok(()),
                Err(sqlx::Error::Database(db))
                    if db.kind() == sqlx::error::ErrorKind::UniqueViolation =>
                {
                    Err(StoreError::Duplicate {
                        entity: "record",
                        id: record.brand_number.clone(),
                    })
                }
                Err(err) => Err(backend(err)),
            };
        }

        let mut conn = self.pool.acquire().await.map_err(backend)?;
        let affected = update_guarded(&mut conn, record).await.map_err(backend)?;
        if affected == 0 {
            return Err(version_check_failure(&mut conn, record).await);
        }
        Ok(())
    }

    async fn count_by(&self, filter: &RecordFilter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM records");
        push_filter(&mut qb, filter);
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(count as u64)
    }
}

#[async_trait]
impl AuditTrailStore for SqliteStore {
    async fn append(&self, entry: &AuditEntry) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await.map_err(backend)?;
        record_must_exist(&mut conn, &entry.record_id, &entry.id).await?;
        insert_audit(&mut conn, entry).await.map_err(backend)?;
        Ok(())
    }

    async fn list_for_record(&self, record_id: &str) -> StoreResult<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            "SELECT * FROM audit_trail WHERE record_id = ? ORDER BY changed_at DESC",
        )
        .bind(record_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.into_iter()
            .map(|row| row.into_entry().map_err(StoreError::from))
            .collect()
    }

    async fn list_recent(&self, since: DateTime<Utc>) -> StoreResult<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            "SELECT * FROM audit_trail WHERE changed_at >= ? ORDER BY changed_at DESC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.into_iter()
            .map(|row| row.into_entry().map_err(StoreError::from))
            .collect()
    }

    async fn aggregate_by_actor(&self) -> StoreResult<HashMap<String, u64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT actor, COUNT(*) FROM audit_trail GROUP BY actor")
                .fetch_all(&self.pool)
                .await
                .map_err(backend)?;
        Ok(rows
            .into_iter()
            .map(|(actor, count)| (actor, count as u64))
            .collect())
    }

    async fn aggregate_by_day(&self, since: DateTime<Utc>) -> StoreResult<Vec<DailyCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT date(changed_at) AS day, COUNT(*) AS entries
            FROM audit_trail
            WHERE changed_at >= ?
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter()
            .map(|(day, count)| {
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .map_err(|_| StoreError::from(PersistenceError::InvalidDate(day)))?;
                Ok(DailyCount {
                    date,
                    count: count as u64,
                })
            })
            .collect()
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    async fn upsert(&self, snapshot: &KPISnapshot) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kpi_snapshots (
                date, registered, approved, pending, rejected,
                approval_rate, average_processing_hours,
                total_head_count, average_head_per_brand,
                purpose_meat, purpose_dairy, purpose_dual, purpose_breeding,
                dept_santa_cruz, dept_beni, dept_la_paz, dept_other,
                logo_success_rate, logo_count, average_logo_generation_seconds,
                computed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(date) DO UPDATE SET
                registered = excluded.registered,
                approved = excluded.approved,
                pending = excluded.pending,
                rejected = excluded.rejected,
                approval_rate = excluded.approval_rate,
                average_processing_hours = excluded.average_processing_hours,
                total_head_count = excluded.total_head_count,
                average_head_per_brand = excluded.average_head_per_brand,
                purpose_meat = excluded.purpose_meat,
                purpose_dairy = excluded.purpose_dairy,
                purpose_dual = excluded.purpose_dual,
                purpose_breeding = excluded.purpose_breeding,
                dept_santa_cruz = excluded.dept_santa_cruz,
                dept_beni = excluded.dept_beni,
                dept_la_paz = excluded.dept_la_paz,
                dept_other = excluded.dept_other,
                logo_success_rate = excluded.logo_success_rate,
                logo_count = excluded.logo_count,
                average_logo_generation_seconds = excluded.average_logo_generation_seconds,
                computed_at = excluded.computed_at
            "#,
        )
        .bind(snapshot.date)
        .bind(snapshot.registered as i64)
        .bind(snapshot.approved as i64)
        .bind(snapshot.pending as i64)
        .bind(snapshot.rejected as i64)
        .bind(snapshot.approval_rate)
        .bind(snapshot.average_processing_hours)
        .bind(snapshot.total_head_count as i64)
        .bind(snapshot.average_head_per_brand)
        .bind(snapshot.purposes.meat as i64)
        .bind(snapshot.purposes.dairy as i64)
        .bind(snapshot.purposes.dual_purpose as i64)
        .bind(snapshot.purposes.breeding as i64)
        .bind(snapshot.departments.santa_cruz as i64)
        .bind(snapshot.departments.beni as i64)
        .bind(snapshot.departments.la_paz as i64)
        .bind(snapshot.departments.other as i64)
        .bind(snapshot.logo_success_rate)
        .bind(snapshot.logo_count as i64)
        .bind(snapshot.average_logo_generation_seconds)
        .bind(snapshot.computed_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn get(&self, date: NaiveDate) -> StoreResult<Option<KPISnapshot>> {
        let row = sqlx::query_as::<_, SnapshotRow>("SELECT * FROM kpi_snapshots WHERE date = ?")
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        Ok(row.map(SnapshotRow::into_snapshot))
    }

    async fn latest(&self) -> StoreResult<Option<KPISnapshot>> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            "SELECT * FROM kpi_snapshots ORDER BY date DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(SnapshotRow::into_snapshot))
    }

    async fn list_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<KPISnapshot>> {
        let rows = sqlx::query_as::<_, SnapshotRow>(
            "SELECT * FROM kpi_snapshots WHERE date >= ? AND date <= ? ORDER BY date",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(SnapshotRow::into_snapshot).collect())
    }
}

#[async_trait]
impl LogoStatsProvider for SqliteStore {
    async fn stats_for_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<LogoStats> {
        let (total, successful, average): (i64, i64, Option<f64>) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(success), 0), AVG(generation_seconds)
            FROM logos
            WHERE generated_at >= ? AND generated_at < ?
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(LogoStats {
            total: total as u64,
            successful: successful as u64,
            average_generation_seconds: average.unwrap_or(0.0),
        })
    }
}

#[async_trait]
impl TransitionUnit for SqliteStore {
    async fn commit(&self, record: &CertificationRecord, entry: &AuditEntry) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let affected = update_guarded(&mut tx, record).await.map_err(backend)?;
        if affected == 0 {
            // Rolled back on drop; no partial audit entry survives.
            return Err(version_check_failure(&mut tx, record).await);
        }
        insert_audit(&mut tx, entry).await.map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(())
    }
}
