//! Database schema definitions
//!
//! Row types for sqlx mapping from SQLite tables, plus the embedded
//! schema executed by `Database::init`. Decimals are stored as TEXT,
//! enums as their canonical string codes.

use crate::error::{PersistenceError, PersistenceResult};
use chrono::{DateTime, NaiveDate, Utc};
use ganacert_core::{
    AiModel, AuditEntry, BrandStatus, CattleBreed, CattlePurpose, CertificationRecord,
    Department, DepartmentBreakdown, KPISnapshot, LogoRecord, PurposeBreakdown,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Embedded schema; executed as one batch on init.
pub const SCHEMA_SQL: &str = r#"
-- Certification records
CREATE TABLE IF NOT EXISTS records (
    id TEXT PRIMARY KEY,
    brand_number TEXT NOT NULL UNIQUE,
    owner_name TEXT NOT NULL,
    national_id TEXT NOT NULL,
    phone TEXT,
    breed TEXT NOT NULL,
    purpose TEXT NOT NULL,
    head_count INTEGER NOT NULL,
    department TEXT NOT NULL,
    municipality TEXT NOT NULL,
    community TEXT,
    certification_amount TEXT NOT NULL DEFAULT '0',
    status TEXT NOT NULL DEFAULT 'PENDING',
    registered_at TEXT NOT NULL,
    processed_at TEXT,
    processing_hours INTEGER,
    notes TEXT,
    created_by TEXT,
    updated_at TEXT,
    version INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_records_status ON records(status);
CREATE INDEX IF NOT EXISTS idx_records_registered_at ON records(registered_at);
CREATE INDEX IF NOT EXISTS idx_records_national_id ON records(national_id);

-- Append-only audit trail of status changes
CREATE TABLE IF NOT EXISTS audit_trail (
    id TEXT PRIMARY KEY,
    record_id TEXT NOT NULL,
    previous_status TEXT NOT NULL,
    new_status TEXT NOT NULL,
    changed_at TEXT NOT NULL,
    actor TEXT NOT NULL,
    notes TEXT,
    FOREIGN KEY (record_id) REFERENCES records(id)
);

CREATE INDEX IF NOT EXISTS idx_audit_record ON audit_trail(record_id);
CREATE INDEX IF NOT EXISTS idx_audit_changed_at ON audit_trail(changed_at);
CREATE INDEX IF NOT EXISTS idx_audit_actor ON audit_trail(actor);

-- Daily KPI snapshots, one row per date
CREATE TABLE IF NOT EXISTS kpi_snapshots (
    date TEXT PRIMARY KEY,
    registered INTEGER NOT NULL,
    approved INTEGER NOT NULL,
    pending INTEGER NOT NULL,
    rejected INTEGER NOT NULL,
    approval_rate REAL NOT NULL,
    average_processing_hours REAL NOT NULL,
    total_head_count INTEGER NOT NULL,
    average_head_per_brand REAL NOT NULL,
    purpose_meat INTEGER NOT NULL,
    purpose_dairy INTEGER NOT NULL,
    purpose_dual INTEGER NOT NULL,
    purpose_breeding INTEGER NOT NULL,
    dept_santa_cruz INTEGER NOT NULL,
    dept_beni INTEGER NOT NULL,
    dept_la_paz INTEGER NOT NULL,
    dept_other INTEGER NOT NULL,
    logo_success_rate REAL NOT NULL,
    logo_count INTEGER NOT NULL,
    average_logo_generation_seconds REAL NOT NULL,
    computed_at TEXT NOT NULL
);

-- Logo generation attempts (outcomes only; generation is external)
CREATE TABLE IF NOT EXISTS logos (
    id TEXT PRIMARY KEY,
    record_id TEXT NOT NULL,
    url TEXT NOT NULL,
    success INTEGER NOT NULL,
    generation_seconds INTEGER NOT NULL,
    model TEXT NOT NULL,
    generated_at TEXT NOT NULL,
    FOREIGN KEY (record_id) REFERENCES records(id)
);

CREATE INDEX IF NOT EXISTS idx_logos_generated_at ON logos(generated_at);
"#;

/// Row type for the `records` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct RecordRow {
    pub id: String,
    pub brand_number: String,
    pub owner_name: String,
    pub national_id: String,
    pub phone: Option<String>,
    pub breed: String,
    pub purpose: String,
    pub head_count: i64,
    pub department: String,
    pub municipality: String,
    pub community: Option<String>,
    pub certification_amount: String, // Decimal stored as TEXT
    pub status: String,
    pub registered_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processing_hours: Option<i64>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i64,
}

impl RecordRow {
    pub fn into_record(self) -> PersistenceResult<CertificationRecord> {
        Ok(CertificationRecord {
            id: self.id,
            brand_number: self.brand_number,
            owner_name: self.owner_name,
            national_id: self.national_id,
            phone: self.phone,
            breed: CattleBreed::parse(&self.breed)
                .ok_or_else(|| PersistenceError::invalid_enum("breed", &self.breed))?,
            purpose: CattlePurpose::parse(&self.purpose)
                .ok_or_else(|| PersistenceError::invalid_enum("purpose", &self.purpose))?,
            head_count: self.head_count as u32,
            department: Department::parse(&self.department)
                .ok_or_else(|| PersistenceError::invalid_enum("department", &self.department))?,
            municipality: self.municipality,
            community: self.community,
            certification_amount: Decimal::from_str(&self.certification_amount)
                .map_err(|e| PersistenceError::InvalidDecimal(e.to_string()))?,
            status: BrandStatus::parse(&self.status)
                .ok_or_else(|| PersistenceError::invalid_enum("status", &self.status))?,
            registered_at: self.registered_at,
            processed_at: self.processed_at,
            processing_hours: self.processing_hours,
            notes: self.notes,
            created_by: self.created_by,
            updated_at: self.updated_at,
            version: self.version,
        })
    }
}

/// Row type for the `audit_trail` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AuditRow {
    pub id: String,
    pub record_id: String,
    pub previous_status: String,
    pub new_status: String,
    pub changed_at: DateTime<Utc>,
    pub actor: String,
    pub notes: Option<String>,
}

impl AuditRow {
    pub fn into_entry(self) -> PersistenceResult<AuditEntry> {
        Ok(AuditEntry {
            id: self.id,
            record_id: self.record_id,
            previous_status: BrandStatus::parse(&self.previous_status).ok_or_else(|| {
                PersistenceError::invalid_enum("previous_status", &self.previous_status)
            })?,
            new_status: BrandStatus::parse(&self.new_status)
                .ok_or_else(|| PersistenceError::invalid_enum("new_status", &self.new_status))?,
            changed_at: self.changed_at,
            actor: self.actor,
            notes: self.notes,
        })
    }
}

/// Row type for the `kpi_snapshots` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub date: NaiveDate,
    pub registered: i64,
    pub approved: i64,
    pub pending: i64,
    pub rejected: i64,
    pub approval_rate: f64,
    pub average_processing_hours: f64,
    pub total_head_count: i64,
    pub average_head_per_brand: f64,
    pub purpose_meat: i64,
    pub purpose_dairy: i64,
    pub purpose_dual: i64,
    pub purpose_breeding: i64,
    pub dept_santa_cruz: i64,
    pub dept_beni: i64,
    pub dept_la_paz: i64,
    pub dept_other: i64,
    pub logo_success_rate: f64,
    pub logo_count: i64,
    pub average_logo_generation_seconds: f64,
    pub computed_at: DateTime<Utc>,
}

impl SnapshotRow {
    pub fn into_snapshot(self) -> KPISnapshot {
        KPISnapshot {
            date: self.date,
            registered: self.registered as u64,
            approved: self.approved as u64,
            pending: self.pending as u64,
            rejected: self.rejected as u64,
            approval_rate: self.approval_rate,
            average_processing_hours: self.average_processing_hours,
            total_head_count: self.total_head_count as u64,
            average_head_per_brand: self.average_head_per_brand,
            purposes: PurposeBreakdown {
                meat: self.purpose_meat as u64,
                dairy: self.purpose_dairy as u64,
                dual_purpose: self.purpose_dual as u64,
                breeding: self.purpose_breeding as u64,
            },
            departments: DepartmentBreakdown {
                santa_cruz: self.dept_santa_cruz as u64,
                beni: self.dept_beni as u64,
                la_paz: self.dept_la_paz as u64,
                other: self.dept_other as u64,
            },
            logo_success_rate: self.logo_success_rate,
            logo_count: self.logo_count as u64,
            average_logo_generation_seconds: self.average_logo_generation_seconds,
            computed_at: self.computed_at,
        }
    }
}

/// Row type for the `logos` table
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LogoRow {
    pub id: String,
    pub record_id: String,
    pub url: String,
    pub success: bool,
    pub generation_seconds: i64,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

impl LogoRow {
    pub fn into_logo(self) -> PersistenceResult<LogoRecord> {
        Ok(LogoRecord {
            id: self.id,
            record_id: self.record_id,
            url: self.url,
            success: self.success,
            generation_seconds: self.generation_seconds,
            model: AiModel::parse(&self.model)
                .ok_or_else(|| PersistenceError::invalid_enum("model", &self.model))?,
            generated_at: self.generated_at,
        })
    }
}
