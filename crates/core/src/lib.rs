//! # Ganacert Core
//!
//! Domain types for the cattle-brand certification system: certification
//! records and their review lifecycle, the immutable audit trail, daily
//! KPI snapshots, dashboard views, and report data.
//!
//! This crate holds entities and domain validation only. The engines that
//! mutate and aggregate them live in `ganacert-business`; storage lives in
//! `ganacert-persistence`.

pub mod audit;
pub mod dashboard;
pub mod error;
pub mod kpi;
pub mod logo;
pub mod record;
pub mod report;

pub use audit::AuditEntry;
pub use dashboard::{AlertSeverity, DashboardAlert, DashboardView, LiveCounts};
pub use error::{CoreError, CoreResult};
pub use kpi::{DepartmentBreakdown, KPISnapshot, PurposeBreakdown};
pub use logo::{AiModel, LogoRecord, LogoStats};
pub use record::{BrandStatus, CattleBreed, CattlePurpose, CertificationRecord, Department};
pub use report::{
    DepartmentRow, PeriodTotals, ProducerDetail, ProducerRecordRow, ReportData, ReportType, Trend,
};
