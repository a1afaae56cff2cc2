//! # Report Module
//!
//! ReportData is the period-scoped aggregate handed to export backends.
//! Three report types: a period summary, a per-department comparison, and
//! a single-producer report keyed by national ID.

use crate::record::{BrandStatus, Department};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which report to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportType {
    PeriodSummary,
    DepartmentComparison,
    Producer { national_id: String },
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::PeriodSummary => "period_summary",
            ReportType::DepartmentComparison => "department_comparison",
            ReportType::Producer { .. } => "producer",
        }
    }
}

/// Direction of registration volume across the period, first snapshot
/// vs last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

/// Aggregate counts over the report period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub registered: u64,
    pub approved: u64,
    pub rejected: u64,
    pub pending: u64,
    pub total_head_count: u64,
    pub total_certification_amount: Decimal,
    pub average_processing_hours: f64,
}

/// One department's share in the comparison report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRow {
    pub department: Department,
    pub registered: u64,
    pub approved: u64,
    pub rejected: u64,
    pub head_count: u64,
    pub certification_amount: Decimal,
    pub approval_rate: f64,
}

/// One of a producer's registrations in the producer report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerRecordRow {
    pub record_id: String,
    pub brand_number: String,
    pub status: BrandStatus,
    pub head_count: u32,
    pub department: Department,
    pub registered_at: DateTime<Utc>,
}

/// Producer-specific section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerDetail {
    pub national_id: String,
    pub owner_name: String,
    pub records: Vec<ProducerRecordRow>,
    /// Status changes across all of the producer's records in the period
    pub audit_entry_count: u64,
}

/// Period-scoped aggregate report. An empty period yields `empty: true`
/// with zeroed totals rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub report_type: ReportType,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub empty: bool,
    pub totals: PeriodTotals,
    /// Present only when the period holds at least two snapshots
    pub trend: Option<Trend>,
    /// Filled for the department-comparison report
    pub departments: Vec<DepartmentRow>,
    /// Filled for the producer report
    pub producer: Option<ProducerDetail>,
    pub generated_at: DateTime<Utc>,
}

impl ReportData {
    /// Zeroed report for a period with no data.
    pub fn empty(report_type: ReportType, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            report_type,
            start,
            end,
            empty: true,
            totals: PeriodTotals::default(),
            trend: None,
            departments: Vec::new(),
            producer: None,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let report = ReportData::empty(ReportType::PeriodSummary, start, end);

        assert!(report.empty);
        assert_eq!(report.totals.registered, 0);
        assert_eq!(report.totals.total_certification_amount, Decimal::ZERO);
        assert!(report.trend.is_none());
        assert!(report.departments.is_empty());
    }

    #[test]
    fn test_report_type_labels() {
        assert_eq!(ReportType::PeriodSummary.as_str(), "period_summary");
        assert_eq!(
            ReportType::Producer {
                national_id: "123".to_string()
            }
            .as_str(),
            "producer"
        );
    }
}
