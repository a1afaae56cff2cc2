//! # KPI Module
//!
//! KPISnapshot is the daily rollup the aggregator produces: registration
//! counts, approval rate, processing times, herd sizes, purpose and
//! department distributions, and logo-generation statistics.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Registration counts per declared purpose. Buckets sum to the
/// snapshot's registered count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurposeBreakdown {
    pub meat: u64,
    pub dairy: u64,
    pub dual_purpose: u64,
    pub breeding: u64,
}

impl PurposeBreakdown {
    pub fn total(&self) -> u64 {
        self.meat + self.dairy + self.dual_purpose + self.breeding
    }
}

/// Registration counts for the three largest departments plus everything
/// else. Buckets sum to the snapshot's registered count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentBreakdown {
    pub santa_cruz: u64,
    pub beni: u64,
    pub la_paz: u64,
    pub other: u64,
}

impl DepartmentBreakdown {
    pub fn total(&self) -> u64 {
        self.santa_cruz + self.beni + self.la_paz + self.other
    }
}

/// Daily KPI rollup, keyed by date. Recomputation for the same date
/// overwrites the previous snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KPISnapshot {
    /// Snapshot key; the 24h UTC window starting at this date's midnight
    pub date: NaiveDate,

    pub registered: u64,
    pub approved: u64,
    pub pending: u64,
    pub rejected: u64,

    /// approved / (approved + rejected) * 100; 0 when nothing was decided
    pub approval_rate: f64,
    /// Mean processing_hours over records processed in the window
    pub average_processing_hours: f64,

    pub total_head_count: u64,
    pub average_head_per_brand: f64,

    pub purposes: PurposeBreakdown,
    pub departments: DepartmentBreakdown,

    pub logo_success_rate: f64,
    pub logo_count: u64,
    pub average_logo_generation_seconds: f64,

    pub computed_at: DateTime<Utc>,
}

impl KPISnapshot {
    /// Check the snapshot invariants: rates in [0, 100] and both
    /// distributions reconciling exactly to the registered count.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=100.0).contains(&self.approval_rate) {
            return Err(CoreError::Validation(format!(
                "approval rate out of range: {}",
                self.approval_rate
            )));
        }
        if !(0.0..=100.0).contains(&self.logo_success_rate) {
            return Err(CoreError::Validation(format!(
                "logo success rate out of range: {}",
                self.logo_success_rate
            )));
        }
        if self.purposes.total() != self.registered {
            return Err(CoreError::Validation(format!(
                "purpose buckets sum to {} but {} registered",
                self.purposes.total(),
                self.registered
            )));
        }
        if self.departments.total() != self.registered {
            return Err(CoreError::Validation(format!(
                "department buckets sum to {} but {} registered",
                self.departments.total(),
                self.registered
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> KPISnapshot {
        KPISnapshot {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            registered: 10,
            approved: 4,
            pending: 3,
            rejected: 2,
            approval_rate: 66.66666666666666,
            average_processing_hours: 18.5,
            total_head_count: 240,
            average_head_per_brand: 24.0,
            purposes: PurposeBreakdown {
                meat: 5,
                dairy: 2,
                dual_purpose: 2,
                breeding: 1,
            },
            departments: DepartmentBreakdown {
                santa_cruz: 6,
                beni: 2,
                la_paz: 1,
                other: 1,
            },
            logo_success_rate: 80.0,
            logo_count: 5,
            average_logo_generation_seconds: 12.0,
            computed_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_snapshot() {
        assert!(snapshot().validate().is_ok());
    }

    #[test]
    fn test_purpose_sum_mismatch_rejected() {
        let mut s = snapshot();
        s.purposes.meat = 99;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_department_sum_mismatch_rejected() {
        let mut s = snapshot();
        s.departments.other = 99;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_rate_bounds() {
        let mut s = snapshot();
        s.approval_rate = 101.0;
        assert!(s.validate().is_err());

        let mut s = snapshot();
        s.logo_success_rate = -0.1;
        assert!(s.validate().is_err());
    }
}
