//! # Dashboard Module
//!
//! View types the composer assembles for management: the most recent KPI
//! snapshot, current-moment queue counts, and threshold alerts. Alerts are
//! transient - regenerated on every composition, never persisted.

use crate::kpi::KPISnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How urgent an alert is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Error,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "warning",
            AlertSeverity::Error => "error",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Threshold-triggered alert shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardAlert {
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
}

/// Current-moment queue counts, read fresh from the record store rather
/// than from yesterday's snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveCounts {
    pub pending: u64,
    pub in_review: u64,
}

/// What the composer hands to the UI layer. `snapshot` is None when no
/// snapshot has ever been computed; numeric KPI fields are then simply
/// unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub snapshot: Option<KPISnapshot>,
    pub live: LiveCounts,
    pub alerts: Vec<DashboardAlert>,
    pub generated_at: DateTime<Utc>,
}
