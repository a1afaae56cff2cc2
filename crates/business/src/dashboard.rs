//! # Dashboard Composer
//!
//! Read-only consumer that combines the latest KPI snapshot with
//! current-moment queue counts and threshold alerts. Queue counts are
//! always fresh `count_by` queries - the snapshot is as-of-yesterday by
//! design.

use crate::error::BusinessResult;
use crate::stores::{RecordFilter, RecordStore, SnapshotStore};
use chrono::Utc;
use ganacert_core::{
    AlertSeverity, BrandStatus, DashboardAlert, DashboardView, KPISnapshot, LiveCounts,
};
use std::sync::Arc;

/// Alert thresholds for the dashboard.
#[derive(Debug, Clone)]
pub struct AlertThresholds {
    /// Pending queue length above which a warning fires
    pub max_pending: u64,
    /// Approval rate (percent) below which an error fires
    pub min_approval_rate: f64,
    /// Logo success rate (percent) below which a warning fires
    pub min_logo_success_rate: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            max_pending: 50,
            min_approval_rate: 60.0,
            min_logo_success_rate: 70.0,
        }
    }
}

/// Builds the dashboard view. Never fails just because no snapshot has
/// been computed yet: the view then carries `snapshot: None` and only the
/// live counts.
pub struct DashboardComposer {
    records: Arc<dyn RecordStore>,
    snapshots: Arc<dyn SnapshotStore>,
    thresholds: AlertThresholds,
}

impl DashboardComposer {
    pub fn new(records: Arc<dyn RecordStore>, snapshots: Arc<dyn SnapshotStore>) -> Self {
        Self::with_thresholds(records, snapshots, AlertThresholds::default())
    }

    pub fn with_thresholds(
        records: Arc<dyn RecordStore>,
        snapshots: Arc<dyn SnapshotStore>,
        thresholds: AlertThresholds,
    ) -> Self {
        Self {
            records,
            snapshots,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    /// Assemble snapshot, live counts, and alerts.
    pub async fn compose(&self) -> BusinessResult<DashboardView> {
        let today = Utc::now().date_naive();
        let snapshot = match self.snapshots.get(today).await? {
            Some(snapshot) => Some(snapshot),
            // No row for today yet: fall back to the most recent one.
            None => self.snapshots.latest().await?,
        };

        let pending = self
            .records
            .count_by(&RecordFilter::new().with_status(BrandStatus::Pending))
            .await?;
        let in_review = self
            .records
            .count_by(&RecordFilter::new().with_status(BrandStatus::InReview))
            .await?;
        let live = LiveCounts { pending, in_review };

        let alerts = self.build_alerts(snapshot.as_ref(), &live);

        Ok(DashboardView {
            snapshot,
            live,
            alerts,
            generated_at: Utc::now(),
        })
    }

    fn build_alerts(&self, snapshot: Option<&KPISnapshot>, live: &LiveCounts) -> Vec<DashboardAlert> {
        let mut alerts = Vec::new();

        if live.pending > self.thresholds.max_pending {
            alerts.push(DashboardAlert {
                severity: AlertSeverity::Warning,
                title: "Pending backlog".to_string(),
                message: format!("{} registrations are waiting for processing", live.pending),
            });
        }

        // Snapshot-derived alerts are skipped entirely when no snapshot
        // exists; absent data is not a threshold breach.
        if let Some(snapshot) = snapshot {
            if snapshot.approval_rate < self.thresholds.min_approval_rate {
                alerts.push(DashboardAlert {
                    severity: AlertSeverity::Error,
                    title: "Low approval rate".to_string(),
                    message: format!("Approval rate is at {:.1}%", snapshot.approval_rate),
                });
            }
            if snapshot.logo_success_rate < self.thresholds.min_logo_success_rate {
                alerts.push(DashboardAlert {
                    severity: AlertSeverity::Warning,
                    title: "Logo generation failures".to_string(),
                    message: format!(
                        "Logo success rate is at {:.1}%",
                        snapshot.logo_success_rate
                    ),
                });
            }
        }

        alerts
    }
}
