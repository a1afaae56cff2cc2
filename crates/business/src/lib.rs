//! # Ganacert Business
//!
//! The engines behind the certification lifecycle:
//!
//! - [`StateTransitionEngine`] - the single write path for status changes,
//!   committing record updates and audit entries atomically.
//! - [`MetricsAggregator`] - daily KPI snapshots from the record
//!   population and the logo provider.
//! - [`DashboardComposer`] - latest snapshot + live counts + threshold
//!   alerts.
//!
//! All components receive their store interfaces ([`stores`]) through the
//! constructor and hold no other state.

pub mod cancel;
pub mod dashboard;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod stores;
pub mod transition;

pub use cancel::CancelToken;
pub use dashboard::{AlertThresholds, DashboardComposer};
pub use error::{BusinessError, BusinessResult};
pub use memory::{MemoryStore, StaticLogoStats};
pub use metrics::{day_window, MetricsAggregator, RangeOutcome};
pub use stores::{
    collect_records, AuditTrailStore, DailyCount, LogoStatsProvider, RecordFilter, RecordStore,
    SnapshotStore, StoreError, StoreResult, TransitionUnit,
};
pub use transition::{BatchOutcome, StateTransitionEngine};
