//! # State Transition Engine
//!
//! The single write path for status changes. Every transition - API,
//! admin bulk action, or script - goes through [`StateTransitionEngine`],
//! which validates the edge against the table in
//! [`BrandStatus::successors`], stamps terminal records, and commits the
//! record update together with its audit entry as one atomic unit.

use crate::cancel::CancelToken;
use crate::error::{BusinessError, BusinessResult};
use crate::stores::{RecordStore, TransitionUnit};
use chrono::{DateTime, Utc};
use ganacert_core::{AuditEntry, BrandStatus};
use std::sync::Arc;

/// Ceiling of elapsed whole hours between two instants. Negative spans
/// clamp to zero; the record validation forbids them anyway.
pub(crate) fn elapsed_hours_ceil(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let secs = (to - from).num_seconds().max(0);
    (secs + 3599) / 3600
}

/// Outcome of a bulk transition. Each record is processed independently:
/// one failure never blocks the rest.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub applied: Vec<AuditEntry>,
    pub failed: Vec<(String, BusinessError)>,
    /// True when the cancel token stopped the batch before the last item
    pub interrupted: bool,
}

/// Validates and applies status changes; the only permitted writer of
/// record status, processed_at, and processing_hours.
pub struct StateTransitionEngine {
    records: Arc<dyn RecordStore>,
    unit: Arc<dyn TransitionUnit>,
}

impl StateTransitionEngine {
    pub fn new(records: Arc<dyn RecordStore>, unit: Arc<dyn TransitionUnit>) -> Self {
        Self { records, unit }
    }

    /// Apply one status change and return the audit entry it produced.
    ///
    /// Fails with `InvalidTransition` (no mutation, no audit entry) when
    /// the edge is not in the table, and with `Conflict` when the stored
    /// version moved under us - the caller must re-read and retry.
    pub async fn transition(
        &self,
        record_id: &str,
        new_status: BrandStatus,
        actor: &str,
        notes: Option<&str>,
    ) -> BusinessResult<AuditEntry> {
        self.transition_at(record_id, new_status, actor, notes, Utc::now())
            .await
    }

    /// [`Self::transition`] with an explicit clock, for replay and tests.
    pub async fn transition_at(
        &self,
        record_id: &str,
        new_status: BrandStatus,
        actor: &str,
        notes: Option<&str>,
        at: DateTime<Utc>,
    ) -> BusinessResult<AuditEntry> {
        let mut record = self.records.get(record_id).await?;

        if !record.status.can_transition_to(new_status) {
            return Err(BusinessError::InvalidTransition {
                record_id: record_id.to_string(),
                from: record.status,
                to: new_status,
            });
        }

        let previous = record.status;
        record.status = new_status;
        if new_status.is_terminal() {
            record.processed_at = Some(at);
            record.processing_hours = Some(elapsed_hours_ceil(record.registered_at, at));
        }
        record.updated_at = Some(at);

        let entry = AuditEntry::new(
            record_id,
            previous,
            new_status,
            at,
            actor,
            notes.map(|s| s.to_string()),
        )?;

        self.unit.commit(&record, &entry).await?;

        tracing::debug!(
            record_id,
            from = %previous,
            to = %new_status,
            actor,
            "status transition committed"
        );

        Ok(entry)
    }

    /// Apply the same status change to many records, collecting per-record
    /// outcomes. Mirrors the admin bulk approve/reject actions; legality
    /// checks route through the single-item [`Self::transition`] so there
    /// is one source of truth.
    ///
    /// An `Integrity` failure aborts the whole batch (it signals a broken
    /// atomic-write guarantee upstream); every other failure is recorded
    /// and the batch continues. The cancel token is honored between
    /// records, leaving already-committed items untouched.
    pub async fn transition_many(
        &self,
        record_ids: &[String],
        new_status: BrandStatus,
        actor: &str,
        notes: Option<&str>,
        cancel: &CancelToken,
    ) -> BusinessResult<BatchOutcome> {
        let mut outcome = BatchOutcome::default();

        for record_id in record_ids {
            if cancel.is_cancelled() {
                outcome.interrupted = true;
                break;
            }
            match self.transition(record_id, new_status, actor, notes).await {
                Ok(entry) => outcome.applied.push(entry),
                Err(err @ BusinessError::Integrity(_)) => return Err(err),
                Err(err) => {
                    tracing::warn!(record_id = %record_id, error = %err, "bulk transition item failed");
                    outcome.failed.push((record_id.clone(), err));
                }
            }
        }

        Ok(outcome)
    }
}
