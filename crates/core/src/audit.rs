//! # Audit Module
//!
//! AuditEntry is the immutable log of one status change. Entries are
//! created exactly once per successful transition and never updated or
//! deleted afterwards.

use crate::error::{CoreError, CoreResult};
use crate::record::BrandStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable record of one status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry ID (AUD-<uuid>)
    pub id: String,
    /// Record whose status changed
    pub record_id: String,
    /// Status before the change; always set since Pending is the initial state
    pub previous_status: BrandStatus,
    pub new_status: BrandStatus,
    pub changed_at: DateTime<Utc>,
    /// Who performed the change; "system" for automated paths
    pub actor: String,
    pub notes: Option<String>,
}

impl AuditEntry {
    /// Build an entry, enforcing that the status actually changed.
    pub fn new(
        record_id: impl Into<String>,
        previous_status: BrandStatus,
        new_status: BrandStatus,
        changed_at: DateTime<Utc>,
        actor: impl Into<String>,
        notes: Option<String>,
    ) -> CoreResult<Self> {
        if previous_status == new_status {
            return Err(CoreError::NoStatusChange(new_status));
        }
        Ok(Self {
            id: format!("AUD-{}", Uuid::new_v4()),
            record_id: record_id.into(),
            previous_status,
            new_status,
            changed_at,
            actor: actor.into(),
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = AuditEntry::new(
            "MRC_0001",
            BrandStatus::Pending,
            BrandStatus::InReview,
            Utc::now(),
            "ana",
            None,
        )
        .unwrap();

        assert!(entry.id.starts_with("AUD-"));
        assert_eq!(entry.record_id, "MRC_0001");
        assert_eq!(entry.previous_status, BrandStatus::Pending);
        assert_eq!(entry.new_status, BrandStatus::InReview);
        assert_eq!(entry.actor, "ana");
    }

    #[test]
    fn test_same_status_rejected() {
        let err = AuditEntry::new(
            "MRC_0001",
            BrandStatus::Pending,
            BrandStatus::Pending,
            Utc::now(),
            "system",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::NoStatusChange(BrandStatus::Pending)));
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let a = AuditEntry::new(
            "MRC_0001",
            BrandStatus::Pending,
            BrandStatus::Approved,
            Utc::now(),
            "system",
            None,
        )
        .unwrap();
        let b = AuditEntry::new(
            "MRC_0001",
            BrandStatus::Pending,
            BrandStatus::Approved,
            Utc::now(),
            "system",
            None,
        )
        .unwrap();
        assert_ne!(a.id, b.id);
    }
}
