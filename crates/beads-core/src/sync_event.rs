//! `SyncEvent` -- the append-only reconciliation ledger (SPEC_FULL §3.1.1, §4.7, §7).
//!
//! Every attempted reconciliation, successful or not, is recorded here so the
//! orchestrator can dedupe redundant work and operators can audit what happened.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{SyncDirection, SyncOutcome, Upstream};

/// One row of the sync ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEvent {
    /// Monotonic ledger sequence number, assigned by storage on insert.
    pub id: i64,

    pub issue_id: String,

    pub direction: SyncDirection,

    pub upstream: Upstream,

    /// SHA256 of the canonical payload this event reconciled, used to detect
    /// duplicate deliveries (`SyncOutcome::Duplicate`).
    pub payload_hash: String,

    pub outcome: SyncOutcome,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl SyncEvent {
    /// Whether this event represents a terminal failure eligible for retry
    /// accounting (SPEC_FULL §7, retry/backoff).
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_event_serde_roundtrip() {
        let e = SyncEvent {
            id: 1,
            issue_id: "bd-abc".into(),
            direction: SyncDirection::CanonicalToGithub,
            upstream: Upstream::Github,
            payload_hash: "deadbeef".into(),
            outcome: SyncOutcome::Applied,
            error: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: SyncEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.outcome, SyncOutcome::Applied);
        assert!(!back.is_failed());
    }

    #[test]
    fn failed_event_is_failed() {
        let mut e = SyncEvent {
            id: 2,
            issue_id: "bd-abc".into(),
            direction: SyncDirection::LinearToCanonical,
            upstream: Upstream::Linear,
            payload_hash: "x".into(),
            outcome: SyncOutcome::Pending,
            error: None,
            created_at: Utc::now(),
        };
        assert!(!e.is_failed());
        e.outcome = SyncOutcome::Failed;
        e.error = Some("timeout".into());
        assert!(e.is_failed());
    }
}
