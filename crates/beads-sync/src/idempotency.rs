//! Idempotency-key computation and duplicate-delivery detection (SPEC_FULL
//! §4.7 "P3"), backed by the `sync_events` ledger via [`Storage`].

use beads_core::content_hash::compute_content_hash;
use beads_core::issue::Issue;
use beads_storage::Storage;

use crate::error::Result;

/// Computes the payload hash that identifies a reconciliation attempt in the
/// `sync_events` ledger. Webhook deliveries use the provider's own delivery
/// id (already unique per attempt); pulled items (polling, file watches) use
/// the issue's deterministic content hash so re-observing identical content
/// is recognized as a duplicate rather than a new event.
pub fn payload_hash_for_delivery(delivery_id: &str) -> String {
    format!("delivery:{delivery_id}")
}

/// Payload hash for a canonical `Issue` snapshot observed via polling or a
/// file watch, where there is no delivery id to key off of.
pub fn payload_hash_for_issue(issue: &Issue) -> String {
    compute_content_hash(issue)
}

/// Consults the ledger for `payload_hash`; `true` means this exact payload
/// was already applied and the caller should record `SyncOutcome::Duplicate`
/// instead of reconciling again.
pub fn already_applied(storage: &dyn Storage, payload_hash: &str) -> Result<bool> {
    Ok(storage.has_applied_payload(payload_hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use beads_core::issue::IssueBuilder;

    #[test]
    fn delivery_hash_is_stable_and_distinct_per_id() {
        assert_eq!(payload_hash_for_delivery("abc"), payload_hash_for_delivery("abc"));
        assert_ne!(payload_hash_for_delivery("abc"), payload_hash_for_delivery("def"));
    }

    #[test]
    fn issue_hash_changes_with_content_but_not_with_id() {
        let a = IssueBuilder::new("Same title").id("bd-1").build();
        let b = IssueBuilder::new("Same title").id("bd-2").build();
        assert_eq!(payload_hash_for_issue(&a), payload_hash_for_issue(&b));

        let c = IssueBuilder::new("Different title").id("bd-1").build();
        assert_ne!(payload_hash_for_issue(&a), payload_hash_for_issue(&c));
    }
}
