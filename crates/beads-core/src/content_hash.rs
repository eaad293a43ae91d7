//! Deterministic content hashing for issues.
//!
//! Produces a SHA-256 hex digest over all substantive fields (excluding ID
//! and timestamps) so that identical content produces identical hashes
//! across every clone -- this is the `payload_hash` component of the
//! orchestrator's idempotency key (SPEC_FULL §4.7).

use sha2::{Digest, Sha256};

use crate::issue::Issue;

const SEP: u8 = 0;

/// Computes a deterministic content hash for an issue.
pub fn compute_content_hash(issue: &Issue) -> String {
    let mut h = Sha256::new();

    write_str(&mut h, &issue.title);
    write_str(&mut h, &issue.body);
    write_str(&mut h, issue.status.as_str());
    write_str(&mut h, issue.issue_type.as_str());
    write_int(&mut h, issue.priority);

    let mut labels: Vec<&str> = issue.labels.iter().map(String::as_str).collect();
    labels.sort_unstable();
    for label in labels {
        write_str(&mut h, label);
    }

    for assignee in &issue.assignees {
        write_str(&mut h, assignee);
    }

    write_str_opt(&mut h, issue.milestone_id.as_deref());
    write_str_opt(&mut h, issue.epic_id.as_deref());

    let mut refs: Vec<(&str, &str)> = issue
        .external_refs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    refs.sort_unstable();
    for (upstream, value) in refs {
        write_str(&mut h, upstream);
        write_str(&mut h, value);
    }

    write_str(&mut h, &issue.close_reason);

    format!("{:x}", h.finalize())
}

fn write_str(h: &mut Sha256, s: &str) {
    h.update(s.as_bytes());
    h.update([SEP]);
}

fn write_int(h: &mut Sha256, n: i32) {
    h.update(n.to_string().as_bytes());
    h.update([SEP]);
}

fn write_str_opt(h: &mut Sha256, s: Option<&str>) {
    if let Some(s) = s {
        h.update(s.as_bytes());
    }
    h.update([SEP]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueBuilder;

    #[test]
    fn content_hash_deterministic() {
        let issue = IssueBuilder::new("Test issue")
            .body("A description")
            .priority(2)
            .build();

        let hash1 = compute_content_hash(&issue);
        let hash2 = compute_content_hash(&issue);
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn content_hash_differs_on_change() {
        let issue1 = IssueBuilder::new("Title A").build();
        let issue2 = IssueBuilder::new("Title B").build();
        assert_ne!(compute_content_hash(&issue1), compute_content_hash(&issue2));
    }

    #[test]
    fn content_hash_ignores_id_and_timestamps() {
        let mut issue1 = IssueBuilder::new("Same content").build();
        let mut issue2 = IssueBuilder::new("Same content").build();

        issue1.id = "bd-aaa".into();
        issue2.id = "bd-bbb".into();
        issue1.created_at = chrono::Utc::now();
        issue2.created_at = chrono::DateTime::parse_from_rfc3339("2020-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);

        assert_eq!(compute_content_hash(&issue1), compute_content_hash(&issue2));
    }

    #[test]
    fn content_hash_ignores_label_order() {
        let issue1 = IssueBuilder::new("X").labels(vec!["a".into(), "b".into()]).build();
        let issue2 = IssueBuilder::new("X").labels(vec!["b".into(), "a".into()]).build();
        assert_eq!(compute_content_hash(&issue1), compute_content_hash(&issue2));
    }
}
