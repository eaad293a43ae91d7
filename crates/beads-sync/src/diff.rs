//! Canonical diff computation (SPEC_FULL §4.7 "Change detection"): which
//! fields actually changed, restricted to the fields the caller is
//! authoritative for. Pure -- no I/O.

use std::collections::HashSet;

use beads_core::issue::Issue;

/// Every field name a reconciliation axis may claim authority over.
pub const ALL_FIELDS: &[&str] =
    &["title", "body", "status", "priority", "issue_type", "labels", "assignees", "milestone_id"];

/// Field names where `old` and `new` differ.
pub fn changed_fields(old: &Issue, new: &Issue) -> HashSet<&'static str> {
    let mut changed = HashSet::new();
    if old.title != new.title {
        changed.insert("title");
    }
    if old.body != new.body {
        changed.insert("body");
    }
    if old.status != new.status {
        changed.insert("status");
    }
    if old.priority != new.priority {
        changed.insert("priority");
    }
    if old.issue_type != new.issue_type {
        changed.insert("issue_type");
    }
    if sorted(&old.labels) != sorted(&new.labels) {
        changed.insert("labels");
    }
    if old.assignees != new.assignees {
        changed.insert("assignees");
    }
    if old.milestone_id != new.milestone_id {
        changed.insert("milestone_id");
    }
    changed
}

fn sorted(v: &[String]) -> Vec<&str> {
    let mut s: Vec<&str> = v.iter().map(String::as_str).collect();
    s.sort_unstable();
    s
}

/// The "change set" the spec defines for files->beads: the intersection of
/// fields present in the new frontmatter with fields that actually differ
/// from the cached last-known state. An empty change set means the update
/// is a no-op and should be recorded as `ignored`, not applied.
pub fn change_set(
    frontmatter_fields: &HashSet<&'static str>,
    old: &Issue,
    new: &Issue,
) -> HashSet<&'static str> {
    let changed = changed_fields(old, new);
    frontmatter_fields.intersection(&changed).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use beads_core::issue::IssueBuilder;

    #[test]
    fn detects_status_and_priority_changes() {
        let old = IssueBuilder::new("A").priority(2).build();
        let new = IssueBuilder::new("A").priority(1).status(beads_core::enums::Status::Closed).build();
        let changed = changed_fields(&old, &new);
        assert!(changed.contains("status"));
        assert!(changed.contains("priority"));
        assert!(!changed.contains("title"));
    }

    #[test]
    fn label_order_does_not_count_as_a_change() {
        let old = IssueBuilder::new("A").labels(vec!["a".into(), "b".into()]).build();
        let new = IssueBuilder::new("A").labels(vec!["b".into(), "a".into()]).build();
        assert!(!changed_fields(&old, &new).contains("labels"));
    }

    #[test]
    fn change_set_is_empty_when_frontmatter_omits_the_changed_field() {
        let old = IssueBuilder::new("A").priority(2).build();
        let new = IssueBuilder::new("A").priority(1).build();
        let frontmatter_fields: HashSet<&str> = ["title"].into_iter().collect();
        assert!(change_set(&frontmatter_fields, &old, &new).is_empty());
    }

    #[test]
    fn change_set_includes_field_present_in_both_sets() {
        let old = IssueBuilder::new("A").priority(2).build();
        let new = IssueBuilder::new("A").priority(1).build();
        let frontmatter_fields: HashSet<&str> = ["priority", "title"].into_iter().collect();
        assert_eq!(change_set(&frontmatter_fields, &old, &new), ["priority"].into_iter().collect());
    }
}
