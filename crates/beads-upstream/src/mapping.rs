//! Pure field-mapping functions between the canonical model and each
//! upstream's own vocabulary (SPEC_FULL §4.6 field mapping table). No I/O.

use beads_core::enums::{IssueType, Status};

/// `state=open`/`state=closed` <-> canonical status. GitHub has no
/// `in_progress` state of its own; an `in-progress` label is the convention
/// used to recover it on read.
pub fn github_state_to_status(state: &str, labels: &[String]) -> Status {
    if state == "closed" {
        return Status::Closed;
    }
    if labels.iter().any(|l| l.eq_ignore_ascii_case("in-progress")) {
        Status::InProgress
    } else {
        Status::Open
    }
}

pub fn status_to_github_state(status: &Status) -> &'static str {
    match status {
        Status::Closed => "closed",
        _ => "open",
    }
}

/// `in_progress` has no GitHub state of its own, so it round-trips through
/// the `in-progress` label convention instead.
pub fn status_to_github_label(status: &Status) -> Option<&'static str> {
    match status {
        Status::InProgress => Some("in-progress"),
        _ => None,
    }
}

/// Recovers priority 0..4 from a `P0`..`P4` or `priority:N` label, defaulting
/// to the canonical default (2) when no priority label is present.
pub fn github_labels_to_priority(labels: &[String]) -> i32 {
    for label in labels {
        if let Some(n) = parse_p_label(label).or_else(|| parse_priority_label(label)) {
            return n;
        }
    }
    2
}

fn parse_p_label(label: &str) -> Option<i32> {
    let rest = label.strip_prefix('P').or_else(|| label.strip_prefix('p'))?;
    rest.parse().ok().filter(|n| (0..=4).contains(n))
}

fn parse_priority_label(label: &str) -> Option<i32> {
    let rest = label.strip_prefix("priority:")?;
    rest.parse().ok().filter(|n| (0..=4).contains(n))
}

pub fn priority_to_github_label(priority: i32) -> String {
    format!("P{}", priority.clamp(0, 4))
}

/// GitHub has no native issue-type concept; this recovers one from a
/// `bug`/`feature`/`epic`/`chore` label, defaulting to `task`.
pub fn github_labels_to_issue_type(labels: &[String]) -> IssueType {
    for label in labels {
        match label.as_str() {
            "bug" => return IssueType::Bug,
            "feature" => return IssueType::Feature,
            "epic" => return IssueType::Epic,
            "chore" => return IssueType::Chore,
            _ => {}
        }
    }
    IssueType::Task
}

pub fn issue_type_to_github_label(issue_type: &IssueType) -> Option<&str> {
    match issue_type {
        IssueType::Task => None,
        other => Some(other.as_str()),
    }
}

/// Linear's `type` field (`backlog`/`unstarted`/`started`/`completed`/`canceled`)
/// maps onto the canonical three-state model; `started` is the only state
/// with a direct `in_progress` counterpart.
pub fn linear_state_type_to_status(state_type: &str) -> Status {
    match state_type {
        "started" => Status::InProgress,
        "completed" | "canceled" => Status::Closed,
        _ => Status::Open,
    }
}

/// Linear's 1..4 (urgent..low) maps to canonical 0..3; Linear's `0` ("no
/// priority") maps to the canonical default, 2.
pub fn linear_priority_to_canonical(priority: i32) -> i32 {
    match priority {
        0 => 2,
        1..=4 => priority - 1,
        _ => 2,
    }
}
