//! `Issue` -- the central domain model for the canonical issue store (SPEC_FULL §3.1).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{IssueType, Status};

/// Helper for `skip_serializing_if` on `Vec` fields.
fn is_empty_vec<T>(v: &[T]) -> bool {
    v.is_empty()
}

/// Helper for `skip_serializing_if` on maps.
fn is_empty_map<K, V>(m: &HashMap<K, V>) -> bool {
    m.is_empty()
}

/// A trackable work item, consistent across beads, `.todo/*.md` files, GitHub, and Linear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Stable, canonical, unique-within-repo identifier.
    #[serde(default)]
    pub id: String,

    /// Internal: SHA256 of canonical content, used for `SyncEvent.payload_hash`.
    /// Not exported to JSONL or Markdown.
    #[serde(skip)]
    pub content_hash: String,

    #[serde(default)]
    pub title: String,

    /// Markdown body; may be empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,

    #[serde(default, skip_serializing_if = "Status::is_default")]
    pub status: Status,

    #[serde(default, skip_serializing_if = "IssueType::is_default")]
    pub issue_type: IssueType,

    /// 0-4, 0 = highest. No skip: 0 is a meaningful, non-default value.
    #[serde(default)]
    pub priority: i32,

    /// Set of labels; comparison is set-equality (I1/§3.1).
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub labels: Vec<String>,

    /// Ordered; first element is "primary".
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub assignees: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<String>,

    /// Reference to an Issue of type `epic` in the same repo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<String>,

    /// Mapping from upstream name ("github", "linear", "beads") to opaque id
    /// (e.g. `github:123`, `linear:uuid`, `beads:todo-abc`). I1, I5.
    #[serde(default, skip_serializing_if = "is_empty_map")]
    pub external_refs: HashMap<String, String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub close_reason: String,
}

impl Default for Issue {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            content_hash: String::new(),
            title: String::new(),
            body: String::new(),
            status: Status::Open,
            issue_type: IssueType::Task,
            priority: 2,
            labels: Vec::new(),
            assignees: Vec::new(),
            milestone_id: None,
            epic_id: None,
            external_refs: HashMap::new(),
            created_at: now,
            updated_at: now,
            closed_at: None,
            close_reason: String::new(),
        }
    }
}

impl Issue {
    /// Applies default values for fields omitted during JSONL/frontmatter import.
    pub fn set_defaults(&mut self) {
        if matches!(&self.status, Status::Custom(s) if s.is_empty()) {
            self.status = Status::Open;
        }
        if matches!(&self.issue_type, IssueType::Custom(s) if s.is_empty()) {
            self.issue_type = IssueType::Task;
        }
        if self.priority == 0 && self.id.is_empty() {
            // Freshly-built issues with no explicit priority take the spec default.
            self.priority = 2;
        }
    }

    /// The first assignee, if any ("primary", per §3.1).
    pub fn primary_assignee(&self) -> Option<&str> {
        self.assignees.first().map(String::as_str)
    }

    /// Whether this issue is open-ended (open or in_progress) -- a precondition
    /// for readiness, before the DAG oracle checks blockers.
    pub fn is_open_ended(&self) -> bool {
        self.status.is_open_ended()
    }
}

/// Builder for constructing an [`Issue`] with a fluent API.
pub struct IssueBuilder {
    issue: Issue,
}

impl IssueBuilder {
    /// Creates a new builder with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        let mut issue = Issue::default();
        issue.title = title.into();
        Self { issue }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.issue.id = id.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.issue.body = body.into();
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.issue.status = status;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.issue.priority = priority;
        self
    }

    pub fn issue_type(mut self, issue_type: IssueType) -> Self {
        self.issue.issue_type = issue_type;
        self
    }

    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.issue.labels = labels;
        self
    }

    pub fn assignees(mut self, assignees: Vec<String>) -> Self {
        self.issue.assignees = assignees;
        self
    }

    pub fn milestone_id(mut self, id: impl Into<String>) -> Self {
        self.issue.milestone_id = Some(id.into());
        self
    }

    pub fn epic_id(mut self, id: impl Into<String>) -> Self {
        self.issue.epic_id = Some(id.into());
        self
    }

    pub fn external_ref(mut self, upstream: impl Into<String>, value: impl Into<String>) -> Self {
        self.issue.external_refs.insert(upstream.into(), value.into());
        self
    }

    pub fn created_at(mut self, t: DateTime<Utc>) -> Self {
        self.issue.created_at = t;
        self
    }

    pub fn updated_at(mut self, t: DateTime<Utc>) -> Self {
        self.issue.updated_at = t;
        self
    }

    pub fn closed_at(mut self, t: DateTime<Utc>) -> Self {
        self.issue.closed_at = Some(t);
        self
    }

    pub fn close_reason(mut self, reason: impl Into<String>) -> Self {
        self.issue.close_reason = reason.into();
        self
    }

    /// Consumes the builder and returns the constructed [`Issue`].
    pub fn build(self) -> Issue {
        self.issue
    }
}
