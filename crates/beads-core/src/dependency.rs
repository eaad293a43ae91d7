//! `DependencyEdge` -- relationships between issues in the `blocks` DAG (and the
//! non-blocking `parent-child`/`related` kinds).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::DependencyType;

/// A directed edge `(from, to, kind)`. `blocks(from, to)` means `from` must be
/// closed before `to` becomes ready (I3, I4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: String,

    pub to: String,

    /// Edge kind (serialised as "kind" in JSON).
    #[serde(rename = "kind")]
    pub kind: DependencyType,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_by: String,
}

/// Counts for dependencies and dependents, used by the storage layer's
/// per-issue summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyCounts {
    /// Number of issues this issue depends on (outgoing `blocks` edges as `to`).
    pub dependency_count: i32,
    /// Number of issues that depend on this issue (incoming `blocks` edges as `from`).
    pub dependent_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_edge_serde_roundtrip() {
        let edge = DependencyEdge {
            from: "bd-abc".into(),
            to: "bd-def".into(),
            kind: DependencyType::Blocks,
            created_at: Utc::now(),
            created_by: "alice".into(),
        };

        let json = serde_json::to_string(&edge).unwrap();
        assert!(json.contains(r#""kind":"blocks""#));

        let back: DependencyEdge = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, DependencyType::Blocks);
        assert_eq!(back.from, "bd-abc");
    }

    #[test]
    fn parent_child_edge_does_not_affect_ready_work() {
        let edge = DependencyEdge {
            from: "bd-epic".into(),
            to: "bd-subtask".into(),
            kind: DependencyType::ParentChild,
            created_at: Utc::now(),
            created_by: String::new(),
        };
        assert!(!edge.kind.affects_ready_work());
    }
}
