//! `Milestone` -- a named grouping of issues with its own lifecycle (SPEC_FULL §3.1.1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::MilestoneState;

/// A milestone groups issues (via `Issue::milestone_id`) toward a shared target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "MilestoneState::is_default")]
    pub state: MilestoneState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Milestone {
    /// A freshly created, open milestone with no due date.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            state: MilestoneState::Open,
            due_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestone_defaults_to_open() {
        let m = Milestone::new("ms-1", "Launch");
        assert_eq!(m.state, MilestoneState::Open);
    }

    #[test]
    fn milestone_serde_roundtrip() {
        let m = Milestone::new("ms-1", "Launch");
        let json = serde_json::to_string(&m).unwrap();
        let back: Milestone = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "ms-1");
        assert_eq!(back.title, "Launch");
    }
}
