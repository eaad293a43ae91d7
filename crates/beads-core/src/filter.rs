//! Filter type for `Storage::list` (C2's `list(filter)` operation, SPEC_FULL §4.1).

use crate::enums::{IssueType, Status};

/// Recognized filter options for listing issues. All fields are optional;
/// an absent field places no constraint on that dimension.
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    pub status: Option<Status>,
    pub issue_type: Option<IssueType>,
    pub priority: Option<i32>,
    /// OR semantics: issue must have at least one of these labels.
    pub labels_any: Vec<String>,
    pub assignee: Option<String>,
    pub milestone_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_filter_defaults() {
        let f = IssueFilter::default();
        assert!(f.status.is_none());
        assert!(f.priority.is_none());
        assert!(f.labels_any.is_empty());
        assert!(f.milestone_id.is_none());
    }
}
