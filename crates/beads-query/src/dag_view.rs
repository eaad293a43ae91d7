//! [`DagView`] -- an immutable snapshot of issues and `blocks` edges that the
//! oracle queries run against. Callers fetch one per call via
//! `Storage::list`/`Storage::all_edges` and the oracle never touches storage
//! itself, so it stays pure and unit-testable with plain fixtures.

use std::collections::HashMap;

use beads_core::dependency::DependencyEdge;
use beads_core::enums::{DependencyType, Status};
use beads_core::issue::Issue;

/// A snapshot of the issue graph restricted to `blocks` edges.
///
/// `parent-child`/`related` edges are carried in `all_edges` for callers that
/// need them (e.g. `<Subtasks/>`) but are ignored by every graph algorithm in
/// this crate -- I3 (the acyclicity invariant) applies only to `blocks`.
pub struct DagView {
    issues: HashMap<String, Issue>,
    /// `blocks` edges only: `from` blocks `to`.
    blocks_out: HashMap<String, Vec<String>>,
    blocks_in: HashMap<String, Vec<String>>,
    all_edges: Vec<DependencyEdge>,
}

impl DagView {
    pub fn new(issues: Vec<Issue>, edges: Vec<DependencyEdge>) -> Self {
        let mut blocks_out: HashMap<String, Vec<String>> = HashMap::new();
        let mut blocks_in: HashMap<String, Vec<String>> = HashMap::new();

        for edge in &edges {
            if edge.kind == DependencyType::Blocks {
                blocks_out.entry(edge.from.clone()).or_default().push(edge.to.clone());
                blocks_in.entry(edge.to.clone()).or_default().push(edge.from.clone());
            }
        }

        let issues = issues.into_iter().map(|i| (i.id.clone(), i)).collect();

        Self {
            issues,
            blocks_out,
            blocks_in,
            all_edges: edges,
        }
    }

    pub fn issue(&self, id: &str) -> Option<&Issue> {
        self.issues.get(id)
    }

    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.values()
    }

    pub fn all_edges(&self) -> &[DependencyEdge] {
        &self.all_edges
    }

    /// Issues that `id` blocks (outgoing `blocks` edges).
    pub fn blocks(&self, id: &str) -> &[String] {
        self.blocks_out.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Issues that block `id` (incoming `blocks` edges).
    pub fn blockers(&self, id: &str) -> &[String] {
        self.blocks_in.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn is_open(&self, id: &str) -> bool {
        self.issues.get(id).map(|i| i.status == Status::Open || i.status == Status::InProgress).unwrap_or(false)
    }

    /// `true` if `id` has at least one blocker that is still open.
    pub fn has_open_blocker(&self, id: &str) -> bool {
        self.blockers(id).iter().any(|b| self.is_open(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beads_core::issue::IssueBuilder;
    use chrono::Utc;

    fn edge(from: &str, to: &str, kind: DependencyType) -> DependencyEdge {
        DependencyEdge {
            from: from.into(),
            to: to.into(),
            kind,
            created_at: Utc::now(),
            created_by: String::new(),
        }
    }

    #[test]
    fn blocks_and_blockers_are_indexed_both_ways() {
        let issues = vec![
            IssueBuilder::new("A").id("bd-a").build(),
            IssueBuilder::new("B").id("bd-b").build(),
        ];
        let edges = vec![edge("bd-a", "bd-b", DependencyType::Blocks)];
        let view = DagView::new(issues, edges);

        assert_eq!(view.blocks("bd-a"), &["bd-b".to_string()]);
        assert_eq!(view.blockers("bd-b"), &["bd-a".to_string()]);
        assert!(view.has_open_blocker("bd-b"));
    }

    #[test]
    fn parent_child_edges_do_not_affect_blocker_index() {
        let issues = vec![
            IssueBuilder::new("A").id("bd-a").build(),
            IssueBuilder::new("B").id("bd-b").build(),
        ];
        let edges = vec![edge("bd-a", "bd-b", DependencyType::ParentChild)];
        let view = DagView::new(issues, edges);

        assert!(view.blocks("bd-a").is_empty());
        assert!(!view.has_open_blocker("bd-b"));
        assert_eq!(view.all_edges().len(), 1);
    }
}
