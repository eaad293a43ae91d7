//! Pure graph queries over a [`DagView`] (C3): ready, blocked, unblocks,
//! critical path, cycle prediction. No method here touches storage.

use std::collections::{HashMap, HashSet, VecDeque};

use beads_core::issue::Issue;

use crate::dag_view::DagView;

/// Open issues with no open blocker (I4).
pub fn ready(view: &DagView) -> Vec<&Issue> {
    view.issues()
        .filter(|i| i.is_open_ended() && !view.has_open_blocker(&i.id))
        .collect()
}

/// Open issues with at least one open blocker. `ready() ∪ blocked() =` every
/// open-ended issue, and the two sets are disjoint (P2).
pub fn blocked(view: &DagView) -> Vec<&Issue> {
    view.issues()
        .filter(|i| i.is_open_ended() && view.has_open_blocker(&i.id))
        .collect()
}

/// Issues that would newly satisfy I4 if `id` transitioned to closed: `id`
/// must be their only open blocker.
pub fn unblocks<'a>(view: &'a DagView, id: &str) -> Vec<&'a Issue> {
    view.blocks(id)
        .iter()
        .filter_map(|blocked_id| view.issue(blocked_id))
        .filter(|i| {
            i.is_open_ended()
                && view
                    .blockers(&i.id)
                    .iter()
                    .filter(|b| b.as_str() != id)
                    .all(|b| view.issue(b).map(|bi| !bi.is_open_ended()).unwrap_or(true))
        })
        .collect()
}

/// `true` if adding `blocks(from, to)` would create a cycle: a path already
/// exists from `to` back to `from` via `blocks` edges.
pub fn would_cycle(view: &DagView, from: &str, to: &str) -> bool {
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(to.to_string());

    while let Some(node) = queue.pop_front() {
        if node == from {
            return true;
        }
        if !visited.insert(node.clone()) {
            continue;
        }
        for next in view.blocks(&node) {
            queue.push_back(next.clone());
        }
    }

    false
}

/// Topological order of the open `blocks` subgraph via Kahn's algorithm.
/// Returns `None` if a cycle is present (an invariant violation -- I3 should
/// already have prevented this at write time).
fn topo_order(view: &DagView, nodes: &[&str]) -> Option<Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = nodes.iter().map(|n| (*n, 0)).collect();
    for &node in nodes {
        for blocked_id in view.blocks(node) {
            if let Some(deg) = in_degree.get_mut(blocked_id.as_str()) {
                *deg += 1;
            }
        }
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&n, _)| n)
        .collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(node) = queue.pop_front() {
        order.push(node.to_string());
        for blocked_id in view.blocks(node) {
            if let Some(deg) = in_degree.get_mut(blocked_id.as_str()) {
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(blocked_id.as_str());
                }
            }
        }
    }

    if order.len() == nodes.len() {
        Some(order)
    } else {
        None
    }
}

/// The longest chain of open issues connected by `blocks`, via DP over
/// topological order. Ties break by (1) total descendants, (2) higher
/// priority (lower number), (3) earlier `created_at`.
pub fn critical_path(view: &DagView) -> Vec<&Issue> {
    let open_ids: Vec<&str> = view
        .issues()
        .filter(|i| i.is_open_ended())
        .map(|i| i.id.as_str())
        .collect();

    let Some(order) = topo_order(view, &open_ids) else {
        return Vec::new();
    };

    let is_open_set: HashSet<&str> = open_ids.iter().copied().collect();

    // dist[node] = (path length ending at node, predecessor)
    let mut dist: HashMap<String, (usize, Option<String>)> =
        order.iter().map(|n| (n.clone(), (1, None))).collect();

    for node in order.iter().rev() {
        let (node_len, _) = dist.get(node).cloned().unwrap_or((1, None));
        for blocked_id in view.blocks(node) {
            if !is_open_set.contains(blocked_id.as_str()) {
                continue;
            }
            let candidate = node_len + 1;
            let entry = dist.entry(blocked_id.clone()).or_insert((1, None));
            if candidate > entry.0 {
                *entry = (candidate, Some(node.clone()));
            }
        }
    }

    let descendant_count = |id: &str| -> usize {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<String> = view.blocks(id).iter().cloned().collect();
        while let Some(n) = queue.pop_front() {
            if seen.insert(n.clone()) {
                queue.extend(view.blocks(&n).iter().cloned());
            }
        }
        seen.len()
    };

    let best_end = order.iter().max_by(|a, b| {
        let (len_a, _) = &dist[a.as_str()];
        let (len_b, _) = &dist[b.as_str()];
        len_a
            .cmp(len_b)
            .then_with(|| descendant_count(a).cmp(&descendant_count(b)))
            .then_with(|| {
                let pa = view.issue(a).map(|i| i.priority).unwrap_or(i32::MAX);
                let pb = view.issue(b).map(|i| i.priority).unwrap_or(i32::MAX);
                pb.cmp(&pa) // lower priority number wins -> reverse compare
            })
            .then_with(|| {
                let ca = view.issue(a).map(|i| i.created_at);
                let cb = view.issue(b).map(|i| i.created_at);
                cb.cmp(&ca) // earlier created_at wins -> reverse compare
            })
    });

    let Some(mut cursor) = best_end.cloned() else {
        return Vec::new();
    };

    let mut path = Vec::new();
    loop {
        path.push(cursor.clone());
        match dist.get(&cursor).and_then(|(_, pred)| pred.clone()) {
            Some(pred) => cursor = pred,
            None => break,
        }
    }
    path.reverse();

    path.into_iter().filter_map(|id| view.issue(&id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use beads_core::dependency::DependencyEdge;
    use beads_core::enums::{DependencyType, Status};
    use beads_core::issue::IssueBuilder;
    use chrono::Utc;

    fn edge(from: &str, to: &str) -> DependencyEdge {
        DependencyEdge {
            from: from.into(),
            to: to.into(),
            kind: DependencyType::Blocks,
            created_at: Utc::now(),
            created_by: String::new(),
        }
    }

    #[test]
    fn ready_excludes_blocked_issues() {
        let a = IssueBuilder::new("A").id("bd-a").build();
        let b = IssueBuilder::new("B").id("bd-b").build();
        let view = DagView::new(vec![a, b], vec![edge("bd-a", "bd-b")]);

        let ready_ids: Vec<&str> = ready(&view).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ready_ids, vec!["bd-a"]);

        let blocked_ids: Vec<&str> = blocked(&view).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(blocked_ids, vec!["bd-b"]);
    }

    #[test]
    fn unblocks_requires_id_to_be_the_last_open_blocker() {
        let a = IssueBuilder::new("A").id("bd-a").build();
        let c = IssueBuilder::new("C").id("bd-c").build();
        let b = IssueBuilder::new("B").id("bd-b").build();
        let view = DagView::new(vec![a, b, c], vec![edge("bd-a", "bd-b"), edge("bd-c", "bd-b")]);

        // bd-b still has bd-c as an open blocker, so closing bd-a doesn't unblock it.
        assert!(unblocks(&view, "bd-a").is_empty());
    }

    #[test]
    fn unblocks_fires_when_last_blocker_closes() {
        let a = IssueBuilder::new("A").id("bd-a").build();
        let mut c = IssueBuilder::new("C").id("bd-c").build();
        c.status = Status::Closed;
        let b = IssueBuilder::new("B").id("bd-b").build();
        let view = DagView::new(vec![a, b, c], vec![edge("bd-a", "bd-b"), edge("bd-c", "bd-b")]);

        let ids: Vec<&str> = unblocks(&view, "bd-a").iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["bd-b"]);
    }

    #[test]
    fn would_cycle_detects_reverse_path() {
        let a = IssueBuilder::new("A").id("bd-a").build();
        let b = IssueBuilder::new("B").id("bd-b").build();
        let c = IssueBuilder::new("C").id("bd-c").build();
        let view = DagView::new(vec![a, b, c], vec![edge("bd-a", "bd-b"), edge("bd-b", "bd-c")]);

        assert!(would_cycle(&view, "bd-c", "bd-a"));
        assert!(!would_cycle(&view, "bd-a", "bd-c"));
    }

    #[test]
    fn critical_path_follows_longest_open_chain() {
        let a = IssueBuilder::new("A").id("bd-a").build();
        let b = IssueBuilder::new("B").id("bd-b").build();
        let c = IssueBuilder::new("C").id("bd-c").build();
        let d = IssueBuilder::new("D").id("bd-d").build();
        // bd-a -> bd-b -> bd-c (length 3) vs bd-a -> bd-d (length 2)
        let view = DagView::new(
            vec![a, b, c, d],
            vec![edge("bd-a", "bd-b"), edge("bd-b", "bd-c"), edge("bd-a", "bd-d")],
        );

        let path: Vec<&str> = critical_path(&view).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(path, vec!["bd-a", "bd-b", "bd-c"]);
    }
}
