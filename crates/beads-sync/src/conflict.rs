//! Conflict resolution between two differing views of the same issue
//! (SPEC_FULL §4.8 / §6.4), driven by [`ConflictPolicy`] from `beads-config`.

use beads_config::config::{ConflictConfig, ConflictPolicy, FieldStrategy};
use beads_core::issue::Issue;

use crate::diff::ALL_FIELDS;

/// Which side of a conflict an [`Issue`] snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Beads,
    File,
    Upstream,
}

/// Resolve a field-level conflict between `local` and `remote`, returning
/// the winning [`Issue`]. `local`/`remote` pair an issue snapshot with the
/// [`Side`] it came from so [`ConflictPolicy::BeadsWins`] etc. can pick a
/// side outright; `NewestWins` falls back to `updated_at` comparison.
pub fn resolve(config: &ConflictConfig, local: (&Issue, Side), remote: (&Issue, Side)) -> Issue {
    let (local_issue, local_side) = local;
    let (remote_issue, remote_side) = remote;

    match config.policy {
        ConflictPolicy::NewestWins => Some(merge_newest_wins(config, local_issue, remote_issue)),
        ConflictPolicy::BeadsWins => pick_side(Side::Beads, local, remote),
        ConflictPolicy::FileWins => pick_side(Side::File, local, remote),
        ConflictPolicy::UpstreamWins => pick_side(Side::Upstream, local, remote),
    }
    .unwrap_or_else(|| {
        // Neither snapshot matches the configured side (e.g. a Beads-vs-File
        // conflict under UpstreamWins): fall back to newest-wins so the
        // conflict still resolves deterministically.
        let _ = (local_side, remote_side);
        merge_newest_wins(config, local_issue, remote_issue)
    })
}

fn pick_side(side: Side, local: (&Issue, Side), remote: (&Issue, Side)) -> Option<Issue> {
    if local.1 == side {
        Some(local.0.clone())
    } else if remote.1 == side {
        Some(remote.0.clone())
    } else {
        None
    }
}

fn merge_newest_wins(config: &ConflictConfig, local: &Issue, remote: &Issue) -> Issue {
    let (newer, older) = if remote.updated_at >= local.updated_at { (remote, local) } else { (local, remote) };

    let mut winner = newer.clone();
    for field in ALL_FIELDS {
        if matches!(config.fields.get(*field), Some(FieldStrategy::Union)) && *field == "labels" {
            let mut merged = winner.labels.clone();
            for label in &older.labels {
                if !merged.contains(label) {
                    merged.push(label.clone());
                }
            }
            merged.sort();
            winner.labels = merged;
        }
    }
    winner
}

#[cfg(test)]
mod tests {
    use super::*;
    use beads_core::issue::IssueBuilder;
    use chrono::{Duration, Utc};
    use std::collections::HashMap;

    fn issue_at(title: &str, minutes_ago: i64) -> Issue {
        let ts = Utc::now() - Duration::minutes(minutes_ago);
        IssueBuilder::new(title).id("bd-1").updated_at(ts).build()
    }

    #[test]
    fn newest_wins_picks_the_later_updated_at() {
        let config = ConflictConfig { policy: ConflictPolicy::NewestWins, fields: HashMap::new() };
        let local = issue_at("local", 10);
        let remote = issue_at("remote", 1);
        let winner = resolve(&config, (&local, Side::Beads), (&remote, Side::Upstream));
        assert_eq!(winner.title, "remote");
    }

    #[test]
    fn beads_wins_ignores_timestamps() {
        let config = ConflictConfig { policy: ConflictPolicy::BeadsWins, fields: HashMap::new() };
        let local = issue_at("local", 1);
        let remote = issue_at("remote", 100);
        let winner = resolve(&config, (&local, Side::Beads), (&remote, Side::Upstream));
        assert_eq!(winner.title, "local");
    }

    #[test]
    fn union_strategy_merges_labels_from_both_sides() {
        let mut fields = HashMap::new();
        fields.insert("labels".to_string(), FieldStrategy::Union);
        let config = ConflictConfig { policy: ConflictPolicy::NewestWins, fields };

        let mut local = issue_at("local", 10);
        local.labels = vec!["bug".to_string()];
        let mut remote = issue_at("remote", 1);
        remote.labels = vec!["P1".to_string()];

        let winner = resolve(&config, (&local, Side::Beads), (&remote, Side::Upstream));
        assert_eq!(winner.labels, vec!["P1".to_string(), "bug".to_string()]);
    }
}
