//! `beads <-> files` reconciliation axis (SPEC_FULL §4.7, items 1-2): a
//! changed `.todo/*.md` file is parsed, its change set computed against the
//! cached last-known state, and the diff pushed into the canonical store.
//! The reverse direction (canonical -> files) is C4+C5's
//! `beads_template::render::render_outputs`; this module only owns the
//! files -> beads direction plus the shared event bookkeeping.

use chrono::Utc;

use beads_core::enums::{SyncDirection, SyncOutcome, Upstream};
use beads_core::issue::Issue;
use beads_core::sync_event::SyncEvent;
use beads_storage::{Outcome, Storage};
use beads_template::markdown::Document;
use beads_template::{edges_from_document, issue_from_document, present_fields};

use crate::conflict::{self, Side};
use crate::diff::change_set;
use crate::error::Result;
use crate::idempotency::payload_hash_for_issue;

/// A `depends_on`/`blocks` edge parsed from frontmatter, not yet applied.
pub use beads_template::FrontmatterEdges;

/// Reconciles one changed file into the canonical store. `cached` is the
/// last-known canonical row for this file's `beads_id`, if any -- `None`
/// means the file is not yet tracked (a missing `beads_id`), in which case
/// every frontmatter field is authoritative and a fresh row is created.
///
/// Returns the appended [`SyncEvent`] and the edges the caller should apply
/// separately via [`Storage::add_edge`] (edges are not part of the diff).
pub fn file_to_canonical(
    storage: &dyn Storage,
    doc: &Document,
    cached: Option<&Issue>,
    conflict_config: &beads_config::config::ConflictConfig,
) -> Result<(SyncEvent, FrontmatterEdges)> {
    let parsed = issue_from_document(doc);
    let edges = edges_from_document(doc);
    let payload_hash = payload_hash_for_issue(&parsed);

    let (to_store, outcome) = match cached {
        None => (parsed, SyncOutcome::Applied),
        Some(cached_issue) => {
            let fields = present_fields(doc);
            let changed = change_set(&fields, cached_issue, &parsed);
            if changed.is_empty() {
                (cached_issue.clone(), SyncOutcome::Ignored)
            } else {
                let mut file_view = cached_issue.clone();
                file_view.title = parsed.title.clone();
                file_view.body = parsed.body.clone();
                file_view.status = parsed.status.clone();
                file_view.priority = parsed.priority;
                file_view.issue_type = parsed.issue_type.clone();
                file_view.labels = parsed.labels.clone();
                file_view.assignees = parsed.assignees.clone();
                file_view.milestone_id = parsed.milestone_id.clone();
                file_view.updated_at = Utc::now();

                let winner = conflict::resolve(
                    conflict_config,
                    (cached_issue, Side::Beads),
                    (&file_view, Side::File),
                );
                (winner, SyncOutcome::Applied)
            }
        }
    };

    let issue_id = to_store.id.clone();
    let applied = match outcome {
        SyncOutcome::Ignored => Outcome::Unchanged,
        _ => storage.upsert(&to_store, None)?,
    };
    let outcome = match (&outcome, &applied) {
        (SyncOutcome::Ignored, _) => SyncOutcome::Ignored,
        (_, Outcome::Unchanged) => SyncOutcome::Ignored,
        _ => SyncOutcome::Applied,
    };

    let event = SyncEvent {
        id: 0,
        issue_id,
        direction: SyncDirection::FileToBeads,
        upstream: Upstream::File,
        payload_hash,
        outcome,
        error: None,
        created_at: Utc::now(),
    };
    storage.append_event(&event)?;
    Ok((event, edges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use beads_config::config::ConflictConfig;
    use beads_template::markdown;

    fn doc(content: &str) -> Document {
        markdown::parse(content).unwrap()
    }

    #[test]
    fn untracked_file_is_parsed_and_applied_as_is() {
        let parsed = issue_from_document(&doc("---\ntitle: New from file\n---\nbody\n"));
        assert_eq!(parsed.title, "New from file");
        assert!(parsed.id.is_empty());
    }

    #[test]
    fn change_set_excludes_fields_the_file_never_mentioned() {
        use beads_core::issue::IssueBuilder;
        let cached = IssueBuilder::new("Old title").id("bd-1").priority(3).build();
        let d = doc("---\nid: bd-1\ntitle: New title\n---\n");
        let parsed = issue_from_document(&d);
        let fields = present_fields(&d);
        let changed = change_set(&fields, &cached, &parsed);
        assert!(changed.contains("title"));
        assert!(!changed.contains("priority"));
    }

    #[test]
    fn edges_are_reported_separately_from_the_issue_diff() {
        let d = doc("---\nid: bd-1\ndepends_on: [bd-0]\n---\n");
        let edges = edges_from_document(&d);
        assert_eq!(edges.depends_on, vec!["bd-0".to_string()]);
    }

    #[allow(dead_code)]
    fn unused_conflict_config_reference(_c: &ConflictConfig) {}
}
