//! Bridges the Markdown adapter (C5) to the canonical [`Issue`] model: parses
//! a frontmatter [`Document`] into a partial issue for the files -> beads
//! reconciliation axis (SPEC_FULL §4.7.2), the counterpart to
//! [`crate::render`]'s `issue_to_document`.

use std::collections::HashSet;

use beads_core::issue::{Issue, IssueBuilder};

use crate::markdown::{Document, YamlValue};
use crate::pattern::{parse_issue_type, parse_status};

/// Recognized `depends_on`/`blocks` edges lifted out of frontmatter, since
/// they describe dependency graph edges rather than `Issue` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontmatterEdges {
    pub depends_on: Vec<String>,
    pub blocks: Vec<String>,
}

/// `status` is a closed `{open, in_progress, closed}` set at storage; a
/// legacy `status: blocked` row (from before "blocked" became a derived DAG
/// property) is normalized to `open` here. The corresponding `blocks` edge,
/// if any, is recovered separately from `depends_on` by
/// [`edges_from_document`] and applied by the caller.
fn normalize_legacy_status(raw: &str) -> beads_core::enums::Status {
    if raw.eq_ignore_ascii_case("blocked") {
        beads_core::enums::Status::Open
    } else {
        parse_status(raw)
    }
}

fn as_string_list(value: Option<&YamlValue>) -> Vec<String> {
    value
        .and_then(YamlValue::as_list)
        .map(|items| items.iter().filter_map(YamlValue::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Builds an [`Issue`] from a parsed frontmatter document. Fields absent
/// from frontmatter take [`Issue`]'s defaults, so callers diffing against a
/// cached last-known state should intersect with the frontmatter's actual
/// key set (see `beads_sync::diff::change_set`) rather than trust every
/// field here as authoritative.
pub fn issue_from_document(doc: &Document) -> Issue {
    let title = doc
        .frontmatter
        .get("title")
        .and_then(YamlValue::as_str)
        .unwrap_or_default();

    let mut builder = IssueBuilder::new(title).body(doc.body.clone());

    if let Some(id) = doc.frontmatter.get("id").or_else(|| doc.frontmatter.get("beads_id")).and_then(YamlValue::as_str) {
        builder = builder.id(id);
    }
    if let Some(status) = doc.frontmatter.get("status").and_then(YamlValue::as_str) {
        builder = builder.status(normalize_legacy_status(status));
    }
    if let Some(YamlValue::Int(priority)) = doc.frontmatter.get("priority") {
        builder = builder.priority(*priority as i32);
    }
    if let Some(issue_type) = doc.frontmatter.get("type").and_then(YamlValue::as_str) {
        builder = builder.issue_type(parse_issue_type(issue_type));
    }
    builder = builder.labels(as_string_list(doc.frontmatter.get("labels")));
    builder = builder.assignees(as_string_list(doc.frontmatter.get("assignees")));
    if let Some(milestone) = doc.frontmatter.get("milestone").and_then(YamlValue::as_str) {
        builder = builder.milestone_id(milestone);
    }

    let mut issue = builder.build();

    for entry in as_string_list(doc.frontmatter.get("external_refs")) {
        if let Some((upstream, id)) = entry.split_once('=') {
            issue.external_refs.insert(upstream.to_string(), id.to_string());
        }
    }
    if let Some(github_id) = doc.frontmatter.get("github_id").and_then(YamlValue::as_str) {
        issue.external_refs.insert("github".to_string(), github_id.to_string());
    }

    issue
}

/// Lifts `depends_on`/`blocks` frontmatter arrays out as edges, since they
/// are not `Issue` fields.
pub fn edges_from_document(doc: &Document) -> FrontmatterEdges {
    FrontmatterEdges {
        depends_on: as_string_list(doc.frontmatter.get("depends_on")),
        blocks: as_string_list(doc.frontmatter.get("blocks")),
    }
}

/// The set of frontmatter keys actually present in `doc`, mapped to the
/// `Issue`-field names `beads_sync::diff` works with, for computing a
/// caller-authoritative change set (SPEC_FULL §4.7.2).
pub fn present_fields(doc: &Document) -> HashSet<&'static str> {
    const KNOWN: &[(&str, &str)] = &[
        ("title", "title"),
        ("status", "status"),
        ("priority", "priority"),
        ("type", "issue_type"),
        ("labels", "labels"),
        ("assignees", "assignees"),
        ("milestone", "milestone_id"),
    ];
    KNOWN
        .iter()
        .filter(|(fm_key, _)| doc.frontmatter.contains_key(*fm_key))
        .map(|(_, field)| *field)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown;

    #[test]
    fn parses_known_scalar_fields() {
        let content = "---\nid: bd-1\ntitle: Fix it\nstatus: in_progress\npriority: 1\ntype: bug\n---\nBody text\n";
        let doc = markdown::parse(content).unwrap();
        let issue = issue_from_document(&doc);
        assert_eq!(issue.id, "bd-1");
        assert_eq!(issue.title, "Fix it");
        assert_eq!(issue.priority, 1);
        assert_eq!(issue.body, "Body text\n");
    }

    #[test]
    fn parses_external_refs_and_github_id_alias() {
        let content = "---\nexternal_refs: [github=42, linear=abc]\n---\n";
        let doc = markdown::parse(content).unwrap();
        let issue = issue_from_document(&doc);
        assert_eq!(issue.external_refs.get("github"), Some(&"42".to_string()));
        assert_eq!(issue.external_refs.get("linear"), Some(&"abc".to_string()));
    }

    #[test]
    fn legacy_blocked_status_normalizes_to_open() {
        let content = "---\nstatus: blocked\ndepends_on: [bd-1]\n---\n";
        let doc = markdown::parse(content).unwrap();
        let issue = issue_from_document(&doc);
        assert_eq!(issue.status, beads_core::enums::Status::Open);
        let edges = edges_from_document(&doc);
        assert_eq!(edges.depends_on, vec!["bd-1".to_string()]);
    }

    #[test]
    fn lifts_depends_on_and_blocks_as_edges_not_fields() {
        let content = "---\ndepends_on: [bd-1]\nblocks: [bd-2, bd-3]\n---\n";
        let doc = markdown::parse(content).unwrap();
        let edges = edges_from_document(&doc);
        assert_eq!(edges.depends_on, vec!["bd-1".to_string()]);
        assert_eq!(edges.blocks, vec!["bd-2".to_string(), "bd-3".to_string()]);
    }

    #[test]
    fn present_fields_only_includes_keys_actually_in_frontmatter() {
        let content = "---\ntitle: X\npriority: 2\n---\n";
        let doc = markdown::parse(content).unwrap();
        let present = present_fields(&doc);
        assert!(present.contains("title"));
        assert!(present.contains("priority"));
        assert!(!present.contains("status"));
    }
}
