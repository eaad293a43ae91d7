//! Template renderer (C6): expands `{name}` variable interpolations and a
//! closed set of component tags (`<Issues.Ready/>`, `<Stats/>`, ...) against
//! a snapshot of issues and the DAG oracle. Total: unknown variables remain
//! as `{name}` literals, unknown tags remain verbatim.

use std::collections::HashMap;

use beads_core::enums::Status;
use beads_core::issue::Issue;
use beads_query::{self as query, DagView};

use crate::error::Result;
use crate::markdown::{self, Document, YamlValue};
use crate::pattern::Pattern;

const DEFAULT_READY_LIMIT: usize = 10;

/// Everything the renderer needs to expand component tags: the full issue
/// set, a DAG snapshot, and (for per-issue templates) the issue currently
/// being rendered.
pub struct RenderContext<'a> {
    pub issues: &'a [Issue],
    pub dag: &'a DagView,
    pub this: Option<&'a Issue>,
}

/// Renders `template` (an opening YAML frontmatter block used for `{name}`
/// interpolation, followed by body text with component tags) against `ctx`.
pub fn render(template: &str, ctx: &RenderContext) -> Result<String> {
    let doc = markdown::parse(template)?;
    let vars: HashMap<String, String> = doc
        .frontmatter
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect();
    Ok(render_body(&doc.body, &vars, ctx))
}

fn render_body(body: &str, vars: &HashMap<String, String>, ctx: &RenderContext) -> String {
    let mut out = String::new();
    let mut remaining = body;

    loop {
        match remaining.find(['<', '{']) {
            None => {
                out.push_str(remaining);
                break;
            }
            Some(idx) => {
                out.push_str(&remaining[..idx]);
                let rest = &remaining[idx..];

                if let Some(tail) = rest.strip_prefix('{') {
                    match tail.find('}') {
                        Some(end) => {
                            let name = &tail[..end];
                            match vars.get(name) {
                                Some(value) => out.push_str(value),
                                None => {
                                    out.push('{');
                                    out.push_str(name);
                                    out.push('}');
                                }
                            }
                            remaining = &tail[end + 1..];
                        }
                        None => {
                            out.push('{');
                            remaining = tail;
                        }
                    }
                } else {
                    let tail = &rest[1..];
                    match tail.find('>') {
                        Some(end) => {
                            let inner = &tail[..end];
                            match inner.strip_suffix('/').map(|s| render_tag(s.trim(), ctx)) {
                                Some(Some(rendered)) => {
                                    out.push_str(&rendered);
                                    remaining = &tail[end + 1..];
                                }
                                _ => {
                                    out.push('<');
                                    out.push_str(&tail[..end + 1]);
                                    remaining = &tail[end + 1..];
                                }
                            }
                        }
                        None => {
                            out.push('<');
                            remaining = tail;
                        }
                    }
                }
            }
        }
    }

    out
}

fn render_tag(tag: &str, ctx: &RenderContext) -> Option<String> {
    let mut parts = tag.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("");
    let attrs = parts.next().unwrap_or("").trim();

    match name {
        "Issues.Open" => Some(render_issue_list(
            ctx.issues.iter().filter(|i| i.status == Status::Open),
        )),
        "Issues.Closed" => Some(render_issue_list(
            ctx.issues.iter().filter(|i| i.status == Status::Closed),
        )),
        "Issues.InProgress" => Some(render_issue_list(
            ctx.issues.iter().filter(|i| i.status == Status::InProgress),
        )),
        "Issues.Ready" => {
            let limit = parse_limit(attrs).unwrap_or(DEFAULT_READY_LIMIT);
            let ready = query::ready(ctx.dag);
            Some(render_issue_list(ready.into_iter().take(limit)))
        }
        "Issues.Blocked" => Some(render_issue_list(query::blocked(ctx.dag).into_iter())),
        "Issues" => Some(render_issue_list(ctx.issues.iter())),
        "Stats" => Some(render_stats(ctx.issues)),
        "Subtasks" => ctx.this.map(|this| {
            render_issue_list(
                ctx.issues
                    .iter()
                    .filter(|i| i.epic_id.as_deref() == Some(this.id.as_str())),
            )
        }),
        "RelatedIssues" => ctx.this.map(|this| render_related(this, ctx)),
        "Progress" => ctx.this.map(|this| render_progress(this, ctx)),
        "Timeline" => ctx.this.map(render_timeline),
        _ => None,
    }
}

fn parse_limit(attrs: &str) -> Option<usize> {
    let rest = attrs.strip_prefix("limit=")?;
    let rest = rest.trim().strip_prefix('{')?;
    let rest = rest.strip_suffix('}')?;
    rest.trim().parse().ok()
}

fn render_issue_list<'a>(issues: impl Iterator<Item = &'a Issue>) -> String {
    let lines: Vec<String> = issues.map(render_issue_line).collect();
    if lines.is_empty() {
        "_No issues_".to_string()
    } else {
        lines.join("\n")
    }
}

fn render_issue_line(issue: &Issue) -> String {
    let checkbox = match issue.status {
        Status::Closed => "[x]",
        Status::InProgress => "[-]",
        Status::Open | Status::Custom(_) => "[ ]",
    };
    let mut line = format!(
        "- {checkbox} **{}**: {} (P{})",
        issue.id,
        escape_inline_tags(&issue.title),
        issue.priority
    );
    if !issue.labels.is_empty() {
        line.push_str(&format!(" [{}]", issue.labels.join(", ")));
    }
    line
}

/// Component tags inside an issue's own title/body must not be expanded by
/// the outer renderer -- wrap anything that looks like one in an inline
/// code span so it is preserved verbatim.
fn escape_inline_tags(text: &str) -> String {
    if text.contains('<') && text.contains("/>") {
        format!("`{text}`")
    } else {
        text.to_string()
    }
}

fn render_stats(issues: &[Issue]) -> String {
    let total = issues.len();
    let open = issues.iter().filter(|i| i.status == Status::Open).count();
    let in_progress = issues.iter().filter(|i| i.status == Status::InProgress).count();
    let closed = issues.iter().filter(|i| i.status == Status::Closed).count();
    let percent = if total == 0 { 0 } else { closed * 100 / total };

    format!("**{open} open** · {in_progress} in progress · {closed} closed · {total} total ({percent}% complete)")
}

fn render_related(this: &Issue, ctx: &RenderContext) -> String {
    let mut lines = Vec::new();
    for id in ctx.dag.blockers(&this.id).iter().chain(ctx.dag.blocks(&this.id)) {
        let Some(issue) = ctx.issues.iter().find(|i| &i.id == id) else {
            continue;
        };
        let glyph = if issue.status == Status::Closed { "✓" } else { "○" };
        lines.push(format!("- {glyph} **{}**: {}", issue.id, issue.title));
    }
    if lines.is_empty() {
        "_No issues_".to_string()
    } else {
        lines.join("\n")
    }
}

fn render_progress(this: &Issue, ctx: &RenderContext) -> String {
    let children: Vec<&Issue> = ctx
        .issues
        .iter()
        .filter(|i| i.epic_id.as_deref() == Some(this.id.as_str()))
        .collect();
    let total = children.len();
    let closed = children.iter().filter(|i| i.status == Status::Closed).count();
    let filled = if total == 0 { 0 } else { (closed * 20 + total / 2) / total };
    let bar: String = "#".repeat(filled) + &"-".repeat(20 - filled);
    format!("[{bar}] {closed}/{total}")
}

fn render_timeline(this: &Issue) -> String {
    format!(
        "Created {} · Updated {}",
        this.created_at.to_rfc3339(),
        this.updated_at.to_rfc3339()
    )
}

// ---------------------------------------------------------------------------
// Multi-output rendering (frontmatter `outputs` list, glob per-issue files)
// ---------------------------------------------------------------------------

/// One rendered file: its output path and content.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedOutput {
    pub path: String,
    pub content: String,
}

/// Expands the template's `outputs` frontmatter list in declaration order.
/// A literal path (no `*`) is rendered once against the whole issue set. A
/// glob path (containing `*`) is expanded once per issue via the file
/// pattern engine (C4) and the Markdown adapter (C5).
pub fn render_outputs(template: &str, ctx: &RenderContext, pattern: &Pattern) -> Result<Vec<RenderedOutput>> {
    let doc = markdown::parse(template)?;
    let outputs = doc
        .frontmatter
        .get("outputs")
        .and_then(YamlValue::as_list)
        .map(|items| items.iter().filter_map(YamlValue::as_str).map(str::to_string).collect())
        .unwrap_or_else(|| vec!["TODO.md".to_string()]);

    let mut rendered = Vec::new();
    for output in outputs {
        if output.contains('*') {
            for issue in ctx.issues {
                let filename = pattern.emit(issue);
                let path = output.replacen('*', filename.trim_end_matches(".md"), 1);
                let per_issue_ctx = RenderContext {
                    issues: ctx.issues,
                    dag: ctx.dag,
                    this: Some(issue),
                };
                rendered.push(RenderedOutput {
                    path,
                    content: markdown::emit(&issue_to_document(issue, ctx.dag, &per_issue_ctx)),
                });
            }
        } else {
            rendered.push(RenderedOutput {
                path: output,
                content: render(template, ctx)?,
            });
        }
    }

    Ok(rendered)
}

fn issue_to_document(issue: &Issue, dag: &DagView, _ctx: &RenderContext) -> Document {
    let mut doc = Document::default();
    doc.frontmatter.insert("id".to_string(), YamlValue::Str(issue.id.clone()));
    doc.frontmatter.insert("title".to_string(), YamlValue::Str(issue.title.clone()));
    doc.frontmatter.insert("status".to_string(), YamlValue::Str(issue.status.as_str().to_string()));
    doc.frontmatter.insert("priority".to_string(), YamlValue::Int(issue.priority as i64));
    doc.frontmatter.insert("type".to_string(), YamlValue::Str(issue.issue_type.as_str().to_string()));
    doc.frontmatter.insert(
        "labels".to_string(),
        YamlValue::List(issue.labels.iter().cloned().map(YamlValue::Str).collect()),
    );
    doc.frontmatter.insert(
        "assignees".to_string(),
        YamlValue::List(issue.assignees.iter().cloned().map(YamlValue::Str).collect()),
    );
    doc.frontmatter.insert(
        "milestone".to_string(),
        issue.milestone_id.clone().map(YamlValue::Str).unwrap_or(YamlValue::Null),
    );
    doc.frontmatter.insert(
        "depends_on".to_string(),
        YamlValue::List(dag.blockers(&issue.id).iter().cloned().map(YamlValue::Str).collect()),
    );
    doc.frontmatter.insert(
        "blocks".to_string(),
        YamlValue::List(dag.blocks(&issue.id).iter().cloned().map(YamlValue::Str).collect()),
    );
    let mut refs: Vec<String> = issue
        .external_refs
        .iter()
        .map(|(upstream, id)| format!("{upstream}={id}"))
        .collect();
    refs.sort();
    doc.frontmatter
        .insert("external_refs".to_string(), YamlValue::List(refs.into_iter().map(YamlValue::Str).collect()));
    doc.body = issue.body.clone();
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use beads_core::dependency::DependencyEdge;
    use beads_core::enums::DependencyType;
    use beads_core::issue::IssueBuilder;
    use chrono::Utc;

    fn sample_issues() -> Vec<Issue> {
        vec![
            IssueBuilder::new("Open one").id("bd-a").build(),
            {
                let mut i = IssueBuilder::new("Closed one").id("bd-b").build();
                i.status = Status::Closed;
                i
            },
        ]
    }

    #[test]
    fn interpolates_known_vars_and_leaves_unknown_literal() {
        let template = "---\nproject: Widgets\n---\n\n# {project}\n\nOwner: {owner}\n";
        let issues = sample_issues();
        let dag = DagView::new(issues.clone(), vec![]);
        let ctx = RenderContext { issues: &issues, dag: &dag, this: None };

        let out = render(template, &ctx).unwrap();
        assert!(out.contains("# Widgets"));
        assert!(out.contains("Owner: {owner}"));
    }

    #[test]
    fn renders_issues_open_and_closed_tags() {
        let template = "---\n---\n\n<Issues.Open/>\n\n<Issues.Closed/>\n";
        let issues = sample_issues();
        let dag = DagView::new(issues.clone(), vec![]);
        let ctx = RenderContext { issues: &issues, dag: &dag, this: None };

        let out = render(template, &ctx).unwrap();
        assert!(out.contains("**bd-a**"));
        assert!(out.contains("**bd-b**"));
    }

    #[test]
    fn empty_list_renders_no_issues_placeholder() {
        let template = "---\n---\n\n<Issues.InProgress/>\n";
        let issues = sample_issues();
        let dag = DagView::new(issues.clone(), vec![]);
        let ctx = RenderContext { issues: &issues, dag: &dag, this: None };

        let out = render(template, &ctx).unwrap();
        assert!(out.contains("_No issues_"));
    }

    #[test]
    fn unknown_tag_remains_verbatim() {
        let template = "---\n---\n\n<Totally.Unknown/>\n";
        let issues = sample_issues();
        let dag = DagView::new(issues.clone(), vec![]);
        let ctx = RenderContext { issues: &issues, dag: &dag, this: None };

        let out = render(template, &ctx).unwrap();
        assert!(out.contains("<Totally.Unknown/>"));
    }

    #[test]
    fn ready_tag_respects_limit_attribute() {
        let issues: Vec<Issue> = (0..3)
            .map(|n| IssueBuilder::new(format!("Issue {n}")).id(format!("bd-{n}")).build())
            .collect();
        let dag = DagView::new(issues.clone(), vec![]);
        let ctx = RenderContext { issues: &issues, dag: &dag, this: None };

        let template = "---\n---\n\n<Issues.Ready limit={2}/>\n";
        let out = render(template, &ctx).unwrap();
        let count = out.matches("**bd-").count();
        assert_eq!(count, 2);
    }

    #[test]
    fn stats_tag_reports_counts_and_percent() {
        let issues = sample_issues();
        let dag = DagView::new(issues.clone(), vec![]);
        let ctx = RenderContext { issues: &issues, dag: &dag, this: None };

        let out = render("---\n---\n\n<Stats/>\n", &ctx).unwrap();
        assert!(out.contains("**1 open**"));
        assert!(out.contains("1 closed"));
        assert!(out.contains("2 total"));
        assert!(out.contains("50% complete"));
    }

    #[test]
    fn progress_bar_reflects_closed_fraction() {
        let epic = IssueBuilder::new("Epic").id("bd-epic").build();
        let mut child_a = IssueBuilder::new("Child A").id("bd-ca").epic_id("bd-epic").build();
        child_a.status = Status::Closed;
        let child_b = IssueBuilder::new("Child B").id("bd-cb").epic_id("bd-epic").build();
        let issues = vec![epic.clone(), child_a, child_b];
        let dag = DagView::new(issues.clone(), vec![]);
        let ctx = RenderContext { issues: &issues, dag: &dag, this: Some(&epic) };

        let out = render("---\n---\n\n<Progress/>\n", &ctx).unwrap();
        assert!(out.contains("1/2"));
    }

    #[test]
    fn related_issues_shows_glyphs_for_both_directions() {
        let a = IssueBuilder::new("A").id("bd-a").build();
        let mut b = IssueBuilder::new("B").id("bd-b").build();
        b.status = Status::Closed;
        let c = IssueBuilder::new("C").id("bd-c").build();
        let edges = vec![
            DependencyEdge { from: "bd-b".into(), to: "bd-a".into(), kind: DependencyType::Blocks, created_at: Utc::now(), created_by: String::new() },
            DependencyEdge { from: "bd-a".into(), to: "bd-c".into(), kind: DependencyType::Blocks, created_at: Utc::now(), created_by: String::new() },
        ];
        let issues = vec![a.clone(), b, c];
        let dag = DagView::new(issues.clone(), edges);
        let ctx = RenderContext { issues: &issues, dag: &dag, this: Some(&a) };

        let out = render("---\n---\n\n<RelatedIssues/>\n", &ctx).unwrap();
        assert!(out.contains("✓ **bd-b**"));
        assert!(out.contains("○ **bd-c**"));
    }
}
