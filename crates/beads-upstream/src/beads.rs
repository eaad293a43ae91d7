//! Beads adapter (C7): reads `issues.jsonl` directly; writes shell out to
//! the `bd` CLI. The beads store is an external collaborator (§1) -- this
//! adapter never opens `.beads/*.db` itself.

use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;

use beads_core::enums::Status;
use beads_core::issue::Issue;
use beads_core::jsonl;

use crate::error::{Result, UpstreamError};

const DEFAULT_BD_BINARY: &str = "bd";

/// The closed patch set `update_issue` accepts, per SPEC_FULL §4.6.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeadsPatch {
    pub status: Option<Status>,
    pub priority: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub labels: Option<Vec<String>>,
    pub assignee: Option<String>,
}

/// A Beads adapter scoped to one repo's `.beads` directory.
pub struct BeadsClient {
    jsonl_path: PathBuf,
    bd_binary: String,
    cwd: PathBuf,
}

impl BeadsClient {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        let cwd = repo_dir.into();
        Self { jsonl_path: cwd.join(".beads").join("issues.jsonl"), bd_binary: DEFAULT_BD_BINARY.to_string(), cwd }
    }

    #[cfg(test)]
    fn with_binary(repo_dir: impl Into<PathBuf>, binary: impl Into<String>) -> Self {
        let mut client = Self::new(repo_dir);
        client.bd_binary = binary.into();
        client
    }
}

/// Reads every issue currently in `issues.jsonl`. A legacy row with
/// `status: "blocked"` (from before "blocked" became a DAG-derived property)
/// deserializes into `Status::Custom("blocked")`; it is normalized to `Open`
/// here so the issue still appears in `ready()`/`blocked()` (P2). `issues.jsonl`
/// carries no `depends_on` column of its own -- any blocker edge for such a row
/// lives in the store's `dep_edges` table already, reached through `Storage`
/// directly rather than this adapter.
pub fn read_issues(client: &BeadsClient) -> Result<Vec<Issue>> {
    let file = std::fs::File::open(&client.jsonl_path)?;
    let mut issues: Vec<Issue> = jsonl::read_jsonl(BufReader::new(file))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(UpstreamError::from)?;
    for issue in &mut issues {
        if matches!(&issue.status, Status::Custom(s) if s.eq_ignore_ascii_case("blocked")) {
            issue.status = Status::Open;
        }
    }
    Ok(issues)
}

pub fn update_issue(client: &BeadsClient, id: &str, patch: &BeadsPatch) -> Result<()> {
    let args = build_update_args(id, patch);
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    bd_command(&client.bd_binary, &arg_refs, &client.cwd)?;
    Ok(())
}

pub fn close_issue(client: &BeadsClient, id: &str) -> Result<()> {
    bd_command(&client.bd_binary, &["close", id], &client.cwd)?;
    Ok(())
}

/// Builds the `bd update <id> ...` argument list for `patch`. Pure, so it is
/// unit-testable independent of actually spawning a process.
fn build_update_args(id: &str, patch: &BeadsPatch) -> Vec<String> {
    let mut args = vec!["update".to_string(), id.to_string()];
    if let Some(status) = &patch.status {
        args.push("--status".to_string());
        args.push(status.as_str().to_string());
    }
    if let Some(priority) = patch.priority {
        args.push("--priority".to_string());
        args.push(priority.to_string());
    }
    if let Some(title) = &patch.title {
        args.push("--title".to_string());
        args.push(title.clone());
    }
    if let Some(description) = &patch.description {
        args.push("--description".to_string());
        args.push(description.clone());
    }
    if let Some(labels) = &patch.labels {
        args.push("--labels".to_string());
        args.push(labels.join(","));
    }
    if let Some(assignee) = &patch.assignee {
        args.push("--assignee".to_string());
        args.push(assignee.clone());
    }
    args
}

fn bd_command(binary: &str, args: &[&str], cwd: &Path) -> Result<String> {
    let output = Command::new(binary).args(args).current_dir(cwd).output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(UpstreamError::BeadsCli { code: output.status.code(), stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_update_args_includes_only_set_fields() {
        let patch = BeadsPatch { priority: Some(1), status: Some(Status::InProgress), ..Default::default() };
        let args = build_update_args("bd-1", &patch);
        assert_eq!(args, vec!["update", "bd-1", "--status", "in_progress", "--priority", "1"]);
    }

    #[test]
    fn build_update_args_joins_labels_with_commas() {
        let patch = BeadsPatch { labels: Some(vec!["bug".to_string(), "urgent".to_string()]), ..Default::default() };
        let args = build_update_args("bd-2", &patch);
        assert_eq!(args, vec!["update", "bd-2", "--labels", "bug,urgent"]);
    }

    #[test]
    fn empty_patch_produces_bare_update_args() {
        let args = build_update_args("bd-3", &BeadsPatch::default());
        assert_eq!(args, vec!["update", "bd-3"]);
    }

    #[test]
    fn bd_command_reports_nonzero_exit() {
        let client = BeadsClient::with_binary(std::env::temp_dir(), "false");
        let result = bd_command(&client.bd_binary, &["anything"], &client.cwd);
        assert!(matches!(result, Err(UpstreamError::BeadsCli { .. })));
    }

    #[test]
    fn read_issues_normalizes_legacy_blocked_status_to_open() {
        let repo_dir = std::env::temp_dir().join(format!("beads-upstream-test-{}", std::process::id()));
        let beads_dir = repo_dir.join(".beads");
        std::fs::create_dir_all(&beads_dir).unwrap();
        std::fs::write(
            beads_dir.join("issues.jsonl"),
            r#"{"id":"bd-1","title":"Old row","body":"","status":"blocked","issue_type":"task","priority":2,"labels":[],"assignees":[],"milestone_id":null,"epic_id":null,"external_refs":{},"created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z","closed_at":null,"close_reason":null}
"#,
        )
        .unwrap();

        let client = BeadsClient::new(&repo_dir);
        let issues = read_issues(&client).unwrap();
        std::fs::remove_dir_all(&repo_dir).unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].status, Status::Open);
    }
}
