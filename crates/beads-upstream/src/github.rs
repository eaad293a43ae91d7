//! GitHub adapter (C7): thin REST operations via `octocrab`, authenticated
//! with a short-lived installation token resolved from C11. No retries --
//! those live in the sync orchestrator (C8).

use beads_core::issue::{Issue, IssueBuilder};
use beads_core::milestone::Milestone;
use octocrab::Octocrab;

use crate::error::{Result, UpstreamError};
use crate::mapping;

const PAGE_SIZE: u8 = 100;

/// A GitHub REST client scoped to a single `owner/repo`.
pub struct GitHubClient {
    octocrab: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Builds a client authenticated with a short-lived installation token
    /// (resolved by the caller via C11; this adapter never performs the
    /// JWT/OAuth exchange itself).
    pub fn new(installation_token: impl Into<String>, owner: impl Into<String>, repo: impl Into<String>) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(installation_token.into())
            .build()?;
        Ok(Self { octocrab, owner: owner.into(), repo: repo.into() })
    }

    fn route(&self, path: &str) -> String {
        format!("/repos/{}/{}{path}", self.owner, self.repo)
    }
}

/// Lists issues for `repo`, excluding pull requests (which GitHub's issues
/// endpoint otherwise interleaves), paginated 100/page.
pub async fn list_issues(client: &GitHubClient, state: Option<&str>) -> Result<Vec<Issue>> {
    let mut handler = client.octocrab.issues(&client.owner, &client.repo).list().per_page(PAGE_SIZE);
    if let Some(state) = state {
        handler = handler.state(match state {
            "closed" => octocrab::params::State::Closed,
            "all" => octocrab::params::State::All,
            _ => octocrab::params::State::Open,
        });
    }

    let mut issues = Vec::new();
    let mut page = handler.send().await?;
    loop {
        for item in &page.items {
            if item.pull_request.is_none() {
                issues.push(github_issue_to_canonical(item));
            }
        }
        match client.octocrab.get_page::<octocrab::models::issues::Issue>(&page.next).await? {
            Some(next) => page = next,
            None => break,
        }
    }

    Ok(issues)
}

pub async fn get_issue(client: &GitHubClient, number: u64) -> Result<Issue> {
    let issue = client.octocrab.issues(&client.owner, &client.repo).get(number).await?;
    Ok(github_issue_to_canonical(&issue))
}

pub async fn create_issue(client: &GitHubClient, issue: &Issue) -> Result<Issue> {
    let labels = canonical_labels(issue);
    let created = client
        .octocrab
        .issues(&client.owner, &client.repo)
        .create(&issue.title)
        .body(&issue.body)
        .labels(labels)
        .send()
        .await?;
    Ok(github_issue_to_canonical(&created))
}

pub async fn update_issue(client: &GitHubClient, number: u64, issue: &Issue) -> Result<Issue> {
    let labels = canonical_labels(issue);
    let updated = client
        .octocrab
        .issues(&client.owner, &client.repo)
        .update(number)
        .title(&issue.title)
        .body(&issue.body)
        .state(match mapping::status_to_github_state(&issue.status) {
            "closed" => octocrab::models::IssueState::Closed,
            _ => octocrab::models::IssueState::Open,
        })
        .labels(&labels)
        .send()
        .await?;
    Ok(github_issue_to_canonical(&updated))
}

pub async fn close_issue(client: &GitHubClient, number: u64) -> Result<()> {
    client
        .octocrab
        .issues(&client.owner, &client.repo)
        .update(number)
        .state(octocrab::models::IssueState::Closed)
        .send()
        .await?;
    Ok(())
}

pub async fn add_comment(client: &GitHubClient, number: u64, body: &str) -> Result<()> {
    client.octocrab.issues(&client.owner, &client.repo).create_comment(number, body).await?;
    Ok(())
}

pub async fn list_milestones(client: &GitHubClient) -> Result<Vec<Milestone>> {
    let page: octocrab::Page<octocrab::models::Milestone> = client
        .octocrab
        .get(client.route("/milestones"), None::<&()>)
        .await?;

    Ok(page
        .items
        .into_iter()
        .map(|m| Milestone {
            id: m.number.to_string(),
            title: m.title,
            description: m.description.unwrap_or_default(),
            state: if m.state == "closed" {
                beads_core::enums::MilestoneState::Closed
            } else {
                beads_core::enums::MilestoneState::Open
            },
            due_at: m.due_on,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
        .collect())
}

/// Creates a branch ref pointing at `sha`. Octocrab has no high-level
/// builder for ref creation, so this posts the route directly, same as
/// `merge_pr`'s merge call below.
pub async fn create_branch(client: &GitHubClient, branch: &str, sha: &str) -> Result<()> {
    let body = serde_json::json!({ "ref": format!("refs/heads/{branch}"), "sha": sha });
    client
        .octocrab
        .post::<serde_json::Value, _, _>(client.route("/git/refs"), Some(&body))
        .await?;
    Ok(())
}

pub async fn create_pr(client: &GitHubClient, title: &str, head: &str, base: &str, body: &str) -> Result<u64> {
    let pr = client
        .octocrab
        .pulls(&client.owner, &client.repo)
        .create(title, head, base)
        .body(body)
        .send()
        .await?;
    Ok(pr.number)
}

pub async fn merge_pr(client: &GitHubClient, number: u64) -> Result<()> {
    client
        .octocrab
        .put::<serde_json::Value, _, _>(client.route(&format!("/pulls/{number}/merge")), Some(&serde_json::json!({})))
        .await?;
    Ok(())
}

fn canonical_labels(issue: &Issue) -> Vec<String> {
    // Strip labels this adapter itself derives (priority/type/in-progress)
    // before resynthesizing them, so round-tripping an issue doesn't pile up
    // duplicates across updates.
    let mut labels: Vec<String> = issue
        .labels
        .iter()
        .filter(|l| !is_derived_label(l))
        .cloned()
        .collect();
    labels.push(mapping::priority_to_github_label(issue.priority));
    if let Some(type_label) = mapping::issue_type_to_github_label(&issue.issue_type) {
        labels.push(type_label.to_string());
    }
    if let Some(status_label) = mapping::status_to_github_label(&issue.status) {
        labels.push(status_label.to_string());
    }
    labels
}

fn is_derived_label(label: &str) -> bool {
    matches!(label, "bug" | "feature" | "epic" | "chore" | "in-progress")
        || label.starts_with("priority:")
        || matches!(label.as_bytes(), [b'P' | b'p', rest @ ..] if rest.iter().all(u8::is_ascii_digit) && !rest.is_empty())
}

fn github_issue_to_canonical(issue: &octocrab::models::issues::Issue) -> Issue {
    let labels: Vec<String> = issue.labels.iter().map(|l| l.name.clone()).collect();
    let state = match issue.state {
        octocrab::models::IssueState::Closed => "closed",
        _ => "open",
    };

    let mut builder = IssueBuilder::new(issue.title.clone())
        .body(issue.body.clone().unwrap_or_default())
        .status(mapping::github_state_to_status(state, &labels))
        .issue_type(mapping::github_labels_to_issue_type(&labels))
        .priority(mapping::github_labels_to_priority(&labels))
        .external_ref("github", issue.number.to_string())
        .created_at(issue.created_at)
        .updated_at(issue.updated_at);

    if !issue.assignees.is_empty() {
        builder = builder.assignees(issue.assignees.iter().map(|a| a.login.clone()).collect());
    }

    builder.build()
}
