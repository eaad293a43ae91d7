//! Linear adapter (C7): GraphQL read operations via `reqwest`. No generic
//! GraphQL client crate appears anywhere in the retrieved corpus, so queries
//! are hand-written strings posted as raw JSON bodies. No write operations
//! are in scope (SPEC_FULL non-goals) -- Linear writes never originate here.

use beads_core::issue::{Issue, IssueBuilder};
use serde::Deserialize;
use serde_json::json;

use crate::error::{Result, UpstreamError};
use crate::mapping;

const DEFAULT_ENDPOINT: &str = "https://api.linear.app/graphql";

/// A Linear GraphQL client authenticated with an OAuth bearer token (read
/// from a secrets vault by the caller; this adapter only carries it).
pub struct LinearClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl LinearClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), endpoint: DEFAULT_ENDPOINT.to_string(), token: token.into() }
    }

    #[cfg(test)]
    fn with_endpoint(token: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), endpoint: endpoint.into(), token: token.into() }
    }

    async fn query(&self, query: &str, variables: serde_json::Value) -> Result<serde_json::Value> {
        let body = json!({ "query": query, "variables": variables });
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;

        if let Some(errors) = response.get("errors") {
            return Err(UpstreamError::LinearGraphql(errors.to_string()));
        }
        response
            .get("data")
            .cloned()
            .ok_or_else(|| UpstreamError::LinearGraphql("response had no data field".to_string()))
    }
}

const QUERY_LIST_ISSUES: &str = r#"
query($teamId: String!, $after: String) {
  team(id: $teamId) {
    issues(first: 50, after: $after) {
      nodes { id title description priority state { type } }
      pageInfo { hasNextPage endCursor }
    }
  }
}
"#;

const QUERY_GET_ISSUE: &str = r#"
query($id: String!) {
  issue(id: $id) { id title description priority state { type } }
}
"#;

const QUERY_LIST_CYCLES: &str = r#"
query($teamId: String!) {
  team(id: $teamId) {
    cycles { nodes { id name startsAt endsAt } }
  }
}
"#;

const QUERY_VIEWER: &str = r#"
query { viewer { id name email } }
"#;

#[derive(Debug, Clone, Deserialize)]
struct LinearIssueNode {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    priority: i32,
    state: LinearStateNode,
}

#[derive(Debug, Clone, Deserialize)]
struct LinearStateNode {
    #[serde(rename = "type")]
    state_type: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PageInfo {
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
    #[serde(rename = "endCursor")]
    end_cursor: Option<String>,
}

/// A Linear cycle (sprint). Read-only, used for reporting/reference.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearCycle {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "startsAt")]
    pub starts_at: String,
    #[serde(rename = "endsAt")]
    pub ends_at: String,
}

/// The token-owning Linear user, confirming the credential is valid.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearViewer {
    pub id: String,
    pub name: String,
    pub email: String,
}

pub async fn list_issues(client: &LinearClient, team_id: &str, cursor: Option<&str>) -> Result<(Vec<Issue>, Option<String>)> {
    let data = client
        .query(QUERY_LIST_ISSUES, json!({ "teamId": team_id, "after": cursor }))
        .await?;

    let issues_obj = data.get("team").and_then(|t| t.get("issues")).cloned().unwrap_or(serde_json::Value::Null);
    let nodes: Vec<LinearIssueNode> = serde_json::from_value(issues_obj.get("nodes").cloned().unwrap_or_default())
        .map_err(|_| UpstreamError::LinearGraphql("malformed issues.nodes".to_string()))?;
    let page_info: Option<PageInfo> = issues_obj.get("pageInfo").cloned().and_then(|v| serde_json::from_value(v).ok());

    let issues = nodes.into_iter().map(linear_node_to_canonical).collect();
    let next_cursor = page_info.filter(|p| p.has_next_page).and_then(|p| p.end_cursor);

    Ok((issues, next_cursor))
}

pub async fn get_issue(client: &LinearClient, id: &str) -> Result<Issue> {
    let data = client.query(QUERY_GET_ISSUE, json!({ "id": id })).await?;
    let node: LinearIssueNode = serde_json::from_value(data.get("issue").cloned().unwrap_or_default())
        .map_err(|_| UpstreamError::LinearGraphql("malformed issue".to_string()))?;
    Ok(linear_node_to_canonical(node))
}

pub async fn list_cycles(client: &LinearClient, team_id: &str) -> Result<Vec<LinearCycle>> {
    let data = client.query(QUERY_LIST_CYCLES, json!({ "teamId": team_id })).await?;
    let nodes = data.get("team").and_then(|t| t.get("cycles")).and_then(|c| c.get("nodes")).cloned().unwrap_or_default();
    serde_json::from_value(nodes).map_err(|_| UpstreamError::LinearGraphql("malformed cycles".to_string()))
}

pub async fn get_viewer(client: &LinearClient) -> Result<LinearViewer> {
    let data = client.query(QUERY_VIEWER, serde_json::Value::Null).await?;
    serde_json::from_value(data.get("viewer").cloned().unwrap_or_default())
        .map_err(|_| UpstreamError::LinearGraphql("malformed viewer".to_string()))
}

fn linear_node_to_canonical(node: LinearIssueNode) -> Issue {
    IssueBuilder::new(node.title)
        .body(node.description)
        .status(mapping::linear_state_type_to_status(&node.state_type))
        .priority(mapping::linear_priority_to_canonical(node.priority))
        .external_ref("linear", node.id)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_client_carries_configured_endpoint() {
        let client = LinearClient::with_endpoint("secret-token", "https://example.test/graphql");
        assert_eq!(client.endpoint, "https://example.test/graphql");
    }

    #[test]
    fn linear_node_maps_to_canonical_issue() {
        let node = LinearIssueNode {
            id: "lin-1".to_string(),
            title: "Fix it".to_string(),
            description: "desc".to_string(),
            priority: 1,
            state: LinearStateNode { state_type: "started".to_string() },
        };
        let issue = linear_node_to_canonical(node);
        assert_eq!(issue.title, "Fix it");
        assert_eq!(issue.status, beads_core::enums::Status::InProgress);
        assert_eq!(issue.priority, 0);
        assert_eq!(issue.external_refs.get("linear"), Some(&"lin-1".to_string()));
    }
}
