//! `/issues` resource routes (SPEC_FULL §6.2): list/create/fetch/update/
//! close/comment, all serialized through the active repo's Coordinator.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use beads_core::enums::{IssueType, Status};
use beads_core::filter::IssueFilter;
use beads_core::idgen::generate_hash_id;
use beads_core::issue::{Issue, IssueBuilder};
use chrono::Utc;
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::state::AppState;

/// `GET /issues` / `GET /issues?status=open&type=bug&priority=1&label=foo`.
pub async fn list_issues(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let handle = state.current_handle()?;
    let mut filter = IssueFilter::default();
    if let Some(s) = params.get("status") {
        filter.status = Some(Status::from(s.as_str()));
    }
    if let Some(t) = params.get("type") {
        filter.issue_type = Some(IssueType::from(t.as_str()));
    }
    if let Some(p) = params.get("priority").and_then(|p| p.parse().ok()) {
        filter.priority = Some(p);
    }
    if let Some(l) = params.get("label") {
        filter.labels_any = vec![l.clone()];
    }
    if let Some(a) = params.get("assignee") {
        filter.assignee = Some(a.clone());
    }
    if let Some(m) = params.get("milestone") {
        filter.milestone_id = Some(m.clone());
    }
    let issues = handle.storage.list(&filter)?;
    Ok(Json(issues))
}

/// `GET /issues/{id}`.
pub async fn get_issue(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<Issue>, ApiError> {
    let handle = state.current_handle()?;
    Ok(Json(handle.storage.get(&id)?))
}

#[derive(Debug, Deserialize)]
pub struct CreateIssueRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub milestone_id: Option<String>,
}

/// `POST /issues`. Ids are allocated here, never by `Storage::upsert`.
pub async fn create_issue(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateIssueRequest>,
) -> Result<Json<Issue>, ApiError> {
    let handle = state.current_handle()?;
    let id = generate_hash_id("bd", &req.title, &req.body, "api", Utc::now(), 6, 0);

    let mut builder = IssueBuilder::new(req.title)
        .id(id)
        .body(req.body)
        .priority(req.priority)
        .labels(req.labels)
        .assignees(req.assignees);
    if let Some(t) = req.issue_type {
        builder = builder.issue_type(IssueType::from(t.as_str()));
    }
    if let Some(m) = req.milestone_id {
        builder = builder.milestone_id(m);
    }
    let issue = builder.build();
    beads_core::validation::validate(&issue)?;

    let created = issue.clone();
    handle.write(move |storage| storage.upsert(&created, None).map(|_| ())).await?;
    Ok(Json(issue))
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateIssueRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i32>,
    pub issue_type: Option<String>,
    pub labels: Option<Vec<String>>,
    pub assignees: Option<Vec<String>>,
    pub milestone_id: Option<Option<String>>,
}

/// `PATCH /issues/{id}`. Reads the current row, applies only the fields the
/// caller set, then writes through the Coordinator with the read's
/// `updated_at` as an optimistic-concurrency guard.
pub async fn update_issue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateIssueRequest>,
) -> Result<Json<Issue>, ApiError> {
    let handle = state.current_handle()?;
    let mut issue = handle.storage.get(&id)?;
    let guard = issue.updated_at;

    if let Some(title) = req.title {
        issue.title = title;
    }
    if let Some(body) = req.body {
        issue.body = body;
    }
    if let Some(status) = req.status {
        issue.status = Status::from(status.as_str());
    }
    if let Some(priority) = req.priority {
        issue.priority = priority;
    }
    if let Some(issue_type) = req.issue_type {
        issue.issue_type = IssueType::from(issue_type.as_str());
    }
    if let Some(labels) = req.labels {
        issue.labels = labels;
    }
    if let Some(assignees) = req.assignees {
        issue.assignees = assignees;
    }
    if let Some(milestone_id) = req.milestone_id {
        issue.milestone_id = milestone_id;
    }
    issue.updated_at = Utc::now();
    beads_core::validation::validate(&issue)?;

    let updated = issue.clone();
    handle.write(move |storage| storage.upsert(&updated, Some(guard)).map(|_| ())).await?;
    Ok(Json(issue))
}

#[derive(Debug, Deserialize, Default)]
pub struct CloseIssueRequest {
    #[serde(default)]
    pub reason: String,
}

/// `POST /issues/{id}/close`.
pub async fn close_issue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CloseIssueRequest>,
) -> Result<Json<Issue>, ApiError> {
    let handle = state.current_handle()?;
    let reason = req.reason;
    let close_id = id.clone();
    handle.write(move |storage| storage.close(&close_id, &reason)).await?;
    Ok(Json(handle.storage.get(&id)?))
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub author: String,
    pub text: String,
}

/// `POST /issues/{id}/comments`. Mirroring the comment to mapped upstreams
/// is `beads-sync::orchestrator::mirror_comment_to_github`'s job, triggered
/// by the caller after this returns -- this route only persists the comment.
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddCommentRequest>,
) -> Result<Json<beads_core::comment::Comment>, ApiError> {
    let handle = state.current_handle()?;
    let (author, text) = (req.author, req.text);
    let comment_id = id.clone();
    handle
        .write(move |storage| storage.add_comment(&comment_id, &author, &text).map(|_| ()))
        .await?;
    let comments = handle.storage.get_comments(&id)?;
    let comment = comments.into_iter().last().ok_or_else(|| ApiError::Internal("comment vanished after write".into()))?;
    Ok(Json(comment))
}
