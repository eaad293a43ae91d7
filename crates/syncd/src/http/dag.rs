//! `GET /ready`, `/blocked`, `/critical-path` (SPEC_FULL §6.2): read-only DAG
//! oracle (C3) queries over a fresh snapshot of the active repo's issues.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use beads_core::issue::Issue;
use beads_query::DagView;

use crate::http::error::ApiError;
use crate::http::state::AppState;

fn snapshot(state: &AppState) -> Result<DagView, ApiError> {
    let handle = state.current_handle()?;
    let issues = handle.storage.list(&Default::default())?;
    let edges = handle.storage.all_edges()?;
    Ok(DagView::new(issues, edges))
}

pub async fn ready(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Issue>>, ApiError> {
    let dag = snapshot(&state)?;
    Ok(Json(beads_query::ready(&dag).into_iter().cloned().collect()))
}

pub async fn blocked(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Issue>>, ApiError> {
    let dag = snapshot(&state)?;
    Ok(Json(beads_query::blocked(&dag).into_iter().cloned().collect()))
}

pub async fn critical_path(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Issue>>, ApiError> {
    let dag = snapshot(&state)?;
    Ok(Json(beads_query::critical_path(&dag).into_iter().cloned().collect()))
}
