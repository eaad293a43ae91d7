//! `POST /context` (SPEC_FULL §6.2): set `(owner, name, installation_id)`.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use beads_config::config::RepoContext;
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetContextRequest {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub installation_id: Option<String>,
}

pub async fn set_context(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetContextRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let ctx = RepoContext {
        owner: req.owner,
        name: req.name,
        installation_id: req.installation_id,
        default_branch: "main".to_string(),
        conflict: Default::default(),
    };
    let handle = state.set_context(ctx.clone());
    tracing::info!(repo = %ctx.key(), "active context set");
    Ok(Json(serde_json::json!({ "repo": ctx.key(), "state": format!("{:?}", handle.state()) })))
}
