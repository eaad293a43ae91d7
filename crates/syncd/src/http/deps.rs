//! `POST /deps` (SPEC_FULL §6.2): add or remove a dependency edge.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use beads_core::enums::DependencyType;
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepAction {
    Add,
    Remove,
}

#[derive(Debug, Deserialize)]
pub struct DepRequest {
    pub action: DepAction,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub kind: Option<String>,
}

/// `422` on `Cycle`/`SelfLoop`, `404` if either endpoint is missing --
/// mapped by `http::error::ApiError::from(StorageError)`.
pub async fn modify_dependency(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DepRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let handle = state.current_handle()?;
    let kind = DependencyType::from(req.kind.as_deref().unwrap_or("blocks"));

    let (from, to) = (req.from, req.to);
    match req.action {
        DepAction::Add => {
            handle.write(move |storage| storage.add_edge(&from, &to, kind)).await?;
        }
        DepAction::Remove => {
            handle.write(move |storage| storage.delete_edge(&from, &to, kind)).await?;
        }
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}
