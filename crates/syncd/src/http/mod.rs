//! Axum HTTP API (SPEC_FULL §6.2/§6.2.1): one module per resource, state
//! shared via `State<Arc<AppState>>`. Module split grounded on
//! `ryanmaclean-tundra::at-bridge::http_api`'s per-resource layout,
//! generalized to this system's smaller route table.

pub mod context;
pub mod dag;
pub mod deps;
pub mod error;
pub mod health;
pub mod issues;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/context", post(context::set_context))
        .route("/issues", get(issues::list_issues).post(issues::create_issue))
        .route("/issues/{id}", get(issues::get_issue).patch(issues::update_issue))
        .route("/issues/{id}/close", post(issues::close_issue))
        .route("/issues/{id}/comments", post(issues::add_comment))
        .route("/ready", get(dag::ready))
        .route("/blocked", get(dag::blocked))
        .route("/critical-path", get(dag::critical_path))
        .route("/deps", post(deps::modify_dependency))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
