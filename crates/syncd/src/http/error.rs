//! HTTP error mapping for the Coordinator's REST surface (SPEC_FULL §6.2):
//! `409` for `StaleWrite`, `422` for `Cycle`/`SelfLoop`, `404` for not-found.
//! Grounded on `beads-webhook::error::ApiError`'s `IntoResponse` shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use beads_coordinator::CoordinatorError;
use beads_storage::StorageError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("stale write: expected {expected}, actual {actual}")]
    StaleWrite { expected: String, actual: String },

    #[error("dependency cycle between {from} and {to}")]
    Cycle { from: String, to: String },

    #[error("self-referential dependency on {0}")]
    SelfLoop(String),

    #[error("no active repo context -- call POST /context first")]
    NoActiveContext,

    #[error("coordinator is not accepting writes")]
    NotAccepting,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { entity, id } => Self::NotFound(format!("{entity} {id}")),
            StorageError::Missing { id } => Self::NotFound(id),
            StorageError::StaleWrite { expected, actual, .. } => Self::StaleWrite { expected, actual },
            StorageError::Cycle { from, to } => Self::Cycle { from, to },
            StorageError::SelfLoop { id } => Self::SelfLoop(id),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<beads_core::validation::ValidationError> for ApiError {
    fn from(e: beads_core::validation::ValidationError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<CoordinatorError> for ApiError {
    fn from(e: CoordinatorError) -> Self {
        match e {
            CoordinatorError::Storage(e) => e.into(),
            CoordinatorError::NotAccepting(..) => Self::NotAccepting,
            CoordinatorError::ActorGone(repo) => Self::Internal(format!("coordinator actor gone: {repo}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StaleWrite { .. } => StatusCode::CONFLICT,
            ApiError::Cycle { .. } | ApiError::SelfLoop(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NoActiveContext => StatusCode::PRECONDITION_REQUIRED,
            ApiError::NotAccepting => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
