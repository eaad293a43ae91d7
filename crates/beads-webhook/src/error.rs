//! HTTP error type for the webhook ingress surface (SPEC_FULL §4.8).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors the webhook ingress handlers can return, mapped to the status
/// codes SPEC_FULL §4.8 names: signature/timestamp failures are `401`,
/// an unrecognized tenant is `404`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("signature verification failed")]
    Unauthorized,

    #[error("webhook timestamp outside the replay window")]
    Expired,

    #[error("no active integration for this repository: {0}")]
    UnknownTenant(String),

    #[error("malformed webhook payload: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Expired => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::UnknownTenant(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
