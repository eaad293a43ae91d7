//! `GET /healthz` (SPEC_FULL §6.2.1): liveness only, no dependency checks --
//! grounded on `ryanmaclean-tundra`'s health endpoints.

use axum::http::StatusCode;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
