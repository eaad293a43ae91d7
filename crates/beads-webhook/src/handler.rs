//! Axum ingress handlers (SPEC_FULL §4.8.1): raw-body extraction so the
//! exact signed bytes are verified before JSON deserialization, modeled on
//! `ryanmaclean-tundra::at-bridge`'s webhook/API handler layout. Handlers
//! hand off a verified, parsed delivery to a channel rather than calling
//! the Coordinator directly, so this crate carries no dependency on C10.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use tokio::sync::mpsc::Sender;

use crate::error::ApiError;
use crate::github::{self, GitHubDelivery};
use crate::linear::{self, LinearDelivery};
use crate::verify::{verify_github_signature, verify_linear_signature};

/// One verified, parsed inbound delivery, ready for Coordinator dispatch.
#[derive(Debug, Clone)]
pub enum IncomingEvent {
    GitHub(GitHubDelivery),
    Linear(LinearDelivery),
}

/// Shared state for the webhook routes: the two HMAC secrets and the
/// channel verified deliveries are pushed onto. The receiving end (held by
/// `syncd`) resolves `(owner, name)` to a Coordinator handle and enqueues
/// the write.
pub struct WebhookState {
    pub github_secret: Vec<u8>,
    pub linear_secret: Vec<u8>,
    pub sender: Sender<IncomingEvent>,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// `POST /webhooks/github`. Verifies `X-Hub-Signature-256`, parses the
/// delivery, and enqueues it. Returns `200` once durably enqueued -- the
/// spec requires acknowledging before sync completion, not after, so
/// retries from GitHub do not cascade into timeouts.
pub async fn github_webhook(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let signature = header_str(&headers, "x-hub-signature-256").ok_or(ApiError::Unauthorized)?;
    if !verify_github_signature(&state.github_secret, &body, signature) {
        return Err(ApiError::Unauthorized);
    }

    let delivery_id = header_str(&headers, "x-github-delivery").unwrap_or_default();
    let event = header_str(&headers, "x-github-event").unwrap_or_default();
    let delivery = github::parse_github_delivery(delivery_id, event, &body)?;

    tracing::info!(owner = %delivery.owner, repo = %delivery.repo, delivery_id = %delivery.delivery_id, "github webhook verified");

    state
        .sender
        .send(IncomingEvent::GitHub(delivery))
        .await
        .map_err(|e| ApiError::Internal(format!("dispatch channel closed: {e}")))?;

    Ok(StatusCode::OK)
}

/// `POST /webhooks/linear`. Verifies `Linear-Signature` and the 60 s replay
/// window on `webhookTimestamp`, parses the delivery, and enqueues it.
pub async fn linear_webhook(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let signature = header_str(&headers, "linear-signature").ok_or(ApiError::Unauthorized)?;
    if !verify_linear_signature(&state.linear_secret, &body, signature) {
        return Err(ApiError::Unauthorized);
    }

    let delivery = linear::parse_linear_delivery(&body)?;
    let now_millis = chrono::Utc::now().timestamp_millis();
    if !linear::is_fresh(&delivery, now_millis) {
        return Err(ApiError::Expired);
    }

    tracing::info!(team_id = %delivery.team_id, delivery_id = %delivery.delivery_id, "linear webhook verified");

    state
        .sender
        .send(IncomingEvent::Linear(delivery))
        .await
        .map_err(|e| ApiError::Internal(format!("dispatch channel closed: {e}")))?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    use tokio::sync::mpsc;

    fn sign(secret: &[u8], body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret).unwrap();
        mac.update(body);
        mac.finalize().into_bytes().iter().map(|b| format!("{b:02x}")).collect()
    }

    #[tokio::test]
    async fn github_webhook_enqueues_a_verified_delivery() {
        let (tx, mut rx) = mpsc::channel(1);
        let state = Arc::new(WebhookState { github_secret: b"secret".to_vec(), linear_secret: Vec::new(), sender: tx });

        let body = Bytes::from_static(br#"{"action":"opened","repository":{"name":"widgets","owner":{"login":"acme"}}}"#);
        let mut headers = HeaderMap::new();
        headers.insert("x-hub-signature-256", HeaderValue::from_str(&format!("sha256={}", sign(b"secret", &body))).unwrap());
        headers.insert("x-github-delivery", HeaderValue::from_static("d-1"));
        headers.insert("x-github-event", HeaderValue::from_static("issues"));

        let status = github_webhook(State(state), headers, body).await.unwrap();
        assert_eq!(status, StatusCode::OK);

        let IncomingEvent::GitHub(delivery) = rx.recv().await.unwrap() else { panic!("expected github event") };
        assert_eq!(delivery.owner, "acme");
        assert_eq!(delivery.repo, "widgets");
    }

    #[tokio::test]
    async fn github_webhook_rejects_bad_signature() {
        let (tx, _rx) = mpsc::channel(1);
        let state = Arc::new(WebhookState { github_secret: b"secret".to_vec(), linear_secret: Vec::new(), sender: tx });

        let body = Bytes::from_static(br#"{"repository":{"name":"widgets","owner":{"login":"acme"}}}"#);
        let mut headers = HeaderMap::new();
        headers.insert("x-hub-signature-256", HeaderValue::from_static("sha256=deadbeef"));

        let result = github_webhook(State(state), headers, body).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn linear_webhook_rejects_stale_timestamp() {
        let (tx, _rx) = mpsc::channel(1);
        let state = Arc::new(WebhookState { github_secret: Vec::new(), linear_secret: b"linear-secret".to_vec(), sender: tx });

        let old_timestamp = chrono::Utc::now().timestamp_millis() - 120_000;
        let body = Bytes::from(format!(
            r#"{{"webhookId":"wh-1","webhookTimestamp":{old_timestamp},"data":{{"team":{{"id":"team-1"}}}}}}"#
        ));
        let mut headers = HeaderMap::new();
        headers.insert("linear-signature", HeaderValue::from_str(&sign(b"linear-secret", &body)).unwrap());

        let result = linear_webhook(State(state), headers, body).await;
        assert!(matches!(result, Err(ApiError::Expired)));
    }
}
