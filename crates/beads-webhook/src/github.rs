//! GitHub webhook payload parsing: extracts the `(owner, name)` tenant key
//! and delivery metadata needed to route a verified payload to its
//! Coordinator (SPEC_FULL §4.8).

use serde::Deserialize;

use crate::error::ApiError;

/// Everything the ingress layer needs from one GitHub webhook delivery,
/// after signature verification.
#[derive(Debug, Clone)]
pub struct GitHubDelivery {
    pub delivery_id: String,
    pub event: String,
    pub owner: String,
    pub repo: String,
    pub payload: serde_json::Value,
}

#[derive(Deserialize)]
struct RepoEnvelope {
    repository: RepoField,
}

#[derive(Deserialize)]
struct RepoField {
    name: String,
    owner: OwnerField,
}

#[derive(Deserialize)]
struct OwnerField {
    login: String,
}

/// Parses a raw GitHub webhook body (already signature-verified) into a
/// [`GitHubDelivery`]. `delivery_id` and `event` come from the
/// `X-GitHub-Delivery`/`X-GitHub-Event` headers, which the extractor reads
/// before this function is called.
pub fn parse_github_delivery(delivery_id: &str, event: &str, body: &[u8]) -> Result<GitHubDelivery, ApiError> {
    let payload: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?;

    let envelope: RepoEnvelope = serde_json::from_value(payload.clone())
        .map_err(|e| ApiError::BadRequest(format!("missing repository field: {e}")))?;

    Ok(GitHubDelivery {
        delivery_id: delivery_id.to_string(),
        event: event.to_string(),
        owner: envelope.repository.owner.login,
        repo: envelope.repository.name,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_owner_and_repo_from_repository_field() {
        let body = br#"{"action":"opened","repository":{"name":"widgets","owner":{"login":"acme"}}}"#;
        let delivery = parse_github_delivery("abc-123", "issues", body).unwrap();
        assert_eq!(delivery.owner, "acme");
        assert_eq!(delivery.repo, "widgets");
        assert_eq!(delivery.delivery_id, "abc-123");
        assert_eq!(delivery.event, "issues");
    }

    #[test]
    fn rejects_payload_missing_repository() {
        let body = br#"{"action":"opened"}"#;
        assert!(parse_github_delivery("abc", "issues", body).is_err());
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(parse_github_delivery("abc", "issues", b"not json").is_err());
    }
}
