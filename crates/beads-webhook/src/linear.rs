//! Linear webhook payload parsing and replay-window enforcement (SPEC_FULL
//! §4.8). Linear payloads carry no GitHub-style `owner/repo`; the tenant
//! mapping from a Linear team to a `(owner, name)` repo key is supplied by
//! the caller (the `syncd` binary, from its `ServerConfig.repos` list) and
//! looked up by `team_id` once this module extracts it from the payload.

use serde::Deserialize;

use crate::error::ApiError;
use crate::verify::within_replay_window;

const REPLAY_WINDOW_SECS: i64 = 60;

/// Everything the ingress layer needs from one Linear webhook delivery,
/// after signature verification.
#[derive(Debug, Clone)]
pub struct LinearDelivery {
    pub delivery_id: String,
    pub team_id: String,
    pub webhook_timestamp_millis: i64,
    pub payload: serde_json::Value,
}

#[derive(Deserialize)]
struct LinearEnvelope {
    #[serde(rename = "webhookId")]
    webhook_id: Option<String>,
    #[serde(rename = "webhookTimestamp")]
    webhook_timestamp: i64,
    data: LinearData,
}

#[derive(Deserialize)]
struct LinearData {
    team: Option<LinearTeam>,
}

#[derive(Deserialize)]
struct LinearTeam {
    id: String,
}

/// Parses a raw Linear webhook body (already signature-verified). Does
/// *not* check the replay window itself; call [`is_fresh`] with the caller's
/// notion of "now" once parsed.
pub fn parse_linear_delivery(body: &[u8]) -> Result<LinearDelivery, ApiError> {
    let payload: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?;

    let envelope: LinearEnvelope = serde_json::from_value(payload.clone())
        .map_err(|e| ApiError::BadRequest(format!("malformed Linear webhook envelope: {e}")))?;

    let team_id = envelope
        .data
        .team
        .map(|t| t.id)
        .ok_or_else(|| ApiError::BadRequest("webhook payload has no team".to_string()))?;

    Ok(LinearDelivery {
        delivery_id: envelope.webhook_id.unwrap_or_else(|| format!("linear:{}", envelope.webhook_timestamp)),
        team_id,
        webhook_timestamp_millis: envelope.webhook_timestamp,
        payload,
    })
}

/// Whether `delivery`'s `webhookTimestamp` falls inside the 60 s replay
/// window relative to `now_millis`.
pub fn is_fresh(delivery: &LinearDelivery, now_millis: i64) -> bool {
    within_replay_window(delivery.webhook_timestamp_millis, now_millis, REPLAY_WINDOW_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body(timestamp: i64) -> Vec<u8> {
        format!(
            r#"{{"webhookId":"wh-1","webhookTimestamp":{timestamp},"data":{{"team":{{"id":"team-42"}}}}}}"#
        )
        .into_bytes()
    }

    #[test]
    fn extracts_team_id_and_timestamp() {
        let delivery = parse_linear_delivery(&sample_body(1_700_000_000_000)).unwrap();
        assert_eq!(delivery.team_id, "team-42");
        assert_eq!(delivery.webhook_timestamp_millis, 1_700_000_000_000);
        assert_eq!(delivery.delivery_id, "wh-1");
    }

    #[test]
    fn freshness_check_rejects_old_timestamp() {
        let delivery = parse_linear_delivery(&sample_body(1_700_000_000_000)).unwrap();
        assert!(!is_fresh(&delivery, 1_700_000_000_000 + 90_000));
        assert!(is_fresh(&delivery, 1_700_000_000_000 + 10_000));
    }

    #[test]
    fn rejects_payload_missing_team() {
        let body = br#"{"webhookId":"wh-1","webhookTimestamp":1,"data":{}}"#;
        assert!(parse_linear_delivery(body).is_err());
    }
}
