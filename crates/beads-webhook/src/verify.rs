//! HMAC-SHA256 signature verification over the raw request body (SPEC_FULL
//! §4.8.1), grounded on `shipper-webhook`'s `hmac` 0.12 + `sha2` signing
//! pattern, reversed for verification: digest the raw body with the shared
//! secret and compare via `hmac::Mac::verify_slice`'s constant-time check
//! rather than a manual byte-equality loop.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Decodes a hex string into bytes. Hand-rolled: no `hex` crate is present
/// in the retrieved corpus.
fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

/// Verifies GitHub's `X-Hub-Signature-256` header, of the form
/// `sha256=<hex-digest>`, over the exact raw request body.
pub fn verify_github_signature(secret: &[u8], body: &[u8], signature_header: &str) -> bool {
    let Some(hex_digest) = signature_header.strip_prefix("sha256=") else {
        return false;
    };
    verify_hex_digest(secret, body, hex_digest)
}

/// Verifies Linear's `Linear-Signature` header, a bare hex digest (no
/// `sha256=` prefix) over the raw request body.
pub fn verify_linear_signature(secret: &[u8], body: &[u8], signature_header: &str) -> bool {
    verify_hex_digest(secret, body, signature_header)
}

fn verify_hex_digest(secret: &[u8], body: &[u8], hex_digest: &str) -> bool {
    let Some(expected) = decode_hex(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Linear webhooks carry a `webhookTimestamp` (Unix millis) that must fall
/// within `window_secs` of `now` to guard against replay (SPEC_FULL §4.8:
/// 60 s window).
pub fn within_replay_window(webhook_timestamp_millis: i64, now_millis: i64, window_secs: i64) -> bool {
    let window_millis = window_secs * 1000;
    (now_millis - webhook_timestamp_millis).abs() <= window_millis
}
