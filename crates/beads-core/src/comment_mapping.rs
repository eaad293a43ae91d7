//! `CommentMapping` -- tracks which canonical comment mirrors to which upstream
//! comment, so the orchestrator updates in place instead of posting duplicates
//! (SPEC_FULL §3.1.1, §4.7 `canonical_to_linear_comment`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::Upstream;

/// Links a canonical `Comment` to its mirrored representation on an upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentMapping {
    pub comment_id: i64,

    pub upstream: Upstream,

    /// Opaque id of the mirrored comment on the upstream system.
    pub upstream_comment_id: String,

    pub synced_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_mapping_serde_roundtrip() {
        let m = CommentMapping {
            comment_id: 7,
            upstream: Upstream::Linear,
            upstream_comment_id: "linear-comment-uuid".into(),
            synced_at: Utc::now(),
        };
        let json = serde_json::to_string(&m).unwrap();
        let back: CommentMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back.upstream, Upstream::Linear);
        assert_eq!(back.upstream_comment_id, "linear-comment-uuid");
    }
}
