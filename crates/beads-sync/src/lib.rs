//! Sync orchestrator (C8): reconciles the canonical issue store against
//! `.todo/*.md` files, GitHub, and Linear along the four axes named in
//! SPEC_FULL §4.7, with conflict resolution, idempotent replay handling,
//! and retry-with-backoff for transient upstream failures.

pub mod conflict;
pub mod diff;
pub mod error;
pub mod files;
pub mod idempotency;
pub mod orchestrator;
pub mod retry;

pub use conflict::{resolve, Side};
pub use error::{ErrorKind, Result, SyncError};
pub use files::{file_to_canonical, FrontmatterEdges};
pub use orchestrator::{mirror_comment_to_github, pull_github, pull_linear, push_github};
pub use retry::{retry_with_backoff, DEFAULT_MAX_ATTEMPTS};
