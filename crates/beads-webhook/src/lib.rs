//! Webhook ingress (C9): signature verification, replay-window enforcement,
//! and payload parsing for GitHub and Linear deliveries (SPEC_FULL §4.8).
//! Routing the verified delivery to a repo's Coordinator is the caller's
//! responsibility -- this crate only authenticates and parses.

pub mod error;
pub mod github;
pub mod handler;
pub mod linear;
pub mod verify;

pub use error::ApiError;
pub use github::GitHubDelivery;
pub use handler::{github_webhook, linear_webhook, IncomingEvent, WebhookState};
pub use linear::LinearDelivery;
pub use verify::{verify_github_signature, verify_linear_signature, within_replay_window};
