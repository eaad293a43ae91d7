//! SQLite-backed storage implementation.

pub(crate) mod comments;
pub(crate) mod dependencies;
pub(crate) mod issues;
pub(crate) mod milestones;
pub(crate) mod sync_events;
pub mod schema;
mod store;
pub(crate) mod transaction;

pub use store::SqliteStore;
