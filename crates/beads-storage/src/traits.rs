//! Storage and Transaction traits -- the public API for the issue store (C2,
//! SPEC_FULL §4.1). Consumers (the DAG oracle, the sync orchestrator, the
//! Coordinator, the HTTP API) depend on [`Storage`] rather than on
//! [`crate::sqlite::SqliteStore`] directly, so an in-memory or mock backend
//! can stand in for tests.

use chrono::{DateTime, Utc};

use beads_core::comment::Comment;
use beads_core::comment_mapping::CommentMapping;
use beads_core::dependency::DependencyEdge;
use beads_core::enums::{DependencyType, MilestoneState, Upstream};
use beads_core::filter::IssueFilter;
use beads_core::issue::Issue;
use beads_core::milestone::Milestone;
use beads_core::sync_event::SyncEvent;

use crate::error::Result;

// ---------------------------------------------------------------------------
// View / helper types
// ---------------------------------------------------------------------------

/// Typed partial-update struct for issues (`PATCH /issues/{id}`, SPEC_FULL §6.2).
///
/// Only `Some` fields are applied; `None` fields are left unchanged. Fields
/// that are themselves nullable in [`Issue`] use a nested `Option` so "leave
/// unchanged" and "set to null" are distinguishable.
#[derive(Debug, Clone, Default)]
pub struct IssueUpdates {
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<beads_core::enums::Status>,
    pub priority: Option<i32>,
    pub issue_type: Option<beads_core::enums::IssueType>,
    pub labels: Option<Vec<String>>,
    pub assignees: Option<Vec<String>>,
    pub milestone_id: Option<Option<String>>,
    pub epic_id: Option<Option<String>>,
    pub close_reason: Option<String>,
}

/// The result of `upsert`: whether the issue was newly created, modified, or
/// left as-is (identical content hash).
#[derive(Debug, Clone)]
pub enum Outcome {
    Created(Issue),
    Updated(Issue),
    Unchanged,
}

/// An issue with its associated dependency edge metadata, for tree/graph views.
#[derive(Debug, Clone)]
pub struct IssueWithDependencyMetadata {
    pub issue: Issue,
    pub dependency: DependencyEdge,
}

/// A node in a dependency tree traversal.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub issue: Issue,
    pub depth: i32,
    pub dep_type: DependencyType,
    pub reverse: bool,
}

/// Aggregate statistics about the issue database (`<Stats/>` component input).
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub total_issues: i64,
    pub open_issues: i64,
    pub in_progress_issues: i64,
    pub closed_issues: i64,
    pub by_type: Vec<(String, i64)>,
    pub by_priority: Vec<(i32, i64)>,
    pub by_assignee: Vec<(String, i64)>,
}

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// Primary storage interface for the issue store (C2).
///
/// All operations observe snapshot isolation; writes are serialized by the
/// enclosing Coordinator (§4.9), so an implementation never sees concurrent
/// writers and does not need to implement its own write queue.
pub trait Storage: Send + Sync {
    // -- Issue CRUD ------------------------------------------------------

    /// Retrieves an issue by its ID.
    fn get(&self, id: &str) -> Result<Issue>;

    /// Lists issues matching `filter`. An empty filter returns every issue.
    fn list(&self, filter: &IssueFilter) -> Result<Vec<Issue>>;

    /// Inserts or updates an issue. `guard` carries the caller's expected
    /// `updated_at` for optimistic concurrency: `Some(t)` fails with
    /// [`crate::error::StorageError::StaleWrite`] if the stored row's
    /// `updated_at` differs from `t`; `None` skips the check (used for
    /// first-time creation and trusted internal writes).
    fn upsert(&self, issue: &Issue, guard: Option<DateTime<Utc>>) -> Result<Outcome>;

    /// Closes an issue (idempotent: no effect if already closed).
    fn close(&self, id: &str, reason: &str) -> Result<()>;

    /// Permanently deletes an issue and its related rows.
    fn delete(&self, id: &str) -> Result<()>;

    /// Finds the local issue mapped to `(upstream, upstream_id)` (I5).
    fn find_by_ext(&self, upstream: Upstream, upstream_id: &str) -> Result<Issue>;

    // -- Dependency edges --------------------------------------------------

    /// Adds a `(from, to, kind)` edge. Fails with `Cycle` if the insertion
    /// would break I3, `SelfLoop` if it violates I2, `Missing` if either
    /// endpoint is absent.
    fn add_edge(&self, from: &str, to: &str, kind: DependencyType) -> Result<()>;

    /// Removes an edge (idempotent).
    fn delete_edge(&self, from: &str, to: &str, kind: DependencyType) -> Result<()>;

    /// Returns every dependency edge, for the DAG oracle's snapshot (§4.2.1).
    fn all_edges(&self) -> Result<Vec<DependencyEdge>>;

    // -- Milestones --------------------------------------------------------

    fn get_milestone(&self, id: &str) -> Result<Milestone>;
    fn list_milestones(&self, state: Option<MilestoneState>) -> Result<Vec<Milestone>>;
    fn upsert_milestone(&self, milestone: &Milestone) -> Result<()>;

    // -- Comments and comment mirroring (I7) --------------------------------

    fn add_comment(&self, issue_id: &str, author: &str, text: &str) -> Result<Comment>;
    fn get_comments(&self, issue_id: &str) -> Result<Vec<Comment>>;

    /// Records that `comment_id` was mirrored to `upstream` as
    /// `upstream_comment_id`, so a replayed delivery does not double-post.
    fn map_comment(&self, comment_id: i64, upstream: Upstream, upstream_comment_id: &str) -> Result<()>;

    /// Finds an existing mirror of `comment_id` on `upstream`, if any.
    fn find_comment_mapping(&self, comment_id: i64, upstream: Upstream) -> Result<Option<CommentMapping>>;

    // -- Sync ledger ---------------------------------------------------------

    /// Appends a ledger row and returns its assigned sequence number.
    fn append_event(&self, event: &SyncEvent) -> Result<i64>;

    /// Returns `true` if a `sync_events` row with this `payload_hash` and
    /// outcome `applied` already exists (duplicate-delivery detection, P3).
    fn has_applied_payload(&self, payload_hash: &str) -> Result<bool>;

    /// Returns ledger rows with id > `since_id`, in sequence order.
    fn events_since(&self, since_id: i64) -> Result<Vec<SyncEvent>>;

    // -- Statistics ------------------------------------------------------

    fn statistics(&self) -> Result<Statistics>;

    // -- Transactions ------------------------------------------------------

    /// Executes a closure within a database transaction. If the closure
    /// returns `Ok`, the transaction is committed; if it returns `Err` or
    /// panics, it is rolled back.
    fn run_in_transaction(&self, f: &dyn Fn(&dyn Transaction) -> Result<()>) -> Result<()>;

    // -- Lifecycle ---------------------------------------------------------

    fn close_store(&self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Transaction trait
// ---------------------------------------------------------------------------

/// Subset of [`Storage`] available inside a transaction. All operations share
/// a single connection and are committed or rolled back atomically.
pub trait Transaction {
    fn get(&self, id: &str) -> Result<Issue>;
    fn upsert(&self, issue: &Issue, guard: Option<DateTime<Utc>>) -> Result<Outcome>;
    fn close(&self, id: &str, reason: &str) -> Result<()>;
    fn delete(&self, id: &str) -> Result<()>;
    fn add_edge(&self, from: &str, to: &str, kind: DependencyType) -> Result<()>;
    fn delete_edge(&self, from: &str, to: &str, kind: DependencyType) -> Result<()>;
    fn add_comment(&self, issue_id: &str, author: &str, text: &str) -> Result<Comment>;
    fn append_event(&self, event: &SyncEvent) -> Result<i64>;
}
