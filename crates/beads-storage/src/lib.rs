//! Storage backend for the beads system.
//!
//! Provides the [`Storage`] trait and a SQLite implementation ([`SqliteStore`]).

pub mod error;
pub mod sqlite;
pub mod traits;

// Re-exports for convenience.
pub use error::StorageError;
pub use sqlite::SqliteStore;
pub use traits::{
    IssueUpdates, IssueWithDependencyMetadata, Outcome, Statistics, Storage, Transaction, TreeNode,
};

// ---------------------------------------------------------------------------
// Storage trait implementation for SqliteStore
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};

use beads_core::comment::Comment;
use beads_core::comment_mapping::CommentMapping;
use beads_core::dependency::DependencyEdge;
use beads_core::enums::{DependencyType, MilestoneState, Upstream};
use beads_core::filter::IssueFilter;
use beads_core::issue::Issue;
use beads_core::milestone::Milestone;
use beads_core::sync_event::SyncEvent;

use crate::error::{Result, StorageError};
use crate::sqlite::transaction::SqliteTx;
use crate::sqlite::{comments, dependencies, issues, milestones, sync_events};

impl Storage for SqliteStore {
    fn get(&self, id: &str) -> Result<Issue> {
        issues::get_issue_on_conn(&self.lock_conn()?, id)
    }

    fn list(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        issues::list_issues_on_conn(&self.lock_conn()?, filter)
    }

    fn upsert(&self, issue: &Issue, guard: Option<DateTime<Utc>>) -> Result<Outcome> {
        issues::upsert_issue_on_conn(&self.lock_conn()?, issue, guard)
    }

    fn close(&self, id: &str, reason: &str) -> Result<()> {
        issues::close_issue_on_conn(&self.lock_conn()?, id, reason)
    }

    fn delete(&self, id: &str) -> Result<()> {
        issues::delete_issue_on_conn(&self.lock_conn()?, id)
    }

    fn find_by_ext(&self, upstream: Upstream, upstream_id: &str) -> Result<Issue> {
        issues::find_by_ext_on_conn(&self.lock_conn()?, upstream, upstream_id)
    }

    fn add_edge(&self, from: &str, to: &str, kind: DependencyType) -> Result<()> {
        dependencies::add_edge_on_conn(&self.lock_conn()?, from, to, kind)
    }

    fn delete_edge(&self, from: &str, to: &str, kind: DependencyType) -> Result<()> {
        dependencies::delete_edge_on_conn(&self.lock_conn()?, from, to, kind)
    }

    fn all_edges(&self) -> Result<Vec<DependencyEdge>> {
        dependencies::all_edges_on_conn(&self.lock_conn()?)
    }

    fn get_milestone(&self, id: &str) -> Result<Milestone> {
        milestones::get_milestone_on_conn(&self.lock_conn()?, id)
    }

    fn list_milestones(&self, state: Option<MilestoneState>) -> Result<Vec<Milestone>> {
        milestones::list_milestones_on_conn(&self.lock_conn()?, state)
    }

    fn upsert_milestone(&self, milestone: &Milestone) -> Result<()> {
        milestones::upsert_milestone_on_conn(&self.lock_conn()?, milestone)
    }

    fn add_comment(&self, issue_id: &str, author: &str, text: &str) -> Result<Comment> {
        comments::add_comment_on_conn(&self.lock_conn()?, issue_id, author, text)
    }

    fn get_comments(&self, issue_id: &str) -> Result<Vec<Comment>> {
        comments::get_comments_on_conn(&self.lock_conn()?, issue_id)
    }

    fn map_comment(
        &self,
        comment_id: i64,
        upstream: Upstream,
        upstream_comment_id: &str,
    ) -> Result<()> {
        comments::map_comment_on_conn(&self.lock_conn()?, comment_id, upstream, upstream_comment_id)
    }

    fn find_comment_mapping(
        &self,
        comment_id: i64,
        upstream: Upstream,
    ) -> Result<Option<CommentMapping>> {
        comments::find_comment_mapping_on_conn(&self.lock_conn()?, comment_id, upstream)
    }

    fn append_event(&self, event: &SyncEvent) -> Result<i64> {
        sync_events::append_event_on_conn(&self.lock_conn()?, event)
    }

    fn has_applied_payload(&self, payload_hash: &str) -> Result<bool> {
        sync_events::has_applied_payload_on_conn(&self.lock_conn()?, payload_hash)
    }

    fn events_since(&self, since_id: i64) -> Result<Vec<SyncEvent>> {
        sync_events::events_since_on_conn(&self.lock_conn()?, since_id)
    }

    fn statistics(&self) -> Result<Statistics> {
        issues::statistics_on_conn(&self.lock_conn()?)
    }

    fn run_in_transaction(&self, f: &dyn Fn(&dyn Transaction) -> Result<()>) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| StorageError::Transaction(e.to_string()))?;
        // `rusqlite::Transaction` derefs to `Connection`, so the `*_on_conn`
        // helpers run unmodified against it.
        let handle = SqliteTx { conn: &tx };
        f(&handle)?;
        tx.commit().map_err(|e| StorageError::Transaction(e.to_string()))?;
        Ok(())
    }

    fn close_store(&self) -> Result<()> {
        // SQLite connections are closed when the Connection is dropped;
        // the Mutex wrapper exists only to make SqliteStore Sync.
        Ok(())
    }
}
