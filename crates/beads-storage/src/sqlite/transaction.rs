//! [`SqliteTx`] -- the [`Transaction`](crate::traits::Transaction) implementation
//! used inside `Storage::run_in_transaction`.

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use beads_core::comment::Comment;
use beads_core::enums::DependencyType;
use beads_core::issue::Issue;
use beads_core::sync_event::SyncEvent;

use crate::error::Result;
use crate::sqlite::{comments, dependencies, issues, sync_events};
use crate::traits::{Outcome, Transaction};

/// Borrows the connection for the duration of a single transaction.
pub(crate) struct SqliteTx<'a> {
    pub(crate) conn: &'a Connection,
}

impl<'a> Transaction for SqliteTx<'a> {
    fn get(&self, id: &str) -> Result<Issue> {
        issues::get_issue_on_conn(self.conn, id)
    }

    fn upsert(&self, issue: &Issue, guard: Option<DateTime<Utc>>) -> Result<Outcome> {
        issues::upsert_issue_on_conn(self.conn, issue, guard)
    }

    fn close(&self, id: &str, reason: &str) -> Result<()> {
        issues::close_issue_on_conn(self.conn, id, reason)
    }

    fn delete(&self, id: &str) -> Result<()> {
        issues::delete_issue_on_conn(self.conn, id)
    }

    fn add_edge(&self, from: &str, to: &str, kind: DependencyType) -> Result<()> {
        dependencies::add_edge_on_conn(self.conn, from, to, kind)
    }

    fn delete_edge(&self, from: &str, to: &str, kind: DependencyType) -> Result<()> {
        dependencies::delete_edge_on_conn(self.conn, from, to, kind)
    }

    fn add_comment(&self, issue_id: &str, author: &str, text: &str) -> Result<Comment> {
        comments::add_comment_on_conn(self.conn, issue_id, author, text)
    }

    fn append_event(&self, event: &SyncEvent) -> Result<i64> {
        sync_events::append_event_on_conn(self.conn, event)
    }
}
