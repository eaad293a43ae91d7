//! Registry of live Coordinators, keyed by `owner/name` (SPEC_FULL §4.9.1).
//!
//! One process may host Coordinators for several repos at once; the registry
//! spawns a Coordinator lazily on first access and hands out the same handle
//! to every subsequent caller for that repo.

use std::sync::Arc;

use beads_config::config::RepoContext;
use beads_storage::traits::Storage;
use dashmap::DashMap;

use crate::coordinator::{self, CoordinatorHandle};

/// Live Coordinators for this process, keyed by [`RepoContext::key`].
#[derive(Default)]
pub struct CoordinatorRegistry {
    coordinators: DashMap<String, CoordinatorHandle>,
}

impl CoordinatorRegistry {
    pub fn new() -> Self {
        Self {
            coordinators: DashMap::new(),
        }
    }

    /// Returns the Coordinator for `ctx`, spawning one via `open_storage` if
    /// none exists yet. `open_storage` is only invoked on a cache miss.
    pub fn get_or_spawn(
        &self,
        ctx: RepoContext,
        open_storage: impl FnOnce(&RepoContext) -> Arc<dyn Storage>,
    ) -> CoordinatorHandle {
        self.coordinators
            .entry(ctx.key())
            .or_insert_with(|| {
                let storage = open_storage(&ctx);
                coordinator::spawn(ctx, storage)
            })
            .clone()
    }

    /// Returns the Coordinator for `key`, if one is already running.
    pub fn get(&self, key: &str) -> Option<CoordinatorHandle> {
        self.coordinators.get(key).map(|entry| entry.clone())
    }

    /// Drains and removes the Coordinator for `key`, if any.
    pub async fn remove(&self, key: &str) -> Option<CoordinatorHandle> {
        let (_, handle) = self.coordinators.remove(key)?;
        handle.shutdown().await;
        Some(handle)
    }

    pub fn len(&self) -> usize {
        self.coordinators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beads_config::config::ConflictConfig;
    use beads_storage::error::Result as StorageResult;
    use beads_storage::traits::*;
    use chrono::{DateTime, Utc};

    struct EmptyStore;

    #[allow(unused_variables)]
    impl Storage for EmptyStore {
        fn get(&self, id: &str) -> StorageResult<beads_core::issue::Issue> {
            Err(beads_storage::error::StorageError::not_found("issue", id))
        }
        fn list(&self, _filter: &beads_core::filter::IssueFilter) -> StorageResult<Vec<beads_core::issue::Issue>> {
            Ok(Vec::new())
        }
        fn upsert(
            &self,
            issue: &beads_core::issue::Issue,
            _guard: Option<DateTime<Utc>>,
        ) -> StorageResult<Outcome> {
            Ok(Outcome::Created(issue.clone()))
        }
        fn close(&self, _id: &str, _reason: &str) -> StorageResult<()> {
            Ok(())
        }
        fn delete(&self, _id: &str) -> StorageResult<()> {
            Ok(())
        }
        fn find_by_ext(
            &self,
            _upstream: beads_core::enums::Upstream,
            upstream_id: &str,
        ) -> StorageResult<beads_core::issue::Issue> {
            Err(beads_storage::error::StorageError::not_found("issue", upstream_id))
        }
        fn add_edge(&self, _from: &str, _to: &str, _kind: beads_core::enums::DependencyType) -> StorageResult<()> {
            Ok(())
        }
        fn delete_edge(&self, _from: &str, _to: &str, _kind: beads_core::enums::DependencyType) -> StorageResult<()> {
            Ok(())
        }
        fn all_edges(&self) -> StorageResult<Vec<beads_core::dependency::DependencyEdge>> {
            Ok(Vec::new())
        }
        fn get_milestone(&self, id: &str) -> StorageResult<beads_core::milestone::Milestone> {
            Err(beads_storage::error::StorageError::not_found("milestone", id))
        }
        fn list_milestones(
            &self,
            _state: Option<beads_core::enums::MilestoneState>,
        ) -> StorageResult<Vec<beads_core::milestone::Milestone>> {
            Ok(Vec::new())
        }
        fn upsert_milestone(&self, _milestone: &beads_core::milestone::Milestone) -> StorageResult<()> {
            Ok(())
        }
        fn add_comment(&self, _issue_id: &str, _author: &str, _text: &str) -> StorageResult<beads_core::comment::Comment> {
            Err(beads_storage::error::StorageError::Internal("no comments".into()))
        }
        fn get_comments(&self, _issue_id: &str) -> StorageResult<Vec<beads_core::comment::Comment>> {
            Ok(Vec::new())
        }
        fn map_comment(
            &self,
            _comment_id: i64,
            _upstream: beads_core::enums::Upstream,
            _upstream_comment_id: &str,
        ) -> StorageResult<()> {
            Ok(())
        }
        fn find_comment_mapping(
            &self,
            _comment_id: i64,
            _upstream: beads_core::enums::Upstream,
        ) -> StorageResult<Option<beads_core::comment_mapping::CommentMapping>> {
            Ok(None)
        }
        fn append_event(&self, _event: &beads_core::sync_event::SyncEvent) -> StorageResult<i64> {
            Ok(1)
        }
        fn has_applied_payload(&self, _payload_hash: &str) -> StorageResult<bool> {
            Ok(false)
        }
        fn events_since(&self, _since_id: i64) -> StorageResult<Vec<beads_core::sync_event::SyncEvent>> {
            Ok(Vec::new())
        }
        fn statistics(&self) -> StorageResult<Statistics> {
            Ok(Statistics::default())
        }
        fn run_in_transaction(&self, _f: &dyn Fn(&dyn Transaction) -> StorageResult<()>) -> StorageResult<()> {
            Ok(())
        }
        fn close_store(&self) -> StorageResult<()> {
            Ok(())
        }
    }

    fn ctx(name: &str) -> RepoContext {
        RepoContext {
            owner: "acme".into(),
            name: name.into(),
            installation_id: None,
            default_branch: "main".into(),
            conflict: ConflictConfig::default(),
        }
    }

    #[tokio::test]
    async fn get_or_spawn_reuses_the_same_handle_for_the_same_repo() {
        let registry = CoordinatorRegistry::new();
        let a = registry.get_or_spawn(ctx("widgets"), |_| Arc::new(EmptyStore));
        let b = registry.get_or_spawn(ctx("widgets"), |_| Arc::new(EmptyStore));
        assert_eq!(a.ctx.key(), b.ctx.key());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn different_repos_get_distinct_coordinators() {
        let registry = CoordinatorRegistry::new();
        registry.get_or_spawn(ctx("widgets"), |_| Arc::new(EmptyStore));
        registry.get_or_spawn(ctx("gadgets"), |_| Arc::new(EmptyStore));
        assert_eq!(registry.len(), 2);
    }
}
