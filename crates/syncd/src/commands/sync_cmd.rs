//! `syncd sync` (SPEC_FULL §6.3): one reconciliation pass across every
//! configured repo's `.todo ↔ beads` axis, then exit. The GitHub/Linear axes
//! need a resolved installation credential (C11), which only exists for the
//! lifetime of a running Coordinator -- those stay `syncd serve`'s job; a
//! one-shot CLI invocation reconciles the local file/beads axis only.

use std::fs;

use beads_config::config::{load_server_config, ConflictConfig};
use beads_storage::{SqliteStore, Storage};
use beads_template::markdown;

use crate::cli::GlobalArgs;
use crate::error::{CliError, Result};

pub fn run(global: &GlobalArgs) -> Result<()> {
    let config = load_server_config(&global.config)?;
    if config.repos.is_empty() {
        tracing::warn!("no repos configured in {}", global.config.display());
        return Ok(());
    }

    for repo in &config.repos {
        let db_path = format!("{}/state.db", repo.key().replace('/', "_"));
        let storage = SqliteStore::open(&db_path).map_err(|e| CliError::Config(e.to_string()))?;
        let reconciled = reconcile_todo_dir(&storage, &repo.conflict)?;
        tracing::info!(repo = %repo.key(), reconciled, "file<->beads axis reconciled");
    }

    Ok(())
}

fn reconcile_todo_dir(storage: &dyn Storage, conflict: &ConflictConfig) -> Result<usize> {
    let todo_dir = std::path::Path::new(".todo");
    if !todo_dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in fs::read_dir(todo_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let content = fs::read_to_string(&path)?;
        let doc = markdown::parse(&content)?;
        let id = beads_template::issue_from_document(&doc).id;
        let cached = if id.is_empty() { None } else { storage.get(&id).ok() };

        let (event, edges) = beads_sync::file_to_canonical(storage, &doc, cached.as_ref(), conflict)
            .map_err(|e| CliError::Upstream(e.to_string()))?;
        for blocker in &edges.depends_on {
            let _ = storage.add_edge(blocker, &event.issue_id, beads_core::enums::DependencyType::Blocks);
        }
        for blocked in &edges.blocks {
            let _ = storage.add_edge(&event.issue_id, blocked, beads_core::enums::DependencyType::Blocks);
        }
        count += 1;
    }
    Ok(count)
}
