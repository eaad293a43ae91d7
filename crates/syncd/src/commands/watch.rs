//! `syncd watch` (SPEC_FULL §4.7 item 1/2, §5.1): watches `.todo/*.md` for
//! changes and pushes each one through `beads_sync::file_to_canonical`,
//! debounced 500 ms per file with a 100 ms stability window. The `notify`
//! crate setup mirrors `examples/ryanmaclean-tundra::at-core::file_watcher`,
//! adapted to a plain `std::sync::mpsc` channel since `crossbeam-channel` is
//! not in this workspace's dependency set.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use beads_config::config::ConflictConfig;
use beads_storage::{SqliteStore, Storage};
use beads_template::markdown;
use notify::{RecursiveMode, Watcher};

use crate::cli::WatchArgs;
use crate::error::{CliError, Result};

const DEBOUNCE: Duration = Duration::from_millis(500);
const STABILITY_WINDOW: Duration = Duration::from_millis(100);

pub fn run(args: &WatchArgs) -> Result<()> {
    let storage: Box<dyn Storage> = Box::new(
        SqliteStore::open(".beads/state.db").map_err(|e| CliError::Config(e.to_string()))?,
    );
    let conflict = ConflictConfig::default();

    let (tx, rx) = mpsc::channel::<notify::Result<notify::Event>>();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .map_err(|e| CliError::Config(e.to_string()))?;
    watcher
        .watch(&args.todo_dir, RecursiveMode::NonRecursive)
        .map_err(|e| CliError::Config(e.to_string()))?;

    tracing::info!(dir = %args.todo_dir.display(), "watching for .todo changes");

    let mut pending: HashMap<PathBuf, Instant> = HashMap::new();
    loop {
        if let Ok(Ok(event)) = rx.recv_timeout(STABILITY_WINDOW) {
            for path in event.paths {
                if path.extension().and_then(|e| e.to_str()) == Some("md") {
                    pending.insert(path, Instant::now());
                }
            }
        }

        let ready: Vec<PathBuf> = pending
            .iter()
            .filter(|(_, seen)| seen.elapsed() >= DEBOUNCE)
            .map(|(path, _)| path.clone())
            .collect();

        for path in ready {
            pending.remove(&path);
            if let Err(e) = reconcile_one(storage.as_ref(), &conflict, &path) {
                tracing::warn!(path = %path.display(), error = %e, "file reconciliation failed");
            }
        }
    }
}

fn reconcile_one(storage: &dyn Storage, conflict: &ConflictConfig, path: &PathBuf) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let content = std::fs::read_to_string(path)?;
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

    tracing::info!(path = %path.display(), issue_id = %event.issue_id, outcome = ?event.outcome, "reconciled file change");
    Ok(())
}
