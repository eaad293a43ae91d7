//! Shared Axum state (SPEC_FULL §6.2.1): the live Coordinator registry plus
//! the single repo context this process instance is currently bound to.
//!
//! `POST /context` is the only way to change the active repo; every other
//! route resolves its Coordinator against whatever was last set there. A
//! process can still *host* several repos at once (the registry is keyed by
//! `owner/name`), but the HTTP surface named in SPEC_FULL §6.2 addresses one
//! repo per server instance at a time, matching the table's bare paths
//! (no `{owner}/{repo}` prefix anywhere in it).

use std::sync::{Arc, RwLock};

use beads_config::config::{RepoContext, ServerConfig};
use beads_coordinator::{CoordinatorHandle, CoordinatorRegistry};
use beads_storage::SqliteStore;

use crate::http::error::ApiError;

pub struct AppState {
    pub config: ServerConfig,
    pub registry: Arc<CoordinatorRegistry>,
    current: RwLock<Option<RepoContext>>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            registry: Arc::new(CoordinatorRegistry::new()),
            current: RwLock::new(None),
        }
    }

    /// Sets the active repo context (`POST /context`) and spawns or reuses
    /// its Coordinator.
    pub fn set_context(&self, ctx: RepoContext) -> CoordinatorHandle {
        let handle = self.registry.get_or_spawn(ctx.clone(), open_storage);
        *self.current.write().expect("AppState.current lock poisoned") = Some(ctx);
        handle
    }

    /// The Coordinator for the currently active repo, if `POST /context` has
    /// been called at least once.
    pub fn current_handle(&self) -> Result<CoordinatorHandle, ApiError> {
        let ctx = self
            .current
            .read()
            .expect("AppState.current lock poisoned")
            .clone()
            .ok_or_else(|| ApiError::NoActiveContext)?;
        Ok(self
            .registry
            .get(&ctx.key())
            .expect("active context always has a spawned coordinator"))
    }
}

fn open_storage(ctx: &RepoContext) -> Arc<dyn beads_storage::Storage> {
    let path = format!("{}/state.db", ctx.key().replace('/', "_"));
    Arc::new(SqliteStore::open(&path).unwrap_or_else(|e| {
        panic!("failed to open store for {}: {e}", ctx.key());
    }))
}
