//! The per-repo Coordinator actor (SPEC_FULL §4.9): serializes writes
//! through a single task while letting reads go straight to storage.

use std::sync::{Arc, RwLock};

use beads_config::config::RepoContext;
use beads_storage::traits::Storage;
use tokio::sync::{mpsc, oneshot};

use crate::error::{CoordinatorError, Result};
use crate::state::CoordinatorState;

type WriteFn = Box<dyn FnOnce(&dyn Storage) -> beads_storage::error::Result<()> + Send + 'static>;

struct WriteJob {
    f: WriteFn,
    reply: oneshot::Sender<beads_storage::error::Result<()>>,
}

/// Handle to a running Coordinator. Cheap to clone; every clone shares the
/// same write queue and storage handle.
#[derive(Clone)]
pub struct CoordinatorHandle {
    pub ctx: RepoContext,
    pub storage: Arc<dyn Storage>,
    write_tx: mpsc::Sender<WriteJob>,
    state: Arc<RwLock<CoordinatorState>>,
}

impl CoordinatorHandle {
    /// Current lifecycle state.
    pub fn state(&self) -> CoordinatorState {
        *self.state.read().expect("coordinator state lock poisoned")
    }

    /// Queue a write to run on the Coordinator's serialized actor loop, and
    /// await its result. Rejected up front if the Coordinator isn't `Active`.
    pub async fn write<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&dyn Storage) -> beads_storage::error::Result<()> + Send + 'static,
    {
        if !self.state().accepts_writes() {
            return Err(CoordinatorError::NotAccepting(
                self.ctx.name.clone(),
                self.state(),
            ));
        }
        let (reply_tx, reply_rx) = oneshot::channel();
        let job = WriteJob {
            f: Box::new(f),
            reply: reply_tx,
        };
        self.write_tx
            .send(job)
            .await
            .map_err(|_| CoordinatorError::ActorGone(self.ctx.name.clone()))?;
        reply_rx
            .await
            .map_err(|_| CoordinatorError::ActorGone(self.ctx.name.clone()))?
            .map_err(CoordinatorError::Storage)
    }

    /// Begin draining: stop accepting new writes, let queued ones finish,
    /// then mark the Coordinator `Closing`. `storage.close_store()` is left
    /// to the caller since the registry owns shared storage lifetime.
    pub async fn shutdown(&self) {
        *self
            .state
            .write()
            .expect("coordinator state lock poisoned") = CoordinatorState::Draining;
        // A drained no-op write can only complete once every job queued
        // before this one has run, so awaiting it is enough to know the
        // actor loop has caught up.
        let _ = self.write(|_storage| Ok(())).await;
        *self
            .state
            .write()
            .expect("coordinator state lock poisoned") = CoordinatorState::Closing;
    }
}

/// Spawn a Coordinator actor for `ctx`, backed by `storage`. Transitions
/// Attach -> Loading -> Active before the returned handle's writes are
/// accepted; reads against `storage` are valid immediately since they never
/// go through the write queue.
pub fn spawn(ctx: RepoContext, storage: Arc<dyn Storage>) -> CoordinatorHandle {
    let state = Arc::new(RwLock::new(CoordinatorState::Attach));
    let (write_tx, mut write_rx) = mpsc::channel::<WriteJob>(64);

    let actor_state = state.clone();
    let actor_storage = storage.clone();
    let repo_name = ctx.name.clone();
    tokio::spawn(async move {
        *actor_state
            .write()
            .expect("coordinator state lock poisoned") = CoordinatorState::Loading;
        tracing::debug!(repo = %repo_name, "coordinator loading");

        *actor_state
            .write()
            .expect("coordinator state lock poisoned") = CoordinatorState::Active;
        tracing::info!(repo = %repo_name, "coordinator active");

        while let Some(job) = write_rx.recv().await {
            let result = (job.f)(actor_storage.as_ref());
            let _ = job.reply.send(result);
        }

        tracing::info!(repo = %repo_name, "coordinator write loop closed");
    });

    CoordinatorHandle {
        ctx,
        storage,
        write_tx,
        state,
    }
}
