//! `syncd serve` (SPEC_FULL §6.3.1): hosts the HTTP API, webhook ingress,
//! and file watcher together -- the long-running deployment target for
//! C9/C10. Mirrors `bd`'s single-process shape but as a server instead of a
//! one-shot CLI invocation.

use std::sync::Arc;

use beads_config::config::{load_server_config, RepoContext};
use beads_upstream::{GitHubClient, LinearClient};
use beads_webhook::{IncomingEvent, WebhookState};
use tokio::sync::mpsc;

use crate::cli::GlobalArgs;
use crate::error::{CliError, Result};
use crate::http::AppState;

pub async fn run(global: &GlobalArgs) -> Result<()> {
    let config = load_server_config(&global.config)?;
    let addr = format!("{}:{}", config.host, config.port);

    let secret_env = config.webhook_secret_env.clone();
    let secret = std::env::var(&secret_env)
        .map_err(|_| CliError::Config(format!("{secret_env} is not set")))?
        .into_bytes();

    let app_state = Arc::new(AppState::new(config.clone()));
    let (tx, rx) = mpsc::channel(64);
    let webhook_state = Arc::new(WebhookState {
        github_secret: secret.clone(),
        linear_secret: secret,
        sender: tx,
    });

    tokio::spawn(dispatch_deliveries(rx, config.repos.clone(), app_state.clone()));

    let api_router = crate::http::router(app_state);
    let webhook_router = axum::Router::new()
        .route("/webhooks/github", axum::routing::post(beads_webhook::github_webhook))
        .route("/webhooks/linear", axum::routing::post(beads_webhook::linear_webhook))
        .with_state(webhook_state);
    let router = api_router.merge(webhook_router);

    tracing::info!(%addr, "syncd listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

/// Consumes verified webhook deliveries and triggers a full re-pull of that
/// tenant's upstream state. A single delivery rarely carries everything
/// needed to apply a targeted partial update (GitHub/Linear payload shapes
/// vary per event type), so a webhook is treated as "this tenant changed,
/// re-pull it" rather than hand-parsed into a field-level diff.
async fn dispatch_deliveries(
    mut rx: mpsc::Receiver<IncomingEvent>,
    repos: Vec<RepoContext>,
    state: Arc<AppState>,
) {
    while let Some(event) = rx.recv().await {
        match event {
            IncomingEvent::GitHub(delivery) => {
                let Some(ctx) = repos.iter().find(|r| r.owner == delivery.owner && r.name == delivery.repo) else {
                    tracing::warn!(owner = %delivery.owner, repo = %delivery.repo, "no configured repo for delivery");
                    continue;
                };
                let Ok(token) = std::env::var("GITHUB_TOKEN") else {
                    tracing::warn!("GITHUB_TOKEN not set, cannot re-pull after webhook");
                    continue;
                };
                let handle = state.set_context(ctx.clone());
                match GitHubClient::new(token, ctx.owner.clone(), ctx.name.clone()) {
                    Ok(client) => {
                        if let Err(e) =
                            beads_sync::pull_github(handle.storage.as_ref(), &client, &ctx.conflict).await
                        {
                            tracing::warn!(error = %e, "github re-pull after webhook failed");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to build github client"),
                }
            }
            IncomingEvent::Linear(delivery) => {
                let Some(ctx) = repos.iter().find(|r| r.installation_id.as_deref() == Some(delivery.team_id.as_str())) else {
                    tracing::warn!(team_id = %delivery.team_id, "no configured repo for linear team");
                    continue;
                };
                let Ok(token) = std::env::var("LINEAR_TOKEN") else {
                    tracing::warn!("LINEAR_TOKEN not set, cannot re-pull after webhook");
                    continue;
                };
                let handle = state.set_context(ctx.clone());
                let client = LinearClient::new(token);
                if let Err(e) = beads_sync::pull_linear(
                    handle.storage.as_ref(),
                    &client,
                    &delivery.team_id,
                    &ctx.conflict,
                )
                .await
                {
                    tracing::warn!(error = %e, "linear re-pull after webhook failed");
                }
            }
        }
    }
}
