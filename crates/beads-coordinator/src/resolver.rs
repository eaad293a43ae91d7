//! Installation/auth resolver (C11, contract only -- SPEC_FULL §4.10).
//!
//! This module names the trait boundary and the 55-minute token-cache
//! contract from §5; it does not implement a concrete JWT-signing or OAuth
//! exchange, since that requires secrets this crate does not govern.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use beads_config::config::RepoContext;

use crate::error::AuthError;

const TOKEN_TTL: Duration = Duration::from_secs(55 * 60);

/// A short-lived credential for one upstream, handed to the upstream HTTP
/// clients for the lifetime of a single write or sync pass.
#[derive(Debug, Clone)]
pub enum UpstreamCredential {
    GitHubInstallationToken(String),
    LinearBearer(String),
}

impl UpstreamCredential {
    pub fn as_bearer(&self) -> &str {
        match self {
            Self::GitHubInstallationToken(t) | Self::LinearBearer(t) => t,
        }
    }
}

/// Exchanges a [`RepoContext`] for a short-lived upstream credential.
/// Implementations own the actual JWT-signing or OAuth token exchange; this
/// crate only defines the boundary and the caching behavior around it.
pub trait InstallationResolver: Send + Sync {
    fn resolve(
        &self,
        ctx: &RepoContext,
    ) -> impl std::future::Future<Output = Result<UpstreamCredential, AuthError>> + Send;
}

struct CachedToken {
    credential: UpstreamCredential,
    fetched_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < TOKEN_TTL
    }
}

/// Wraps an [`InstallationResolver`] with a 55-minute TTL cache, keyed by
/// `owner/name` (SPEC_FULL §5: "read-locked on the hot path, write-locked
/// only on refresh").
pub struct CachingResolver<R: InstallationResolver> {
    inner: R,
    cache: RwLock<HashMap<String, CachedToken>>,
}

impl<R: InstallationResolver> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub async fn resolve(&self, ctx: &RepoContext) -> Result<UpstreamCredential, AuthError> {
        let key = ctx.key();
        if let Some(cached) = self.cache.read().expect("token cache lock poisoned").get(&key) {
            if cached.is_fresh() {
                return Ok(cached.credential.clone());
            }
        }

        let credential = self.inner.resolve(ctx).await?;
        self.cache.write().expect("token cache lock poisoned").insert(
            key,
            CachedToken {
                credential: credential.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beads_config::config::ConflictConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingResolver {
        calls: AtomicUsize,
    }

    impl InstallationResolver for CountingResolver {
        async fn resolve(&self, _ctx: &RepoContext) -> Result<UpstreamCredential, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(UpstreamCredential::GitHubInstallationToken("tok".into()))
        }
    }

    fn ctx() -> RepoContext {
        RepoContext {
            owner: "acme".into(),
            name: "widgets".into(),
            installation_id: Some("123".into()),
            default_branch: "main".into(),
            conflict: ConflictConfig::default(),
        }
    }

    #[tokio::test]
    async fn repeated_resolves_within_the_ttl_hit_the_cache() {
        let resolver = CachingResolver::new(CountingResolver {
            calls: AtomicUsize::new(0),
        });
        resolver.resolve(&ctx()).await.unwrap();
        resolver.resolve(&ctx()).await.unwrap();
        resolver.resolve(&ctx()).await.unwrap();
        assert_eq!(resolver.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_repos_are_cached_independently() {
        let resolver = CachingResolver::new(CountingResolver {
            calls: AtomicUsize::new(0),
        });
        let mut other = ctx();
        other.name = "gadgets".into();
        resolver.resolve(&ctx()).await.unwrap();
        resolver.resolve(&other).await.unwrap();
        assert_eq!(resolver.inner.calls.load(Ordering::SeqCst), 2);
    }
}
