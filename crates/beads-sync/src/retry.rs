//! Exponential backoff with jitter for transient upstream failures
//! (SPEC_FULL §4.7: 1s, 2s, 4s, 8s, 16s; jitter ±20%; max 5 attempts).
//! No retry/backoff crate appears anywhere in the retrieved corpus, so this
//! is a small local helper driven by `tokio::time::sleep`.

use std::future::Future;
use std::time::Duration;

use beads_upstream::UpstreamError;

use crate::error::{Result, SyncError};

const BASE_DELAYS_MS: [u64; 5] = [1000, 2000, 4000, 8000, 16000];
const DEFAULT_JITTER_PCT: f64 = 0.2;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Deterministic pseudo-jitter in `[-pct, pct]`, seeded by the attempt
/// number so behavior is reproducible and unit-testable without an RNG
/// crate (none appears in the retrieved corpus).
fn pseudo_jitter(seed: u64, pct: f64) -> f64 {
    let mut z = seed.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^= z >> 31;
    let unit = (z % 10_000) as f64 / 10_000.0;
    (unit * 2.0 - 1.0) * pct
}

/// The delay before retrying `attempt` (0-indexed), jittered by up to
/// `jitter_pct` in either direction.
pub fn delay_for_attempt(attempt: u32, jitter_pct: f64) -> Duration {
    let base_ms = BASE_DELAYS_MS
        .get(attempt as usize)
        .copied()
        .unwrap_or(*BASE_DELAYS_MS.last().unwrap());
    let jitter = pseudo_jitter(attempt as u64, jitter_pct);
    let ms = (base_ms as f64 * (1.0 + jitter)).max(0.0) as u64;
    Duration::from_millis(ms)
}

/// Retries `f` up to `max_attempts` times on transient [`UpstreamError`]s,
/// sleeping `delay_for_attempt` between tries. Permanent errors (4xx,
/// schema) propagate immediately without consuming a retry.
pub async fn retry_with_backoff<T, F, Fut>(max_attempts: u32, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, UpstreamError>>,
{
    for attempt in 0..max_attempts {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(SyncError::Upstream(e)),
            Err(e) if attempt + 1 == max_attempts => {
                return Err(SyncError::RetriesExhausted { attempts: max_attempts, source: e });
            }
            Err(e) => {
                let delay = delay_for_attempt(attempt, DEFAULT_JITTER_PCT);
                tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "retrying transient upstream failure");
                tokio::time::sleep(delay).await;
            }
        }
    }
    unreachable!("loop always returns on its final iteration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_exponentially_before_jitter() {
        let base: Vec<u64> = (0..5).map(|a| delay_for_attempt(a, 0.0).as_millis() as u64).collect();
        assert_eq!(base, vec![1000, 2000, 4000, 8000, 16000]);
    }

    #[test]
    fn delay_beyond_table_clamps_to_last_entry() {
        assert_eq!(delay_for_attempt(10, 0.0).as_millis(), 16000);
    }

    #[test]
    fn jitter_stays_within_bound() {
        for attempt in 0..20u32 {
            let ms = delay_for_attempt(attempt, 0.2).as_millis() as i64;
            let base = *BASE_DELAYS_MS.get(attempt as usize).unwrap_or(BASE_DELAYS_MS.last().unwrap()) as i64;
            assert!(ms >= (base as f64 * 0.8) as i64 && ms <= (base as f64 * 1.2) as i64);
        }
    }

    #[tokio::test]
    async fn succeeds_without_retrying_on_first_try() {
        let result: Result<i32> = retry_with_backoff(3, || async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let mut calls = 0;
        let result: Result<i32> = retry_with_backoff(3, || {
            calls += 1;
            async { Err(UpstreamError::GithubNotFound("bd-1".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_error_retries_until_success() {
        let mut calls = 0;
        let result: Result<i32> = retry_with_backoff(3, || {
            calls += 1;
            let this_call = calls;
            async move {
                if this_call < 3 {
                    Err(UpstreamError::BeadsCli { code: Some(1), stderr: "timeout".to_string() })
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 3);
    }
}
