//! Retry policies.
//!
//! - [`ConflictRetry`]: one re-read-and-retry after a version conflict on write.
//! - [`TransientRetry`]: bounded exponential backoff for listing requests.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::store::ContentStore;
use crate::types::VersionToken;

/// Attempts per write: the first put plus one retry.
pub const MAX_WRITE_ATTEMPTS: u32 = 2;

/// Version-checked write with a single retry on conflict.
///
/// The version token is fetched right before every put and never reused
/// across attempts. When the retry conflicts as well the conflict is
/// returned; there is no merge and no further retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictRetry {
    delay: Duration,
    max_attempts: u32,
}

impl Default for ConflictRetry {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

impl ConflictRetry {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: MAX_WRITE_ATTEMPTS,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Read the current version and put `bytes` against it.
    pub async fn write<S>(
        &self,
        store: &S,
        path: &str,
        bytes: &[u8],
        message: &str,
    ) -> StoreResult<VersionToken>
    where
        S: ContentStore + ?Sized,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let version = store.get_version(path).await?;
            debug!(
                path,
                attempt,
                version = version.as_ref().map(VersionToken::as_str),
                "attempting write"
            );

            match store.put(path, bytes, message, version.as_ref()).await {
                Ok(token) => {
                    debug!(path, attempt, version = %token, "write committed");
                    return Ok(token);
                }
                Err(StoreError::VersionConflict { .. }) if attempt < self.max_attempts => {
                    warn!(
                        path,
                        attempt,
                        delay_ms = self.delay.as_millis() as u64,
                        "version conflict, re-reading version and retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => {
                    warn!(path, attempt, error = %e, "write failed");
                    return Err(e);
                }
            }
        }
    }
}

/// Bounded retry with exponential backoff and jitter for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransientRetry {
    max_retries: u32,
    base_backoff: Duration,
}

impl Default for TransientRetry {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

impl TransientRetry {
    pub fn new(max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            max_retries,
            base_backoff,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Backoff before retry number `retry` (1-based), capped at 30 seconds.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.saturating_sub(1).min(16);
        let base = self
            .base_backoff
            .saturating_mul(factor)
            .min(Duration::from_secs(30));
        let base_ms = base.as_millis() as u64;
        if base_ms == 0 {
            return Duration::ZERO;
        }
        let jitter_factor: f64 = rand::thread_rng().gen_range(0.9_f64..=1.1_f64);
        Duration::from_millis(((base_ms as f64) * jitter_factor).round() as u64)
    }

    /// Run `op` until it succeeds, fails permanently, or retries run out.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> StoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let mut retries = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && retries < self.max_retries => {
                    retries += 1;
                    let backoff = self.backoff(retries);

                    warn!(
                        error = %e,
                        operation = what,
                        retry = retries,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying request"
                    );

                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
