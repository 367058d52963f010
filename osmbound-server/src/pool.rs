use std::time::Duration;

use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::overpass::{ElementSource, FetchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts made after the first failure
    pub max_retries: u32,
    pub delay: Duration,
}

/// Bounded-concurrency front for an [`ElementSource`].
///
/// At most `max_concurrent` fetches run at once; the rest wait for a permit.
/// A permit is held across retries of the same fetch.
#[derive(Debug)]
pub struct FetchPool<S> {
    source: S,
    permits: Semaphore,
    retry: RetryPolicy,
}

impl<S: ElementSource> FetchPool<S> {
    pub fn new(source: S, max_concurrent: usize, retry: RetryPolicy) -> Self {
        Self {
            source,
            permits: Semaphore::new(max_concurrent.max(1)),
            retry,
        }
    }

    /// Fetches `query`, retrying retryable failures per the pool's policy
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted, or the first
    /// non-retryable error.
    pub async fn fetch(&self, query: &str) -> Result<Value, FetchError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchError::PoolClosed)?;

        let mut attempt = 0;
        loop {
            match self.source.fetch(query).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.retry.max_retries,
                        error = %err,
                        "Overpass fetch failed, retrying"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
