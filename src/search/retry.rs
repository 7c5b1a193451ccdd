//! Caller-side retry with exponential backoff
//!
//! [`Search::execute`] never retries on its own. Callers that want to ride
//! out rate limiting or a flaky connection wrap it with a [`RetryPolicy`].

use super::executor::Search;
use crate::error::{NetworkFailure, SearchError};
use crate::query::SearchQuery;
use crate::results::SearchResult;
use std::time::Duration;
use tracing::info;

/// How many times to retry transient failures, and how long to wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each following one
    pub base_delay: Duration,
    /// Ceiling for any single delay, `Retry-After` included
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based) after `error`
    pub fn delay_for(&self, attempt: u32, error: &SearchError) -> Duration {
        if let SearchError::Network(NetworkFailure::TooManyRequests {
            retry_after: Some(secs),
        }) = error
        {
            return Duration::from_secs(*secs).min(self.max_delay);
        }

        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `search` until it succeeds, fails for good, or retries run out
    pub async fn run(
        &self,
        search: &Search,
        query: &SearchQuery,
    ) -> Result<SearchResult, SearchError> {
        let mut attempt = 0;
        loop {
            match search.execute(query).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt, &e);
                    info!(
                        "Attempt {} failed ({}), retrying in {:?}",
                        attempt + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
