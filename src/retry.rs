//! Retry decorator for [`RepoSearchService`].

use crate::client::RepoSearchService;
use crate::error::SearchError;
use crate::types::{GitHubSearchResponse, SearchParams};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Attempts allowed after a secondary rate limit. Primary limits are
    /// never retried.
    pub secondary_retries: u32,
    /// Upper bound on how long to honour a `retry-after`.
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            secondary_retries: 1,
            max_wait: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    fn wait_for(&self, err: &SearchError, attempt: u32) -> Option<Duration> {
        match err {
            SearchError::SecondaryRateLimit { retry_after } if attempt < self.secondary_retries => {
                Some((*retry_after).min(self.max_wait))
            }
            _ => None,
        }
    }
}

pub struct WithRetry<S> {
    inner: S,
    policy: RetryPolicy,
}

pub fn with_retry<S: RepoSearchService>(inner: S, policy: RetryPolicy) -> WithRetry<S> {
    WithRetry { inner, policy }
}

impl<S> WithRetry<S> {
    #[cfg(test)]
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: RepoSearchService> RepoSearchService for WithRetry<S> {
    async fn search(&self, params: &SearchParams) -> Result<GitHubSearchResponse, SearchError> {
        let mut attempt = 0;
        loop {
            match self.inner.search(params).await {
                Ok(result) => return Ok(result),
                Err(err) => match self.policy.wait_for(&err, attempt) {
                    Some(wait) => {
                        tracing::warn!("{}; retrying in {}s", err, wait.as_secs());
                        tokio::time::sleep(wait).await;
                        attempt += 1;
                    }
                    None => return Err(err),
                },
            }
        }
    }
}
