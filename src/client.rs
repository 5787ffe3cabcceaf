use crate::error::SearchError;
use crate::types::{GitHubSearchResponse, SearchParams};
use async_trait::async_trait;
use std::time::Duration;

const USER_AGENT: &str = "gitsearch/0.3";
const DEFAULT_SECONDARY_WAIT: Duration = Duration::from_secs(60);

/// Anything that can answer a repository search.
#[async_trait]
pub trait RepoSearchService: Send + Sync {
    async fn search(&self, params: &SearchParams) -> Result<GitHubSearchResponse, SearchError>;
}

/// Free text plus the language qualifier, as the search API expects it.
pub fn build_query(params: &SearchParams) -> String {
    format!("{} language:{}", params.q, params.lang)
}

pub fn search_url(api_base: &str, params: &SearchParams) -> String {
    format!(
        "{}/search/repositories?q={}&sort={}&order={}&per_page={}&page={}",
        api_base.trim_end_matches('/'),
        urlencoding::encode(&build_query(params)),
        params.sort,
        params.order,
        params.per_page,
        params.page
    )
}

/// The rate limit headers GitHub sends along with a rejected request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateLimitHeaders {
    pub remaining: Option<u64>,
    pub reset_epoch: Option<i64>,
    pub retry_after: Option<u64>,
}

impl RateLimitHeaders {
    fn from_headers(headers: &reqwest::header::HeaderMap) -> Self {
        let number = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<i64>().ok())
        };
        RateLimitHeaders {
            remaining: number("x-ratelimit-remaining").map(|n| n.max(0) as u64),
            reset_epoch: number("x-ratelimit-reset"),
            retry_after: number("retry-after").map(|n| n.max(0) as u64),
        }
    }
}

/// Maps a non-success response onto a [`SearchError`].
///
/// GitHub reports both kinds of rate limiting as 403 or 429. Secondary limits
/// say so in the message or come with `retry-after` while quota remains;
/// everything else with an empty quota (or a bare 429) is the primary limit.
pub fn classify_failure(
    status: u16,
    limits: &RateLimitHeaders,
    body: &str,
    now_epoch: i64,
) -> SearchError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        401 => SearchError::Unauthorized { status },
        403 | 429 => {
            let secondary = message.to_lowercase().contains("secondary rate limit")
                || (limits.retry_after.is_some() && limits.remaining != Some(0));
            if secondary {
                SearchError::SecondaryRateLimit {
                    retry_after: limits
                        .retry_after
                        .map(Duration::from_secs)
                        .unwrap_or(DEFAULT_SECONDARY_WAIT),
                }
            } else if limits.remaining == Some(0) || status == 429 {
                let reset_after = limits
                    .reset_epoch
                    .map(|reset| (reset - now_epoch).max(0) as u64)
                    .unwrap_or(0);
                SearchError::PrimaryRateLimit {
                    reset_after: Duration::from_secs(reset_after),
                }
            } else {
                SearchError::Api { status, message }
            }
        }
        _ => SearchError::Api { status, message },
    }
}

pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(api_base: &str, token: Option<String>) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;
        Ok(GitHubClient {
            http,
            api_base: api_base.to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }
}

#[async_trait]
impl RepoSearchService for GitHubClient {
    async fn search(&self, params: &SearchParams) -> Result<GitHubSearchResponse, SearchError> {
        let url = search_url(&self.api_base, params);
        tracing::debug!("GET {}", url);

        let mut request = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;
        let status = resp.status();
        let limits = RateLimitHeaders::from_headers(resp.headers());
        let body = resp
            .text()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        if !status.is_success() {
            let err = classify_failure(status.as_u16(), &limits, &body, chrono::Utc::now().timestamp());
            tracing::warn!("search for {:?} failed: {}", params.q, err);
            return Err(err);
        }

        let result: GitHubSearchResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Malformed(e.to_string()))?;
        if result.incomplete_results {
            tracing::debug!("GitHub returned incomplete results for {:?}", params.q);
        }
        Ok(result)
    }
}
