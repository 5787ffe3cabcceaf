use crate::client::RepoSearchService;
use crate::error::SearchError;
use crate::types::{GitHubRepo, GitHubSearchResponse, Owner, SearchParams};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// In-process search service. Results are derived from the query so tests can
/// tell responses apart; per-query delays and failures are configurable.
#[derive(Default)]
pub struct FakeGitHub {
    pub total_count: u64,
    delays: HashMap<String, Duration>,
    failures: HashMap<String, SearchError>,
    calls: Mutex<Vec<SearchParams>>,
}

impl FakeGitHub {
    pub fn new(total_count: u64) -> Self {
        FakeGitHub {
            total_count,
            ..FakeGitHub::default()
        }
    }

    pub fn with_delay(mut self, q: &str, delay: Duration) -> Self {
        self.delays.insert(q.to_string(), delay);
        self
    }

    pub fn failing(mut self, q: &str, err: SearchError) -> Self {
        self.failures.insert(q.to_string(), err);
        self
    }

    pub fn calls(&self) -> Vec<SearchParams> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn repo(id: u64, owner: &str, name: &str) -> GitHubRepo {
    GitHubRepo {
        id,
        name: name.to_string(),
        full_name: format!("{}/{}", owner, name),
        owner: Owner {
            login: owner.to_string(),
            html_url: format!("https://github.com/{}", owner),
        },
        html_url: format!("https://github.com/{}/{}", owner, name),
        description: Some(format!("{} by {}", name, owner)),
        stargazers_count: 1000 + id as u32,
        forks_count: 10 + id as u32,
        updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

#[async_trait]
impl RepoSearchService for FakeGitHub {
    async fn search(&self, params: &SearchParams) -> Result<GitHubSearchResponse, SearchError> {
        self.calls.lock().unwrap().push(params.clone());
        if let Some(delay) = self.delays.get(&params.q) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(err) = self.failures.get(&params.q) {
            return Err(err.clone());
        }
        let first = u64::from((params.page - 1) * params.per_page);
        let items = (0..u64::from(params.per_page).min(3))
            .map(|i| repo(first + i, &params.q, &format!("{}-{}", params.lang, first + i)))
            .collect();
        Ok(GitHubSearchResponse {
            total_count: self.total_count,
            incomplete_results: false,
            items,
        })
    }
}
