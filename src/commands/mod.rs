pub mod interactive;
pub mod misc;
pub mod search;
pub mod state;

pub use interactive::interactive;
pub use misc::generate_completions;
pub use search::{search_repos, SearchOverrides};
pub use state::state_command;

use crate::PageArgs;
use crate::cache::{FetchOrchestrator, QueryCache};
use crate::client::GitHubClient;
use crate::config::SearchConfig;
use crate::page::SearchPage;
use crate::retry::{with_retry, RetryPolicy, WithRetry};
use crate::store::{AddressBar, ConfigSnapshot, SnapshotStore, UrlStateStore};

pub type Page = SearchPage<AddressBar, WithRetry<GitHubClient>>;

/// Builds the search page the way every command needs it: state from
/// `--url`, else the remembered search, else defaults.
pub fn open_page(args: &PageArgs, token: Option<String>) -> anyhow::Result<Page> {
    let config = SearchConfig::load()?;

    let snapshot: Option<Box<dyn SnapshotStore>> = if config.persist_state {
        Some(Box::new(ConfigSnapshot::new(SearchConfig::config_path()?)))
    } else {
        None
    };
    let address = AddressBar::new("/search", args.url.as_deref().unwrap_or(""));
    let store = UrlStateStore::new(address, snapshot);

    let client = GitHubClient::new(&config.api_base, token)?;
    let orchestrator = FetchOrchestrator::new(
        with_retry(client, RetryPolicy::default()),
        QueryCache::new(config.stale_after(), config.gc_after()),
    );
    Ok(SearchPage::new(store, orchestrator, config.debounce()))
}
