//! Keyed result cache and the fetch orchestration built on top of it.
//!
//! Every parameter tuple gets its own entry. An entry is fresh for the
//! staleness window after it was fetched, then stale until refetched. At
//! most one request per key is in flight; later callers wait on it. While the
//! current key loads, the last data shown stays visible as a placeholder, and
//! a response for a key that is no longer current is cached but never shown.

use crate::client::RepoSearchService;
use crate::error::SearchError;
use crate::types::{GitHubSearchResponse, SearchParams};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// The search API never pages past this many items.
pub const MAX_RETRIEVABLE_RESULTS: u64 = 1000;
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(10);
pub const DEFAULT_GC_AFTER: Duration = Duration::from_secs(300);

pub fn page_count(total_count: u64, per_page: u32) -> u32 {
    if total_count == 0 || per_page == 0 {
        return 0;
    }
    let per_page = u64::from(per_page);
    let reported = total_count.div_ceil(per_page);
    let reachable = MAX_RETRIEVABLE_RESULTS.div_ceil(per_page);
    reported.min(reachable) as u32
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryStatus {
    Absent,
    Loading,
    Ready,
    Stale,
    Failed(SearchError),
}

struct InFlight {
    ticket: u64,
    done: watch::Sender<bool>,
}

struct CacheEntry {
    data: Option<(Arc<GitHubSearchResponse>, Instant)>,
    error: Option<SearchError>,
    in_flight: Option<InFlight>,
    last_used: Instant,
}

impl CacheEntry {
    fn new(now: Instant) -> Self {
        CacheEntry {
            data: None,
            error: None,
            in_flight: None,
            last_used: now,
        }
    }

    fn fresh_data(&self, now: Instant, stale_after: Duration) -> Option<Arc<GitHubSearchResponse>> {
        self.data
            .as_ref()
            .filter(|(_, fetched_at)| now.duration_since(*fetched_at) < stale_after)
            .map(|(data, _)| data.clone())
    }
}

/// What the caller must do after [`QueryCache::request`].
#[derive(Debug)]
pub enum FetchPlan {
    /// Fresh data is cached; nothing to fetch.
    Hit,
    /// Someone else is already fetching this key.
    Wait(watch::Receiver<bool>),
    /// Fetch it, then hand the result to [`QueryCache::complete`].
    Fetch(u64),
}

/// What the table gets to see.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchView {
    pub data: Option<Arc<GitHubSearchResponse>>,
    pub is_loading: bool,
    /// `data` belongs to an earlier key and is only kept to avoid flicker.
    pub is_placeholder: bool,
    /// `data` is older than the staleness window.
    pub is_stale: bool,
    pub error: Option<SearchError>,
    pub page_count: u32,
}

impl FetchView {
    pub fn empty() -> Self {
        FetchView {
            data: None,
            is_loading: false,
            is_placeholder: false,
            is_stale: false,
            error: None,
            page_count: 0,
        }
    }

    pub fn item_count(&self) -> u64 {
        self.data.as_ref().map(|d| d.total_count).unwrap_or(0)
    }
}

pub struct QueryCache {
    entries: HashMap<SearchParams, CacheEntry>,
    current: Option<SearchParams>,
    shown: Option<Arc<GitHubSearchResponse>>,
    stale_after: Duration,
    gc_after: Duration,
    next_ticket: u64,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_AFTER, DEFAULT_GC_AFTER)
    }
}

impl QueryCache {
    pub fn new(stale_after: Duration, gc_after: Duration) -> Self {
        QueryCache {
            entries: HashMap::new(),
            current: None,
            shown: None,
            stale_after,
            gc_after,
            next_ticket: 0,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current(&self) -> Option<&SearchParams> {
        self.current.as_ref()
    }

    pub fn status(&self, key: &SearchParams, now: Instant) -> EntryStatus {
        let Some(entry) = self.entries.get(key) else {
            return EntryStatus::Absent;
        };
        if entry.in_flight.is_some() {
            return EntryStatus::Loading;
        }
        if let Some(err) = &entry.error {
            return EntryStatus::Failed(err.clone());
        }
        match entry.fresh_data(now, self.stale_after) {
            Some(_) => EntryStatus::Ready,
            None if entry.data.is_some() => EntryStatus::Stale,
            None => EntryStatus::Absent,
        }
    }

    /// Makes `key` current and decides whether it needs a network call.
    pub fn request(&mut self, key: &SearchParams, now: Instant) -> FetchPlan {
        self.current = Some(key.clone());
        let stale_after = self.stale_after;
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::new(now));
        entry.last_used = now;

        if let Some(in_flight) = &entry.in_flight {
            tracing::debug!("joining in-flight search for {:?}", key.q);
            return FetchPlan::Wait(in_flight.done.subscribe());
        }
        if let Some(data) = entry.fresh_data(now, stale_after) {
            tracing::debug!("cache hit for {:?} page {}", key.q, key.page);
            self.shown = Some(data);
            return FetchPlan::Hit;
        }

        self.next_ticket += 1;
        let (done, _) = watch::channel(false);
        entry.in_flight = Some(InFlight {
            ticket: self.next_ticket,
            done,
        });
        tracing::debug!("cache miss for {:?} page {}", key.q, key.page);
        FetchPlan::Fetch(self.next_ticket)
    }

    /// Stores the outcome of fetch `ticket`. Results for keys that are no
    /// longer current are cached without touching what is shown.
    pub fn complete(
        &mut self,
        key: &SearchParams,
        ticket: u64,
        result: Result<GitHubSearchResponse, SearchError>,
        now: Instant,
    ) {
        let Some(entry) = self.entries.get_mut(key) else {
            return;
        };
        let in_flight = match entry.in_flight.take() {
            Some(in_flight) if in_flight.ticket == ticket => in_flight,
            other => {
                entry.in_flight = other;
                return;
            }
        };

        let is_current = self.current.as_ref() == Some(key);
        match result {
            Ok(data) => {
                let data = Arc::new(data);
                entry.data = Some((data.clone(), now));
                entry.error = None;
                if is_current {
                    self.shown = Some(data);
                } else {
                    tracing::debug!("response for superseded search {:?} kept off screen", key.q);
                }
            }
            Err(err) => {
                entry.error = Some(err);
                if is_current {
                    self.shown = None;
                }
            }
        }
        let _ = in_flight.done.send(true);
    }

    pub fn view(&self, now: Instant) -> FetchView {
        let Some(key) = &self.current else {
            return FetchView::empty();
        };
        let Some(entry) = self.entries.get(key) else {
            return FetchView::empty();
        };
        let loading = entry.in_flight.is_some();

        let (data, is_placeholder, error) = match (&entry.data, &entry.error) {
            (_, Some(err)) if !loading => (None, false, Some(err.clone())),
            (Some((data, _)), _) => (Some(data.clone()), false, None),
            (None, _) if loading => (self.shown.clone(), self.shown.is_some(), None),
            (None, _) => (None, false, None),
        };
        let page_count = data
            .as_ref()
            .map(|d| page_count(d.total_count, key.per_page))
            .unwrap_or(0);
        let is_stale = data.is_some()
            && !is_placeholder
            && entry.fresh_data(now, self.stale_after).is_none();

        FetchView {
            data,
            is_loading: loading,
            is_placeholder,
            is_stale,
            error,
            page_count,
        }
    }

    /// Drops idle entries unused for longer than the garbage window.
    pub fn prune(&mut self, now: Instant) {
        let gc_after = self.gc_after;
        let current = self.current.clone();
        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            entry.in_flight.is_some()
                || Some(key) == current.as_ref()
                || now.duration_since(entry.last_used) < gc_after
        });
        let dropped = before - self.entries.len();
        if dropped > 0 {
            tracing::debug!("evicted {} cached searches", dropped);
        }
    }
}

/// Runs searches through a [`QueryCache`]. Cheap to clone; clones share the
/// cache and the service.
pub struct FetchOrchestrator<S> {
    service: Arc<S>,
    cache: Arc<Mutex<QueryCache>>,
}

impl<S> Clone for FetchOrchestrator<S> {
    fn clone(&self) -> Self {
        FetchOrchestrator {
            service: self.service.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<S: RepoSearchService> FetchOrchestrator<S> {
    pub fn new(service: S, cache: QueryCache) -> Self {
        FetchOrchestrator {
            service: Arc::new(service),
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    #[cfg(test)]
    pub fn service(&self) -> &S {
        &self.service
    }

    fn cache(&self) -> MutexGuard<'_, QueryCache> {
        // poisoned or not, the entries are still usable
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    pub fn status(&self, params: &SearchParams) -> EntryStatus {
        self.cache().status(params, Instant::now())
    }

    /// Switches to `params`. The view reflects the new key immediately, with
    /// the previous data as placeholder if a fetch is needed.
    pub fn prepare(&self, params: &SearchParams) -> FetchPlan {
        let now = Instant::now();
        let mut cache = self.cache();
        cache.prune(now);
        tracing::debug!("{:?} page {} is {:?}", params.q, params.page, cache.status(params, now));
        cache.request(params, now)
    }

    pub async fn resolve(&self, params: &SearchParams, plan: FetchPlan) -> FetchView {
        match plan {
            FetchPlan::Hit => {}
            FetchPlan::Wait(mut done) => loop {
                let finished = *done.borrow();
                if finished || done.changed().await.is_err() {
                    break;
                }
            },
            FetchPlan::Fetch(ticket) => {
                let result = self.service.search(params).await;
                self.cache().complete(params, ticket, result, Instant::now());
            }
        }
        self.view()
    }

    pub async fn load(&self, params: &SearchParams) -> FetchView {
        let plan = self.prepare(params);
        self.resolve(params, plan).await
    }

    pub fn view(&self) -> FetchView {
        self.cache().view(Instant::now())
    }
}
