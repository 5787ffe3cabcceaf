//! The search page: routes table events into the state store, debounces the
//! search box, and keeps the fetched view for the current parameters.

use crate::cache::{FetchOrchestrator, FetchPlan, FetchView};
use crate::client::RepoSearchService;
use crate::debounce::DebouncedRelay;
use crate::store::{NavigationSink, UrlStateStore};
use crate::table::{ColumnSort, TableEvent, TableProps};
use crate::types::{Order, SearchParams};
use std::time::Duration;

pub struct SearchPage<N: NavigationSink, S> {
    store: UrlStateStore<N>,
    orchestrator: FetchOrchestrator<S>,
    relay: DebouncedRelay<String>,
    /// What the search box shows, which runs ahead of the committed `q`.
    draft: String,
    view: FetchView,
}

impl<N: NavigationSink, S: RepoSearchService> SearchPage<N, S> {
    pub fn new(store: UrlStateStore<N>, orchestrator: FetchOrchestrator<S>, quiet_period: Duration) -> Self {
        let draft = store.state().q.clone();
        SearchPage {
            store,
            orchestrator,
            relay: DebouncedRelay::new(quiet_period),
            draft,
            view: FetchView::empty(),
        }
    }

    pub fn params(&self) -> &SearchParams {
        self.store.state()
    }

    pub fn store(&self) -> &UrlStateStore<N> {
        &self.store
    }

    pub fn orchestrator(&self) -> &FetchOrchestrator<S> {
        &self.orchestrator
    }

    #[cfg(test)]
    pub fn relay(&self) -> &DebouncedRelay<String> {
        &self.relay
    }

    #[cfg(test)]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn view(&self) -> &FetchView {
        &self.view
    }

    pub fn sorting(&self) -> ColumnSort {
        let params = self.params();
        ColumnSort {
            id: params.sort,
            desc: params.order == Order::Desc,
        }
    }

    pub fn props(&self) -> TableProps<'_> {
        let params = self.params();
        TableProps {
            is_loading: self.view.is_loading,
            rows: self
                .view
                .data
                .as_ref()
                .map(|d| d.items.as_slice())
                .unwrap_or(&[]),
            search_query: &self.draft,
            language: params.lang,
            sorting: self.sorting(),
            item_count: self.view.item_count(),
            page_count: self.view.page_count,
            page_index: params.page.saturating_sub(1),
            page_size: params.per_page,
        }
    }

    /// Applies a table event. Returns true when the search parameters
    /// changed and the results need refreshing.
    pub fn handle(&mut self, event: TableEvent) -> bool {
        match event {
            TableEvent::SearchQueryChanged(text) => {
                self.draft = text.clone();
                self.relay.set_callback(move || text.clone());
                self.relay.trigger();
                false
            }
            TableEvent::SearchQueryBlurred => {
                self.relay.cancel();
                self.commit_query(self.draft.clone())
            }
            TableEvent::LanguageChanged(lang) => self.apply(|s| SearchParams {
                lang,
                page: 1,
                ..s.clone()
            }),
            TableEvent::SortingChanged(sorting) => self.apply(|s| SearchParams {
                sort: sorting.id,
                order: if sorting.desc { Order::Desc } else { Order::Asc },
                page: 1,
                ..s.clone()
            }),
            TableEvent::PaginationChanged(pagination) => self.apply(|s| SearchParams {
                page: pagination.page_index + 1,
                per_page: pagination.page_size,
                ..s.clone()
            }),
        }
    }

    /// The search box follows the committed text, so a blank entry shows the
    /// seed term it was replaced with.
    fn commit_query(&mut self, text: String) -> bool {
        let changed = self.apply(|s| SearchParams {
            q: text,
            page: 1,
            ..s.clone()
        });
        self.draft = self.store.state().q.clone();
        changed
    }

    fn apply<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&SearchParams) -> SearchParams,
    {
        let before = self.store.state().clone();
        let after = self.store.update(f);
        *after != before
    }

    /// Commits the search box if its quiet period is over.
    #[cfg(test)]
    pub fn poll_debounce(&mut self, now: tokio::time::Instant) -> bool {
        match self.relay.poll_at(now) {
            Some(text) => self.commit_query(text),
            None => false,
        }
    }

    /// Suspends until the pending search box commit fires. Never resolves
    /// while nothing is pending.
    pub async fn next_debounced(&mut self) -> bool {
        match self.relay.wait().await {
            Some(text) => self.commit_query(text),
            None => false,
        }
    }

    /// Switches the view to the current parameters without waiting: shows
    /// cached data, or keeps the previous rows with the loading flag on.
    pub fn show_current(&mut self) -> FetchPlan {
        let plan = self.orchestrator.prepare(self.store.state());
        self.view = self.orchestrator.view();
        plan
    }

    pub fn sync_view(&mut self) {
        self.view = self.orchestrator.view();
    }

    /// Waits for `plan` (from [`Self::show_current`]) and takes the result.
    pub async fn finish(&mut self, plan: FetchPlan) -> &FetchView {
        let params = self.store.state().clone();
        self.view = self.orchestrator.resolve(&params, plan).await;
        &self.view
    }

    pub async fn refresh(&mut self) -> &FetchView {
        let plan = self.show_current();
        self.finish(plan).await
    }

    pub fn dispose(&mut self) {
        self.relay.dispose();
    }
}
