use super::open_page;
use crate::PageArgs;
use crate::table::{self, ColumnSort, PaginationState, TableEvent};
use crate::types::{Language, Order, Sort};

/// Command line flags layered on top of the starting state.
#[derive(Debug, Default)]
pub struct SearchOverrides {
    pub query: Option<String>,
    pub lang: Option<Language>,
    pub sort: Option<Sort>,
    pub order: Option<Order>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl SearchOverrides {
    /// Turns the flags into the events the table would have sent. Pagination
    /// comes last so an explicit page survives the resets the others cause.
    pub fn into_events(self, current: ColumnSort, pagination: PaginationState) -> Vec<TableEvent> {
        let mut events = Vec::new();
        if let Some(query) = self.query {
            events.push(TableEvent::SearchQueryChanged(query));
            events.push(TableEvent::SearchQueryBlurred);
        }
        if let Some(lang) = self.lang {
            events.push(TableEvent::LanguageChanged(lang));
        }
        if self.sort.is_some() || self.order.is_some() {
            let id = self.sort.unwrap_or(current.id);
            let desc = match self.order {
                Some(order) => order == Order::Desc,
                None if id == current.id => current.desc,
                None => true,
            };
            events.push(TableEvent::SortingChanged(ColumnSort { id, desc }));
        }
        if self.page.is_some() || self.per_page.is_some() {
            events.push(TableEvent::PaginationChanged(PaginationState {
                page_index: self
                    .page
                    .map(|p| p.saturating_sub(1))
                    .unwrap_or(pagination.page_index),
                page_size: self.per_page.unwrap_or(pagination.page_size),
            }));
        }
        events
    }
}

pub async fn search_repos(
    args: &PageArgs,
    token: Option<String>,
    overrides: SearchOverrides,
) -> anyhow::Result<()> {
    let mut page = open_page(args, token)?;

    let props = page.props();
    let events = overrides.into_events(props.sorting, props.pagination());
    for event in events {
        page.handle(event);
    }

    let error = page.refresh().await.error.clone();

    println!("{}", table::render(&page.props(), args.width, chrono::Utc::now()));
    println!("\n{}", page.store().navigation().href());

    if let Some(err) = error {
        anyhow::bail!("search failed: {}", err);
    }
    Ok(())
}
