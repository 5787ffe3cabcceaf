//! Results table. It owns no state: everything it shows comes in through
//! [`TableProps`] and every user action goes out as a [`TableEvent`].

use crate::types::{GitHubRepo, Language, Sort};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;

/// Layout breakpoints in pixels, smallest first.
pub const BREAKPOINTS: [(Breakpoint, u32); 6] = [
    (Breakpoint::Xs, 512),
    (Breakpoint::Sm, 640),
    (Breakpoint::Md, 768),
    (Breakpoint::Lg, 1024),
    (Breakpoint::Xl, 1280),
    (Breakpoint::Xxl, 1400),
];

/// A terminal cell counts as this many pixels when matching breakpoints.
pub const PX_PER_COLUMN: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
    Xxl,
}

impl Breakpoint {
    pub fn min_width(self) -> u32 {
        BREAKPOINTS
            .iter()
            .find(|(bp, _)| *bp == self)
            .map(|(_, px)| *px)
            .unwrap_or(0)
    }
}

/// Largest breakpoint value not exceeding `width_px`, or 0.
pub fn active_breakpoint_value(width_px: u32) -> u32 {
    BREAKPOINTS
        .iter()
        .rev()
        .map(|(_, px)| *px)
        .find(|px| width_px >= *px)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Name,
    Description,
    Stars,
    Forks,
    Updated,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Id,
        Column::Name,
        Column::Description,
        Column::Stars,
        Column::Forks,
        Column::Updated,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Name => "Name",
            Column::Description => "Description",
            Column::Stars => "Stars",
            Column::Forks => "Forks",
            Column::Updated => "Last Update",
        }
    }

    pub fn show_on(self) -> Option<Breakpoint> {
        match self {
            Column::Id | Column::Description => Some(Breakpoint::Lg),
            _ => None,
        }
    }

    /// The server-side sort behind this header, if it is sortable.
    pub fn sort_field(self) -> Option<Sort> {
        match self {
            Column::Stars => Some(Sort::Stars),
            Column::Forks => Some(Sort::Forks),
            Column::Updated => Some(Sort::Updated),
            _ => None,
        }
    }

    fn width(self) -> usize {
        match self {
            Column::Id => 10,
            Column::Name => 36,
            Column::Description => 48,
            Column::Stars | Column::Forks => 9,
            Column::Updated => 18,
        }
    }
}

pub fn visible_columns(width_px: u32) -> Vec<Column> {
    let active = active_breakpoint_value(width_px);
    Column::ALL
        .into_iter()
        .filter(|col| col.show_on().map_or(true, |bp| active >= bp.min_width()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSort {
    pub id: Sort,
    pub desc: bool,
}

/// Clicking the sorted column flips its direction; clicking another column
/// sorts by it, descending.
pub fn next_sorting(current: ColumnSort, clicked: Sort) -> ColumnSort {
    if current.id == clicked {
        ColumnSort {
            id: clicked,
            desc: !current.desc,
        }
    } else {
        ColumnSort {
            id: clicked,
            desc: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page_index: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    SearchQueryChanged(String),
    SearchQueryBlurred,
    LanguageChanged(Language),
    SortingChanged(ColumnSort),
    PaginationChanged(PaginationState),
}

#[derive(Debug, Clone)]
pub struct TableProps<'a> {
    pub is_loading: bool,
    pub rows: &'a [GitHubRepo],
    pub search_query: &'a str,
    pub language: Language,
    pub sorting: ColumnSort,
    pub item_count: u64,
    pub page_count: u32,
    pub page_index: u32,
    pub page_size: u32,
}

impl TableProps<'_> {
    pub fn pagination(&self) -> PaginationState {
        PaginationState {
            page_index: self.page_index,
            page_size: self.page_size,
        }
    }

    pub fn can_previous_page(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next_page(&self) -> bool {
        self.page_index + 1 < self.page_count
    }

    pub fn header_clicked(&self, column: Column) -> Option<TableEvent> {
        column
            .sort_field()
            .map(|sort| TableEvent::SortingChanged(next_sorting(self.sorting, sort)))
    }

    pub fn next_page(&self) -> Option<TableEvent> {
        self.can_next_page().then(|| self.go_to(self.page_index + 1))
    }

    pub fn previous_page(&self) -> Option<TableEvent> {
        self.can_previous_page().then(|| self.go_to(self.page_index - 1))
    }

    pub fn first_page(&self) -> TableEvent {
        self.go_to(0)
    }

    pub fn last_page(&self) -> TableEvent {
        self.go_to(self.page_count.saturating_sub(1))
    }

    /// Jumps to `page_index`, clamped to the known page range.
    pub fn go_to(&self, page_index: u32) -> TableEvent {
        let last = self.page_count.saturating_sub(1);
        TableEvent::PaginationChanged(PaginationState {
            page_index: page_index.min(last),
            page_size: self.page_size,
        })
    }

    /// A new page size starts over from the first page.
    pub fn set_page_size(&self, page_size: u32) -> TableEvent {
        TableEvent::PaginationChanged(PaginationState {
            page_index: 0,
            page_size,
        })
    }
}

/// Relative age in the style of "3 days ago".
pub fn format_distance(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    let (amount, future) = if secs < 0 { (-secs, true) } else { (secs, false) };
    let minutes = (amount + 30) / 60;
    let hours = (minutes + 30) / 60;
    let days = (hours + 12) / 24;

    let phrase = match minutes {
        0 => "less than a minute".to_string(),
        1 => "1 minute".to_string(),
        2..=44 => format!("{} minutes", minutes),
        45..=89 => "about 1 hour".to_string(),
        90..=1439 => format!("about {} hours", hours),
        1440..=2519 => "1 day".to_string(),
        2520..=43199 => format!("{} days", days),
        43200..=86399 => "about 1 month".to_string(),
        86400..=525599 => format!("{} months", (days / 30).max(2)),
        _ => {
            let years = days / 365;
            let rem_months = (days % 365) / 30;
            match rem_months {
                0..=2 => format!("about {} year{}", years, plural(years)),
                3..=8 => format!("over {} year{}", years, plural(years)),
                _ => format!("almost {} years", years + 1),
            }
        }
    };

    if future {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

pub fn pagination_summary(props: &TableProps<'_>) -> String {
    if props.item_count == 0 || props.page_count == 0 {
        return "No pages".to_string();
    }
    let first = u64::from(props.page_index) * u64::from(props.page_size) + 1;
    if first > props.item_count || props.rows.is_empty() {
        return format!("Page {} of {}", props.page_index + 1, props.page_count);
    }
    let last = (first + props.rows.len().max(1) as u64 - 1).min(props.item_count);
    format!(
        "Showing {}-{} of {} · Page {} of {}",
        first,
        last,
        props.item_count,
        props.page_index + 1,
        props.page_count
    )
}

fn cell(repo: &GitHubRepo, column: Column, now: DateTime<Utc>) -> String {
    match column {
        Column::Id => repo.id.to_string(),
        Column::Name => format!("{}/{}", repo.owner.login, repo.name),
        Column::Description => repo.description.clone().unwrap_or_default(),
        Column::Stars => repo.stargazers_count.to_string(),
        Column::Forks => repo.forks_count.to_string(),
        Column::Updated => format_distance(repo.updated_at, now),
    }
}

fn header(column: Column, sorting: ColumnSort) -> String {
    match column.sort_field() {
        Some(sort) if sort == sorting.id => {
            format!("{} {}", column.title(), if sorting.desc { "↓" } else { "↑" })
        }
        Some(_) => format!("{} ↕", column.title()),
        None => column.title().to_string(),
    }
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{:<width$}", text, width = width)
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn tabs(active: Language) -> String {
    Language::ALL
        .iter()
        .map(|lang| {
            if *lang == active {
                format!("[{}]", lang.label())
            } else {
                format!(" {} ", lang.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Draws the table for a terminal `width_cols` wide.
pub fn render(props: &TableProps<'_>, width_cols: u16, now: DateTime<Utc>) -> String {
    let columns = visible_columns(u32::from(width_cols) * PX_PER_COLUMN);
    let mut out = String::new();

    let _ = writeln!(out, "Search: {}", props.search_query);
    let _ = writeln!(out, "{}", tabs(props.language));
    let _ = writeln!(out);

    let head: Vec<String> = columns
        .iter()
        .map(|col| fit(&header(*col, props.sorting), col.width()))
        .collect();
    let head = head.join(" ");
    let _ = writeln!(out, "{}", head.trim_end());
    let _ = writeln!(out, "{}", "-".repeat(head.trim_end().chars().count()));

    if props.is_loading {
        let _ = writeln!(out, "Loading...");
    } else if props.rows.is_empty() {
        let _ = writeln!(out, "No results.");
    } else {
        for repo in props.rows {
            let line: Vec<String> = columns
                .iter()
                .map(|col| fit(&cell(repo, *col, now), col.width()))
                .collect();
            let _ = writeln!(out, "{}", line.join(" ").trim_end());
            let _ = writeln!(out, "    {}  (owner {})", repo.html_url, repo.owner.html_url);
        }
    }

    let _ = writeln!(out);
    let _ = write!(out, "{}", pagination_summary(props));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::repo;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn props(rows: &[GitHubRepo]) -> TableProps<'_> {
        TableProps {
            is_loading: false,
            rows,
            search_query: "react",
            language: Language::Javascript,
            sorting: ColumnSort {
                id: Sort::Stars,
                desc: true,
            },
            item_count: 5000,
            page_count: 100,
            page_index: 0,
            page_size: 10,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn breakpoints_pick_largest_fitting_value() {
        assert_eq!(active_breakpoint_value(300), 0);
        assert_eq!(active_breakpoint_value(640), 640);
        assert_eq!(active_breakpoint_value(1100), 1024);
        assert_eq!(active_breakpoint_value(5000), 1400);
    }

    #[test]
    fn narrow_layout_hides_id_and_description() {
        assert_eq!(
            visible_columns(800),
            vec![Column::Name, Column::Stars, Column::Forks, Column::Updated]
        );
        assert_eq!(visible_columns(1024).len(), 6);
    }

    #[test]
    fn clicking_headers_changes_and_toggles_sort() {
        let rows: [GitHubRepo; 0] = [];
        let p = props(&rows);
        let Some(TableEvent::SortingChanged(forks)) = p.header_clicked(Column::Forks) else {
            panic!("forks is sortable");
        };
        assert_eq!(forks, ColumnSort { id: Sort::Forks, desc: true });

        let toggled = next_sorting(forks, Sort::Forks);
        assert_eq!(toggled, ColumnSort { id: Sort::Forks, desc: false });
        assert_eq!(next_sorting(toggled, Sort::Forks), forks);

        assert_eq!(p.header_clicked(Column::Name), None);
    }

    #[test]
    fn pagination_events_stay_in_range() {
        let rows: [GitHubRepo; 0] = [];
        let mut p = props(&rows);
        assert_eq!(p.previous_page(), None);
        assert_eq!(
            p.next_page(),
            Some(TableEvent::PaginationChanged(PaginationState {
                page_index: 1,
                page_size: 10
            }))
        );
        assert_eq!(
            p.go_to(500),
            TableEvent::PaginationChanged(PaginationState {
                page_index: 99,
                page_size: 10
            })
        );

        p.page_index = 99;
        assert_eq!(p.next_page(), None);
        assert_eq!(
            p.set_page_size(50),
            TableEvent::PaginationChanged(PaginationState {
                page_index: 0,
                page_size: 50
            })
        );
    }

    #[test]
    fn relative_times() {
        let now = now();
        assert_eq!(format_distance(now - Duration::seconds(10), now), "less than a minute ago");
        assert_eq!(format_distance(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_distance(now - Duration::hours(3), now), "about 3 hours ago");
        assert_eq!(format_distance(now - Duration::days(3), now), "3 days ago");
        assert_eq!(format_distance(now - Duration::days(400), now), "about 1 year ago");
        assert_eq!(format_distance(now + Duration::minutes(5), now), "in 5 minutes");
    }

    #[test]
    fn renders_rows_and_summary() {
        let rows = vec![repo(1, "facebook", "react")];
        let mut p = props(&rows);
        p.item_count = 1;
        p.page_count = 1;
        let out = render(&p, 200, now());

        assert!(out.contains("[JavaScript]"));
        assert!(out.contains("Stars ↓"));
        assert!(out.contains("Forks ↕"));
        assert!(out.contains("facebook/react"));
        assert!(out.contains("react by facebook"));
        assert!(out.contains("    https://github.com/facebook/react  (owner https://github.com/facebook)"));
        assert!(out.ends_with("Showing 1-1 of 1 · Page 1 of 1"));
    }

    #[test]
    fn narrow_render_drops_description() {
        let rows = vec![repo(1, "facebook", "react")];
        let out = render(&props(&rows), 80, now());
        assert!(!out.contains("Description"));
        assert!(!out.contains("react by facebook"));
    }

    #[test]
    fn loading_wins_over_rows_and_empty_shows_no_results() {
        let rows = vec![repo(1, "facebook", "react")];
        let mut p = props(&rows);
        p.is_loading = true;
        let out = render(&p, 200, now());
        assert!(out.contains("Loading..."));
        assert!(!out.contains("facebook/react"));

        let empty: [GitHubRepo; 0] = [];
        let mut p = props(&empty);
        p.item_count = 0;
        p.page_count = 0;
        let out = render(&p, 200, now());
        assert!(out.contains("No results."));
        assert!(out.ends_with("No pages"));
    }

    #[test]
    fn summary_reflects_page_offset() {
        let rows: Vec<_> = (0..10).map(|i| repo(i, "o", "r")).collect();
        let mut p = props(&rows);
        p.page_index = 4;
        assert_eq!(pagination_summary(&p), "Showing 41-50 of 5000 · Page 5 of 100");
    }

    #[test]
    fn summary_past_last_page_shows_page_only() {
        let empty: [GitHubRepo; 0] = [];
        let mut p = props(&empty);
        p.item_count = 50;
        p.page_count = 5;
        p.page_index = 499;
        assert_eq!(pagination_summary(&p), "Page 500 of 5");

        let rows = vec![repo(1, "o", "r")];
        let mut p = props(&rows);
        p.item_count = 50;
        p.page_count = 5;
        p.page_index = 7;
        assert_eq!(pagination_summary(&p), "Page 8 of 5");
    }

    #[test]
    fn narrow_render_still_links_each_repo() {
        let rows = vec![repo(1, "facebook", "react")];
        let out = render(&props(&rows), 80, now());
        assert!(out.contains("https://github.com/facebook/react"));
    }
}
