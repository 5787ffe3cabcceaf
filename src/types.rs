use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_QUERY: &str = "react";
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

/// Languages offered as filter tabs. The first variant is the default.
#[derive(Serialize, Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Javascript,
    Scala,
    Python,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Javascript, Language::Scala, Language::Python];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Scala => "scala",
            Language::Python => "python",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::Javascript => "JavaScript",
            Language::Scala => "Scala",
            Language::Python => "Python",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.as_str() == value)
    }
}

/// Sort fields the search API understands.
#[derive(Serialize, Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sort {
    #[default]
    Stars,
    Forks,
    Updated,
}

impl Sort {
    pub const ALL: [Sort; 3] = [Sort::Stars, Sort::Forks, Sort::Updated];

    pub fn as_str(self) -> &'static str {
        match self {
            Sort::Stars => "stars",
            Sort::Forks => "forks",
            Sort::Updated => "updated",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sort| sort.as_str() == value)
    }
}

#[derive(Serialize, Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Desc,
    Asc,
}

impl Order {
    pub fn as_str(self) -> &'static str {
        match self {
            Order::Desc => "desc",
            Order::Asc => "asc",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "desc" => Some(Order::Desc),
            "asc" => Some(Order::Asc),
            _ => None,
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Language, Sort, Order);

/// The complete search state. Always fully populated and valid; it doubles as
/// the result cache key, so every field takes part in equality and hashing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchParams {
    pub page: u32,
    pub per_page: u32,
    pub sort: Sort,
    pub order: Order,
    pub lang: Language,
    pub q: String,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            sort: Sort::default(),
            order: Order::default(),
            lang: Language::default(),
            q: DEFAULT_QUERY.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Owner {
    pub login: String,
    pub html_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
    pub html_url: String,
    pub description: Option<String>,
    pub stargazers_count: u32,
    pub forks_count: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GitHubSearchResponse {
    /// Reported match count. The API will not page past the first 1000 items
    /// no matter how large this is.
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<GitHubRepo>,
}
