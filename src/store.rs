//! Search state that stays in sync with the address and an optional snapshot.

use crate::codec;
use crate::config::SearchConfig;
use crate::error::ConfigError;
use crate::types::SearchParams;
use std::path::PathBuf;

/// Where the current query string is shown. `replace` rewrites it in place
/// without adding a history entry.
pub trait NavigationSink {
    fn query(&self) -> String;
    fn replace(&mut self, query: &str);
}

/// Single-slot persistence for the last encoded query string.
pub trait SnapshotStore {
    fn load(&self) -> Option<String>;
    fn save(&mut self, query: &str) -> Result<(), ConfigError>;
}

/// Terminal stand-in for the browser address bar.
#[derive(Debug, Clone, Default)]
pub struct AddressBar {
    path: String,
    query: String,
    replacements: usize,
}

impl AddressBar {
    pub fn new(path: &str, query: &str) -> Self {
        AddressBar {
            path: path.to_string(),
            query: query.trim_start_matches('?').to_string(),
            replacements: 0,
        }
    }

    pub fn href(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }

    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl NavigationSink for AddressBar {
    fn query(&self) -> String {
        self.query.clone()
    }

    fn replace(&mut self, query: &str) {
        self.query = query.to_string();
        self.replacements += 1;
    }
}

/// Keeps the snapshot in the `last_query` field of the config file.
pub struct ConfigSnapshot {
    path: PathBuf,
}

impl ConfigSnapshot {
    pub fn new(path: PathBuf) -> Self {
        ConfigSnapshot { path }
    }
}

impl SnapshotStore for ConfigSnapshot {
    fn load(&self) -> Option<String> {
        SearchConfig::load_from(&self.path).last_query
    }

    /// Leaves a config file it can't parse untouched.
    fn save(&mut self, query: &str) -> Result<(), ConfigError> {
        let mut config = SearchConfig::try_load_from(&self.path)?;
        config.last_query = Some(query.to_string());
        config.save_to(&self.path)
    }
}

pub struct UrlStateStore<N: NavigationSink> {
    state: SearchParams,
    navigation: N,
    snapshot: Option<Box<dyn SnapshotStore>>,
}

impl<N: NavigationSink> UrlStateStore<N> {
    /// Initial state comes from the current address, then the snapshot (when
    /// one is given), then defaults.
    pub fn new(navigation: N, snapshot: Option<Box<dyn SnapshotStore>>) -> Self {
        let mut raw = navigation.query();
        if raw.trim_start_matches('?').is_empty() {
            if let Some(saved) = snapshot.as_ref().and_then(|s| s.load()) {
                tracing::debug!("restoring search state from snapshot: {}", saved);
                raw = saved;
            }
        }
        UrlStateStore {
            state: codec::from_query_string(&raw),
            navigation,
            snapshot,
        }
    }

    pub fn state(&self) -> &SearchParams {
        &self.state
    }

    pub fn navigation(&self) -> &N {
        &self.navigation
    }

    /// Applies `f` to the latest state, then rewrites the address and the
    /// snapshot. A failing snapshot write is logged and otherwise ignored.
    pub fn update<F>(&mut self, f: F) -> &SearchParams
    where
        F: FnOnce(&SearchParams) -> SearchParams,
    {
        self.state = codec::sanitize(&f(&self.state));
        let query = codec::to_query_string(&self.state);
        tracing::debug!("search state -> {}", query);

        self.navigation.replace(&query);
        if let Some(snapshot) = self.snapshot.as_mut() {
            if let Err(e) = snapshot.save(&query) {
                tracing::warn!("couldn't persist search state: {}", e);
            }
        }
        &self.state
    }
}
