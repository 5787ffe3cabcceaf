use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub api_base: String,
    /// Keep the last query string around for startups without `--url`.
    pub persist_state: bool,
    pub debounce_ms: u64,
    pub stale_secs: u64,
    pub gc_secs: u64,
    pub last_query: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            api_base: DEFAULT_API_BASE.to_string(),
            persist_state: true,
            debounce_ms: 1000,
            stale_secs: 10,
            gc_secs: 300,
            last_query: None,
        }
    }
}

impl SearchConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::load_from(&Self::config_path()?))
    }

    /// Like [`Self::load`], but an unreadable file is an error instead of
    /// defaults. Use this before writing the file back.
    pub fn try_load() -> Result<Self, ConfigError> {
        Self::try_load_from(&Self::config_path()?)
    }

    /// A missing file yields defaults.
    pub fn try_load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SearchConfig::default())
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load_from(path: &Path) -> Self {
        Self::try_load_from(path).unwrap_or_else(|e| {
            tracing::warn!("ignoring config: {}", e);
            SearchConfig::default()
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents).map_err(io_err)
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var("GITSEARCH_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let home = std::env::var("HOME").map_err(|_| ConfigError::NoHome)?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("gitsearch")
            .join("config.json"))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_secs)
    }

    pub fn gc_after(&self) -> Duration {
        Duration::from_secs(self.gc_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SearchConfig::load_from(&dir.path().join("nope.json"));
        assert_eq!(config, SearchConfig::default());
    }

    #[test]
    fn garbage_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(SearchConfig::load_from(&path), SearchConfig::default());
    }

    #[test]
    fn strict_load_reports_bad_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"debounce_ms": "fast"}"#).unwrap();
        assert!(matches!(
            SearchConfig::try_load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert_eq!(
            SearchConfig::try_load_from(&dir.path().join("nope.json")).unwrap(),
            SearchConfig::default()
        );
    }

    #[test]
    fn save_creates_directories_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = SearchConfig {
            persist_state: false,
            last_query: Some("q=tokio".to_string()),
            ..SearchConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(SearchConfig::load_from(&path), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"debounce_ms": 250}"#).unwrap();
        let config = SearchConfig::load_from(&path);
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.stale_after(), Duration::from_secs(10));
        assert!(config.persist_state);
    }
}
