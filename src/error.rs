use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the repository search service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed ({status})")]
    Unauthorized { status: u16 },

    /// Request quota exhausted. Never retried.
    #[error("rate limit exceeded, quota resets in {}s", reset_after.as_secs())]
    PrimaryRateLimit { reset_after: Duration },

    /// Abuse detection kicked in. The retry layer may try once more.
    #[error("secondary rate limit hit, retry after {}s", retry_after.as_secs())]
    SecondaryRateLimit { retry_after: Duration },

    #[error("GitHub API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no HOME directory to store configuration in")]
    NoHome,

    #[error("can't access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("can't parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("can't serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}
