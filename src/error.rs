//! Error types for configuration, targets and the monitor run

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating or reading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in config file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML in config file {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported config format for {} (expected .toml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Reasons a single target is rejected before it is scheduled
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported scheme \"{0}\" (expected http or https)")]
    UnsupportedScheme(String),

    #[error("url has no host")]
    MissingHost,

    #[error("unsupported target type \"{0}\"")]
    UnsupportedType(String),
}

/// Errors that abort a monitor run as a whole
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("no targets configured")]
    NoTargets,

    #[error("none of the configured targets are valid ({skipped} skipped)")]
    NoValidTargets { skipped: usize },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
