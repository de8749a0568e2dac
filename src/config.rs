use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::duration::parse_optional;
use crate::error::ConfigError;
use crate::target::GlobalSchedule;
use crate::util;

/// Top-level configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct Config {
    /// Global polling interval (e.g. `"30s"`), used by targets without their own
    pub interval: Option<String>,

    /// Global per-probe timeout (e.g. `"5s"`)
    pub timeout: Option<String>,

    /// Skip TLS certificate verification for every target
    #[serde(default)]
    pub insecure_skip_verify: bool,

    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// A target as written in the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct TargetConfig {
    pub name: Option<String>,
    pub url: String,

    /// Probe type, only `http` is supported
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub interval: Option<String>,
    pub timeout: Option<String>,
}

impl TargetConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    pub fn with_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// The configured name, or the URL as written when the name is absent or blank
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.url)
    }
}

impl Config {
    /// Override the global interval and timeout with `PULSE_INTERVAL` / `PULSE_TIMEOUT`
    pub fn apply_env_overrides(&mut self) {
        if let Some(interval) = util::get_interval() {
            debug!("global interval overridden from environment: {interval}");
            self.interval = Some(interval);
        }
        if let Some(timeout) = util::get_timeout() {
            debug!("global timeout overridden from environment: {timeout}");
            self.timeout = Some(timeout);
        }
    }

    /// Parse the global interval and timeout, treating malformed values as unset
    pub fn global_schedule(&self) -> GlobalSchedule {
        GlobalSchedule {
            interval: parse_global("interval", self.interval.as_deref()),
            timeout: parse_global("timeout", self.timeout.as_deref()),
        }
    }
}

fn parse_global(field: &str, raw: Option<&str>) -> Duration {
    match parse_optional(raw) {
        Some(Ok(duration)) => duration,
        Some(Err(e)) => {
            warn!("ignoring invalid global {field}: {e}");
            Duration::ZERO
        }
        None => Duration::ZERO,
    }
}

pub fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let file_content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let config: Result<Config, ConfigError> = match extension.as_deref() {
        Some("json") => {
            serde_json::from_str(&file_content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
        Some("toml") => toml::from_str(&file_content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        }),
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    config.inspect(|config| trace!("loaded config: {config:?}"))
}

/// Locate and read the configuration
///
/// Lookup order: the explicit path, then `PULSE_CONFIG`, then `pulse.toml` /
/// `pulse.json` in the home directory, the working directory and `/etc/pulse`.
/// An explicitly named file must be readable; when nothing is found the
/// defaults are used. Environment overrides are applied in every case.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path: Option<PathBuf> = explicit
        .map(Path::to_path_buf)
        .or_else(util::get_config_path)
        .or_else(|| util::find_config_file(&util::config_search_dirs()));

    let mut config = match path {
        Some(path) => {
            debug!("using config file {}", path.display());
            read_config_file(&path)?
        }
        None => {
            warn!("no config file found, using defaults and environment variables");
            Config::default()
        }
    };

    config.apply_env_overrides();

    Ok(config)
}
