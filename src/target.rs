//! Targets and the resolution of their effective schedule
//!
//! A [`Target`] is a validated [`TargetConfig`]. Before a target's loop starts
//! its [`EffectiveSchedule`] is derived with [`resolve`], which applies a fixed
//! precedence order and never yields a zero interval or timeout.

use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::config::TargetConfig;
use crate::duration::parse_optional;
use crate::error::TargetError;

/// Interval used when nothing else is configured
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Timeout used when nothing else is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const REDACTED: &str = "xxxxx";

/// Query parameters whose values are hidden in displayed URLs
const SECRET_QUERY_KEYS: &[&str] = &[
    "access_token",
    "api_key",
    "apikey",
    "auth",
    "key",
    "password",
    "secret",
    "sig",
    "signature",
    "token",
];

/// A validated target, immutable for the lifetime of the monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub url: Url,
    pub interval_raw: Option<String>,
    pub timeout_raw: Option<String>,
}

impl Target {
    /// Validate a raw target from the configuration
    ///
    /// The name falls back to the URL as written when absent or blank.
    pub fn from_config(config: &TargetConfig) -> Result<Self, TargetError> {
        if let Some(kind) = config.kind.as_deref()
            && !kind.trim().is_empty()
            && !kind.eq_ignore_ascii_case("http")
        {
            return Err(TargetError::UnsupportedType(kind.to_string()));
        }

        let url = Url::parse(config.url.trim())?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(TargetError::UnsupportedScheme(other.to_string())),
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(TargetError::MissingHost);
        }

        let name = config.display_name().to_string();

        Ok(Self {
            name,
            url,
            interval_raw: config.interval.clone(),
            timeout_raw: config.timeout.clone(),
        })
    }

    /// Host (and port, if explicit) of the target
    pub fn host(&self) -> String {
        match (self.url.host_str(), self.url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        }
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// The URL with credentials and secret query values masked
    pub fn redacted_url(&self) -> String {
        let mut url = self.url.clone();

        if url.password().is_some() {
            // only fails for cannot-be-a-base URLs, which were rejected above
            let _ = url.set_password(Some(REDACTED));
        }

        if url.query_pairs().any(|(key, _)| is_secret_key(&key)) {
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .map(|(key, value)| {
                    let value = if is_secret_key(&key) {
                        REDACTED.to_string()
                    } else {
                        value.into_owned()
                    };
                    (key.into_owned(), value)
                })
                .collect();

            url.query_pairs_mut().clear().extend_pairs(pairs);
        }

        url.to_string()
    }
}

fn is_secret_key(key: &str) -> bool {
    SECRET_QUERY_KEYS
        .iter()
        .any(|secret| key.eq_ignore_ascii_case(secret))
}

/// Global schedule values from the configuration; zero means unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalSchedule {
    pub interval: Duration,
    pub timeout: Duration,
}

/// The interval and timeout actually used to drive a target's loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveSchedule {
    pub interval: Duration,
    pub timeout: Duration,
}

/// Resolve the effective schedule of a target
///
/// Interval precedence, highest first:
/// 1. `cli_override`, when `cli_override_set` and non-zero
/// 2. the target's own interval; an invalid or zero value falls back to
///    [`DEFAULT_INTERVAL`] with a warning
/// 3. the global interval, when non-zero
/// 4. [`DEFAULT_INTERVAL`]
///
/// The timeout is the target's own timeout if valid, then the global timeout if
/// non-zero, then [`DEFAULT_TIMEOUT`].
pub fn resolve(
    target: &Target,
    global: &GlobalSchedule,
    cli_override: Duration,
    cli_override_set: bool,
) -> EffectiveSchedule {
    EffectiveSchedule {
        interval: resolve_interval(target, global.interval, cli_override, cli_override_set),
        timeout: resolve_timeout(target, global.timeout),
    }
}

fn resolve_interval(
    target: &Target,
    global_interval: Duration,
    cli_override: Duration,
    cli_override_set: bool,
) -> Duration {
    if cli_override_set && !cli_override.is_zero() {
        return cli_override;
    }

    if let Some(parsed) = parse_optional(target.interval_raw.as_deref()) {
        return match parsed {
            Ok(interval) if !interval.is_zero() => interval,
            Ok(_) => {
                warn!(
                    target_name = %target.name,
                    interval = ?target.interval_raw,
                    "interval must be positive, using default"
                );
                DEFAULT_INTERVAL
            }
            Err(e) => {
                warn!(
                    target_name = %target.name,
                    interval = ?target.interval_raw,
                    error = %e,
                    "invalid interval for target, using default"
                );
                DEFAULT_INTERVAL
            }
        };
    }

    if !global_interval.is_zero() {
        return global_interval;
    }

    DEFAULT_INTERVAL
}

fn resolve_timeout(target: &Target, global_timeout: Duration) -> Duration {
    match parse_optional(target.timeout_raw.as_deref()) {
        Some(Ok(timeout)) if !timeout.is_zero() => return timeout,
        Some(Ok(_)) => {
            warn!(target_name = %target.name, "timeout must be positive, ignoring");
        }
        Some(Err(e)) => {
            warn!(
                target_name = %target.name,
                timeout = ?target.timeout_raw,
                error = %e,
                "invalid timeout for target, ignoring"
            );
        }
        None => {}
    }

    if !global_timeout.is_zero() {
        return global_timeout;
    }

    DEFAULT_TIMEOUT
}
