//! Probe executor - one HTTP GET per call, classified into a [`ProbeResult`]
//!
//! ## Classification
//!
//! ```text
//! transport error (refused, DNS, TLS, timeout) → Down      (error set)
//! status 200..=299                             → Up        (status code set)
//! any other status                             → Unhealthy (status code set)
//! ```
//!
//! The probe never retries. The next attempt happens on the scheduler's next tick.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{instrument, trace, warn};

use crate::error::MonitorError;
use crate::target::Target;

use super::messages::{ProbeResult, ProbeStatus};

/// A single health check against a target
#[async_trait]
pub trait Probe: Send + Sync {
    /// Probe `target` once, taking at most roughly `timeout`
    async fn probe(&self, target: &Target, timeout: Duration) -> ProbeResult;
}

/// HTTP probe backed by a shared connection pool
#[derive(Debug, Clone)]
pub struct HttpProbe {
    /// HTTP client (shared by every target, safe for concurrent use)
    client: reqwest::Client,
}

impl HttpProbe {
    /// Build a probe with its own client
    ///
    /// Certificate verification stays enabled unless `insecure_skip_verify` is set.
    pub fn new(insecure_skip_verify: bool) -> Result<Self, MonitorError> {
        if insecure_skip_verify {
            warn!("TLS certificate verification is disabled for all targets");
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure_skip_verify)
            .user_agent(concat!("pulse/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Issue the request and drain the body
    ///
    /// Returns the status code and the latency up to the response head.
    async fn execute_request(
        &self,
        target: &Target,
        timeout: Duration,
    ) -> Result<(u16, Duration), reqwest::Error> {
        let start = Instant::now();

        let mut response = self
            .client
            .get(target.url.clone())
            .timeout(timeout)
            .send()
            .await?;

        let latency = start.elapsed();
        let status_code = response.status().as_u16();

        // the body is only read to free the connection
        loop {
            match response.chunk().await {
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(e) => {
                    trace!("failed to drain response body: {e}");
                    break;
                }
            }
        }

        Ok((status_code, latency))
    }
}

#[async_trait]
impl Probe for HttpProbe {
    #[instrument(skip_all, fields(target = %target.name))]
    async fn probe(&self, target: &Target, timeout: Duration) -> ProbeResult {
        trace!("probing {}", target.redacted_url());

        let timestamp = Utc::now();
        let start = Instant::now();

        let outcome = self.execute_request(target, timeout).await;

        let (status, http_status_code, latency, error) = match outcome {
            Ok((code, latency)) => (ProbeStatus::from_status_code(code), Some(code), latency, None),
            Err(e) => (
                ProbeStatus::Down,
                None,
                start.elapsed(),
                Some(describe_error(&e)),
            ),
        };

        ProbeResult {
            target_name: target.name.clone(),
            url: target.redacted_url(),
            host: target.host(),
            path: target.path().to_string(),
            status,
            http_status_code,
            latency,
            error,
            timestamp,
        }
    }
}

/// Render a transport error with its full source chain
///
/// The URL is stripped so credentials never end up in the description.
fn describe_error(error: &reqwest::Error) -> String {
    let kind = if error.is_timeout() {
        "request timed out"
    } else if error.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };

    let mut description = kind.to_string();
    let mut source: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(error);
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }

    description
}
