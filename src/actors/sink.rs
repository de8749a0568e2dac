//! Result sinks - where every [`ProbeResult`] ends up
//!
//! The scheduler hands each result to its sink synchronously before waiting for
//! the next tick, so a sink sees the results of one target in probe order.

use tokio::sync::broadcast;
use tracing::{info, trace, warn};

use super::messages::{ProbeResult, ProbeStatus};

/// Receiver of probe results
///
/// Sinks are shared by all scheduler loops and must serialize their own output.
pub trait ResultSink: Send + Sync {
    fn emit(&self, result: ProbeResult);
}

/// Renders every result as one structured log line
///
/// `tracing-subscriber`'s fmt layer formats an event into a buffer and writes it
/// in one call, so lines from concurrent loops never interleave.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ResultSink for TracingSink {
    fn emit(&self, result: ProbeResult) {
        let latency = format!("{:?}", result.latency);

        match result.status {
            ProbeStatus::Up => info!(
                target_name = %result.target_name,
                url = %result.url,
                host = %result.host,
                path = %result.path,
                status = result.http_status_code,
                latency = %latency,
                "UP"
            ),
            ProbeStatus::Unhealthy => warn!(
                target_name = %result.target_name,
                url = %result.url,
                host = %result.host,
                path = %result.path,
                status = result.http_status_code,
                latency = %latency,
                "UNHEALTHY"
            ),
            ProbeStatus::Down => warn!(
                target_name = %result.target_name,
                url = %result.url,
                host = %result.host,
                path = %result.path,
                latency = %latency,
                error = result.error.as_deref().unwrap_or_default(),
                "DOWN"
            ),
        }
    }
}

/// Publishes results to a broadcast channel
///
/// It's OK if there are no subscribers, the result is dropped in that case.
impl ResultSink for broadcast::Sender<ProbeResult> {
    fn emit(&self, result: ProbeResult) {
        match self.send(result) {
            Ok(num_receivers) => {
                trace!("published probe result to {num_receivers} receivers");
            }
            Err(_) => {
                trace!("no receivers for probe result");
            }
        }
    }
}
