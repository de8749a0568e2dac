//! Message types exchanged between the monitor actors
//!
//! [`ProbeResult`] is produced once per probe and handed to a result sink.
//! Results are cloneable so they can be fanned out over a broadcast channel.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Classification of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Reachable and answered with a 2xx status
    Up,

    /// Reachable but answered with a non-2xx status
    Unhealthy,

    /// Not reachable (connection, DNS, TLS failure or timeout)
    Down,
}

impl ProbeStatus {
    /// Classify an HTTP status code
    pub fn from_status_code(code: u16) -> Self {
        if (200..300).contains(&code) {
            ProbeStatus::Up
        } else {
            ProbeStatus::Unhealthy
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Up => write!(f, "UP"),
            ProbeStatus::Unhealthy => write!(f, "UNHEALTHY"),
            ProbeStatus::Down => write!(f, "DOWN"),
        }
    }
}

/// Outcome of one probe against a target
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub target_name: String,

    /// URL with credentials and secret query values masked
    pub url: String,

    pub host: String,
    pub path: String,

    pub status: ProbeStatus,

    /// Only present when the target answered (`Up` or `Unhealthy`)
    pub http_status_code: Option<u16>,

    /// Wall-clock duration of the attempt, measured for every outcome
    pub latency: Duration,

    /// Only present when the target was `Down`
    pub error: Option<String>,

    /// When the probe was issued
    pub timestamp: DateTime<Utc>,
}

/// Lifecycle of a target scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Issuing the immediate first probe
    Starting,

    /// Probing on every tick
    Running,

    /// Cancelled, no further probes are issued
    Stopped,
}
