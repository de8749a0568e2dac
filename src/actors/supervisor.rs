//! Monitor supervisor - fans targets out into scheduler tasks and joins them
//!
//! ## Message Flow
//!
//! ```text
//! TargetConfig[] → validate → resolve → SchedulerHandle::spawn (one per target)
//!                                              │
//!     OS interrupt ─┐                          ▼
//!                   ├─▶ ShutdownTrigger ─▶ every scheduler stops ─▶ join all ─▶ Ok(())
//!   external signal ┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{Config, TargetConfig};
use crate::error::MonitorError;
use crate::target::{EffectiveSchedule, GlobalSchedule, Target, resolve};

use super::probe::{HttpProbe, Probe};
use super::scheduler::{SchedulerContext, SchedulerHandle};
use super::shutdown::{ShutdownSignal, ShutdownTrigger, os_shutdown_signal, shutdown_channel};
use super::sink::{ResultSink, TracingSink};

/// Settings of a monitor run, built once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Global interval and timeout from the configuration (zero = unset)
    pub global: GlobalSchedule,

    /// Interval given on the command line
    pub cli_override: Duration,

    /// Whether the operator passed the interval flag explicitly
    pub cli_override_set: bool,

    /// Skip TLS certificate verification
    pub insecure_skip_verify: bool,

    /// Stop on Ctrl-C / SIGTERM in addition to the external signal
    pub handle_os_signals: bool,
}

impl MonitorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            global: config.global_schedule(),
            insecure_skip_verify: config.insecure_skip_verify,
            ..Default::default()
        }
    }

    /// Apply the interval flag from the command line
    pub fn with_cli_override(mut self, interval: Option<Duration>) -> Self {
        if let Some(interval) = interval {
            self.cli_override = interval;
            self.cli_override_set = true;
        }
        self
    }

    pub fn with_os_signals(mut self, enabled: bool) -> Self {
        self.handle_os_signals = enabled;
        self
    }
}

/// A validated target with its resolved schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTarget {
    pub target: Target,
    pub schedule: EffectiveSchedule,
}

/// Owns the shared probe and sink and runs one scheduler per target
pub struct Monitor {
    settings: MonitorSettings,
    probe: Arc<dyn Probe>,
    sink: Arc<dyn ResultSink>,
}

impl Monitor {
    /// Create a monitor probing over HTTP and reporting through `tracing`
    pub fn new(settings: MonitorSettings) -> Result<Self, MonitorError> {
        let probe = HttpProbe::new(settings.insecure_skip_verify)?;

        Ok(Self {
            settings,
            probe: Arc::new(probe),
            sink: Arc::new(TracingSink),
        })
    }

    pub fn with_probe(mut self, probe: Arc<dyn Probe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Validate the targets and resolve their schedules
    ///
    /// Invalid targets are skipped with a warning. Fails if the list is empty
    /// or no valid target remains.
    pub fn prepare(&self, targets: &[TargetConfig]) -> Result<Vec<PreparedTarget>, MonitorError> {
        if targets.is_empty() {
            return Err(MonitorError::NoTargets);
        }

        let mut prepared = Vec::with_capacity(targets.len());
        let mut skipped = 0;

        for config in targets {
            match Target::from_config(config) {
                Ok(target) => {
                    let schedule = resolve(
                        &target,
                        &self.settings.global,
                        self.settings.cli_override,
                        self.settings.cli_override_set,
                    );
                    prepared.push(PreparedTarget { target, schedule });
                }
                Err(e) => {
                    warn!(
                        target_name = %config.display_name(),
                        url = %config.url,
                        error = %e,
                        "skipping invalid target"
                    );
                    skipped += 1;
                }
            }
        }

        if prepared.is_empty() {
            return Err(MonitorError::NoValidTargets { skipped });
        }

        if skipped > 0 {
            warn!("skipped {skipped} invalid target(s)");
        }

        Ok(prepared)
    }

    /// Probe every valid target until shutdown
    ///
    /// Returns once every scheduler has stopped. Probe failures are reported to
    /// the sink and never fail the run.
    #[instrument(skip_all)]
    pub async fn run(
        &self,
        targets: &[TargetConfig],
        external: ShutdownSignal,
    ) -> Result<(), MonitorError> {
        let prepared = self.prepare(targets)?;

        let (trigger, shutdown) = shutdown_channel();
        let forwarder = tokio::spawn(forward_shutdown(
            trigger,
            external,
            self.settings.handle_os_signals,
        ));

        let context = SchedulerContext {
            probe: self.probe.clone(),
            sink: self.sink.clone(),
            shutdown,
        };

        let handles: Vec<SchedulerHandle> = prepared
            .into_iter()
            .map(|PreparedTarget { target, schedule }| {
                SchedulerHandle::spawn(Arc::new(target), schedule, context.clone())
            })
            .collect();

        info!("monitoring {} target(s)", handles.len());

        let outcomes = join_all(handles.into_iter().map(|handle| async move {
            let name = handle.target_name().to_string();
            (name, handle.join().await)
        }))
        .await;

        for (name, outcome) in outcomes {
            if let Err(e) = outcome {
                error!(target_name = %name, "scheduler task failed: {e}");
            }
        }

        forwarder.abort();
        info!("all targets stopped");

        Ok(())
    }
}

/// Run a monitor with the HTTP probe and the tracing sink
pub async fn run(
    targets: &[TargetConfig],
    settings: MonitorSettings,
    external: ShutdownSignal,
) -> Result<(), MonitorError> {
    Monitor::new(settings)?.run(targets, external).await
}

/// Fire `trigger` on the first of the external signal or an OS interrupt
async fn forward_shutdown(trigger: ShutdownTrigger, mut external: ShutdownSignal, os_signals: bool) {
    if os_signals {
        tokio::select! {
            _ = external.cancelled() => debug!("external shutdown requested"),
            _ = os_shutdown_signal() => info!("received interrupt, shutting down"),
        }
    } else {
        external.cancelled().await;
        debug!("external shutdown requested");
    }

    trigger.trigger();
}
