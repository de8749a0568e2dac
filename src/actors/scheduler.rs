//! TargetScheduler - drives the probes of a single target
//!
//! Each valid target gets its own scheduler running as an independent task.
//!
//! ## Lifecycle
//!
//! ```text
//! Starting ──probe──▶ Running ──tick──▶ probe ──▶ Running
//!                        │
//!                        └── shutdown ──▶ Stopped
//! ```
//!
//! The first probe is issued immediately. After that the loop waits for either
//! the shared shutdown signal or the next tick of a periodic timer. A slow probe
//! delays the next tick instead of queueing several, so at most one probe per
//! target is ever in flight.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, instrument, trace, warn};

use crate::target::{DEFAULT_INTERVAL, EffectiveSchedule, Target};

use super::messages::SchedulerState;
use super::probe::Probe;
use super::shutdown::ShutdownSignal;
use super::sink::ResultSink;

/// Resources shared by every scheduler of a monitor run
#[derive(Clone)]
pub struct SchedulerContext {
    pub probe: Arc<dyn Probe>,
    pub sink: Arc<dyn ResultSink>,
    pub shutdown: ShutdownSignal,
}

/// Polling loop for a single target
pub struct TargetScheduler {
    target: Arc<Target>,

    /// Resolved interval and timeout
    schedule: EffectiveSchedule,

    context: SchedulerContext,

    /// Publishes lifecycle changes to the handle
    state_tx: watch::Sender<SchedulerState>,
}

impl TargetScheduler {
    pub fn new(
        target: Arc<Target>,
        schedule: EffectiveSchedule,
        context: SchedulerContext,
    ) -> (Self, watch::Receiver<SchedulerState>) {
        let (state_tx, state_rx) = watch::channel(SchedulerState::Starting);

        (
            Self {
                target,
                schedule,
                context,
                state_tx,
            },
            state_rx,
        )
    }

    /// Run the loop until the shutdown signal fires
    #[instrument(skip(self), fields(target = %self.target.name))]
    pub async fn run(mut self) {
        debug!(
            url = %self.target.redacted_url(),
            interval = ?self.schedule.interval,
            timeout = ?self.schedule.timeout,
            "start monitoring target"
        );

        let mut period = self.schedule.interval;
        let first_tick = match Instant::now().checked_add(period) {
            Some(first_tick) => first_tick,
            None => {
                warn!(
                    interval = ?period,
                    "interval out of range, using default of {DEFAULT_INTERVAL:?}"
                );
                period = DEFAULT_INTERVAL;
                Instant::now() + period
            }
        };
        let mut ticker = interval_at(first_tick, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        if !self.context.shutdown.is_cancelled() {
            self.probe_once().await;
            self.state_tx.send_replace(SchedulerState::Running);

            loop {
                tokio::select! {
                    biased;

                    _ = self.context.shutdown.cancelled() => {
                        trace!("received shutdown signal");
                        break;
                    }

                    _ = ticker.tick() => {
                        // the tick and the signal may have become ready together
                        if self.context.shutdown.is_cancelled() {
                            break;
                        }
                        self.probe_once().await;
                    }
                }
            }
        }

        self.state_tx.send_replace(SchedulerState::Stopped);
        debug!("stop monitoring target");
    }

    /// Probe the target and hand the result to the sink
    async fn probe_once(&self) {
        let result = self
            .context
            .probe
            .probe(&self.target, self.schedule.timeout)
            .await;
        self.context.sink.emit(result);
    }
}

/// Handle to a spawned [`TargetScheduler`]
pub struct SchedulerHandle {
    target_name: String,
    state_rx: watch::Receiver<SchedulerState>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Spawn a scheduler for `target` on the runtime
    pub fn spawn(
        target: Arc<Target>,
        schedule: EffectiveSchedule,
        context: SchedulerContext,
    ) -> Self {
        let target_name = target.name.clone();
        let (scheduler, state_rx) = TargetScheduler::new(target, schedule, context);

        let task = tokio::spawn(scheduler.run());

        Self {
            target_name,
            state_rx,
            task,
        }
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Current lifecycle state
    pub fn state(&self) -> SchedulerState {
        *self.state_rx.borrow()
    }

    /// Wait for the scheduler to stop
    pub async fn join(self) -> Result<(), JoinError> {
        self.task.await
    }
}
