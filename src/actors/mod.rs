//! Actor-based monitoring
//!
//! Every target is watched by its own scheduler running as an independent async
//! task. The supervisor spawns them, shares one probe, one result sink and one
//! shutdown signal between them, and joins them on shutdown.
//!
//! ## Architecture Overview
//!
//! ```text
//!                    ┌──────────────────┐
//!                    │ Monitor (main)   │◀── Ctrl-C / SIGTERM / external signal
//!                    └────────┬─────────┘
//!                             │ spawns, shares ShutdownSignal
//!                ┌────────────┼────────────┐
//!                │            │            │
//!        ┌───────▼───────┐    │    ┌───────▼───────┐
//!        │ Scheduler-1   │    │    │ Scheduler-N   │
//!        │ (Target A)    │    │    │ (Target N)    │
//!        └───────┬───────┘    │    └───────┬───────┘
//!                │   HttpProbe (shared connection pool)
//!                └────────────┼────────────┘
//!                             │ ProbeResult
//!                   ┌─────────▼──────────┐
//!                   │ ResultSink         │ (tracing log line / broadcast channel)
//!                   └────────────────────┘
//! ```
//!
//! ## Actor Types
//!
//! - **TargetScheduler**: probes one target immediately, then on every tick
//! - **Monitor**: validates targets, resolves schedules, spawns and joins schedulers

pub mod messages;
pub mod probe;
pub mod scheduler;
pub mod shutdown;
pub mod sink;
pub mod supervisor;
