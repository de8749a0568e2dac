pub mod actors;
pub mod config;
pub mod duration;
pub mod error;
pub mod target;
pub mod util;

pub use actors::messages::{ProbeResult, ProbeStatus, SchedulerState};
pub use actors::probe::{HttpProbe, Probe};
pub use actors::shutdown::{ShutdownSignal, ShutdownTrigger, shutdown_channel};
pub use actors::sink::{ResultSink, TracingSink};
pub use actors::supervisor::{Monitor, MonitorSettings, run};
pub use error::{ConfigError, MonitorError, TargetError};
pub use target::{EffectiveSchedule, GlobalSchedule, Target, resolve};
