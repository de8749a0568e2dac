use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pulse::{
    Monitor, MonitorSettings, ShutdownSignal, config::load_config, duration::parse_duration_arg,
};
use tracing::{level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

/// A lightweight, real-time service health monitor for the command line
#[derive(Debug, Clone, Parser)]
#[command(name = "pulse", version)]
struct Args {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines instead of compact text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Continuously probe the configured targets and report their health
    Monitor {
        /// Polling interval for every target (overrides config)
        #[arg(short, long, value_parser = parse_duration_arg)]
        interval: Option<Duration>,

        /// Skip TLS certificate verification
        #[arg(long)]
        insecure: bool,
    },
}

fn init(verbose: bool, json: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = filter::Targets::new().with_targets(vec![("pulse", level)]);

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .compact()
                    .with_ansi(false),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    init(args.verbose, args.json);
    trace!("started with args: {args:?}");

    let config = load_config(args.config.as_deref()).context("failed to load configuration")?;

    match args.command {
        Command::Monitor { interval, insecure } => {
            let mut settings = MonitorSettings::from_config(&config)
                .with_cli_override(interval)
                .with_os_signals(true);
            settings.insecure_skip_verify |= insecure;

            let monitor = Monitor::new(settings)?;
            monitor
                .run(&config.targets, ShutdownSignal::never())
                .await
                .context("monitoring failed")?;
        }
    }

    Ok(())
}
