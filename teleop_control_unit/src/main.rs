//! # Teleop Control Unit
//!
//! Loads the TOML config (defaults when the file is missing), creates the
//! actuator backend by name, then runs the control loop and session server
//! until Ctrl-C or a `shutdown` command.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use teleop_common::config::LogLevel;
use teleop_common::consts::DEFAULT_CONFIG_PATH;
use teleop_control_unit::config::{ConfigOverrides, load_config};
use teleop_control_unit::error::TeleopError;
use teleop_control_unit::service::Service;
use teleop_hal::ActuatorRegistry;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Teleop Control Unit: locomotion and head arbitration server
#[derive(Parser, Debug)]
#[command(name = "teleop_control_unit")]
#[command(version)]
#[command(about = "Fixed-rate teleoperation control loop behind a line-delimited JSON server")]
struct Args {
    /// Path to the configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Bind address (overrides server.host).
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides server.port).
    #[arg(long)]
    port: Option<u16>,

    /// Control loop frequency in Hz (overrides control.loop_hz).
    #[arg(long)]
    loop_hz: Option<f64>,

    /// Actuator backend name (overrides actuator.driver).
    #[arg(long)]
    driver: Option<String>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // The config carries the log level, so peek at it before the subscriber
    // exists; load_config logs again once tracing is up.
    let level = if args.verbose {
        LogLevel::Debug
    } else {
        peek_log_level(&args)
    };
    setup_tracing(level, args.json);

    info!("Teleop Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args).await {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Teleop Control Unit shutdown complete");
}

async fn run(args: &Args) -> Result<(), TeleopError> {
    let overrides = ConfigOverrides {
        host: args.host.clone(),
        port: args.port,
        loop_hz: args.loop_hz,
        driver: args.driver.clone(),
    };
    let loaded = load_config(&args.config, &overrides)?;
    let config = loaded.config;

    let registry = ActuatorRegistry::with_builtin();
    let actuator = registry.create(&config.actuator)?;
    info!(
        "Actuator '{}' initialized (available backends: {:?})",
        actuator.name(),
        registry.list_backends()
    );

    let service = Service::start(&config, Arc::from(actuator)).await?;

    let state = Arc::clone(service.state());
    tokio::spawn(async move {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => info!("Received shutdown signal"),
                    Err(e) => warn!("Signal handler failed, shutting down: {e}"),
                }
                state.shutdown.request();
            }
            _ = state.shutdown.wait() => {}
        }
    });

    let report = service.wait().await?;
    info!(
        "Control loop: {} cycles, avg={}us, max={}us, overruns={}, actuator faults={}",
        report.loop_stats.cycle_count,
        report.loop_stats.avg_tick_us(),
        report.loop_stats.max_tick_us,
        report.loop_stats.overruns,
        report.loop_stats.actuator_faults
    );
    if report.abandoned_connections > 0 {
        warn!(
            "{} connection(s) abandoned at shutdown",
            report.abandoned_connections
        );
    }
    Ok(())
}

fn peek_log_level(args: &Args) -> LogLevel {
    use teleop_common::config::ConfigLoader;
    use teleop_common::control_unit::TeleopConfig;

    TeleopConfig::load(&args.config)
        .map(|config| config.shared.log_level)
        .unwrap_or_default()
}

fn setup_tracing(level: LogLevel, json: bool) {
    let filter = EnvFilter::from_default_env().add_directive(level.as_tracing_level().into());

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
