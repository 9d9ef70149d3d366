//! # Teleop Client
//!
//! Operator CLI for the teleop control unit. Exactly one mode per run:
//! a named preset, one raw JSON request, an interactive REPL, or a virtual
//! stick streamed at a fixed rate.

use std::process;
use std::time::{Duration, Instant};

use clap::{ArgGroup, Parser};
use serde_json::Value;
use teleop_client::error::ClientError;
use teleop_client::mapping::{MapParams, StickState, map_head, map_velocity};
use teleop_client::presets::{self, TargetArgs};
use teleop_client::session::Session;
use teleop_common::consts::DEFAULT_PORT;
use teleop_common::protocol::Request;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const STICK_HZ_DEFAULT: f64 = 20.0;
const STICK_HZ_MIN: f64 = 0.1;
const STICK_HZ_MAX: f64 = 500.0;

/// Teleop Client: send commands to a teleop control unit
#[derive(Parser, Debug)]
#[command(name = "teleop_client")]
#[command(version)]
#[command(about = "Line-delimited JSON client for the teleop control unit")]
#[command(group(ArgGroup::new("mode").required(true).args(["preset", "json", "repl", "stick"])))]
struct Args {
    /// Control unit address.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Control unit port.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Send a named preset: ping | wake | rest | stop | stand | crouch |
    /// deadman:on | deadman:off | target | center | state | shutdown.
    #[arg(long, value_name = "NAME")]
    preset: Option<String>,

    /// Send one raw JSON request, e.g. '{"cmd":"get_state"}'.
    #[arg(long, value_name = "RAW")]
    json: Option<String>,

    /// Interactive mode: one JSON request per stdin line.
    #[arg(long)]
    repl: bool,

    /// Stream a held virtual stick state.
    #[arg(long)]
    stick: bool,

    /// Forward velocity for preset=target.
    #[arg(long, allow_negative_numbers = true)]
    vx: Option<f64>,
    /// Lateral velocity for preset=target.
    #[arg(long, allow_negative_numbers = true)]
    vy: Option<f64>,
    /// Turn velocity for preset=target.
    #[arg(long, allow_negative_numbers = true)]
    vw: Option<f64>,
    /// Target duration in seconds for preset=target.
    #[arg(long)]
    duration: Option<f64>,

    /// Left stick X for --stick.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    lx: f64,
    /// Left stick Y for --stick (up is negative).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    ly: f64,
    /// Right stick X for --stick.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rx: f64,
    /// Right stick Y for --stick (up is negative).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    ry: f64,
    /// Hold the left bumper (turn left).
    #[arg(long)]
    lb: bool,
    /// Hold the right bumper (turn right).
    #[arg(long)]
    rb: bool,
    /// Streaming rate for --stick.
    #[arg(long, default_value_t = 20.0)]
    hz: f64,
    /// Streaming duration for --stick.
    #[arg(long, default_value_t = 5.0)]
    seconds: f64,

    /// Pretty-print replies.
    #[arg(long)]
    pretty: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_tracing(args.verbose);

    if let Err(e) = run(&args).await {
        error!("{e}");
        process::exit(e.exit_code());
    }
}

async fn run(args: &Args) -> Result<(), ClientError> {
    if args.repl {
        return repl(args).await;
    }
    if args.stick {
        return stick(args).await;
    }

    let request = if let Some(raw) = &args.json {
        serde_json::from_str::<Value>(raw).map_err(|e| ClientError::InvalidJson(e.to_string()))?
    } else {
        let name = args.preset.as_deref().unwrap_or_default();
        let target = TargetArgs {
            vx: args.vx,
            vy: args.vy,
            vw: args.vw,
            duration_s: args.duration,
        };
        serde_json::to_value(presets::build(name, &target)?)
            .map_err(|e| ClientError::InvalidJson(e.to_string()))?
    };

    let mut session = Session::connect(&args.host, args.port, CONNECT_TIMEOUT).await?;
    let reply = session.request_raw(&request).await?;
    print_reply(&reply, args.pretty);
    session.close().await
}

async fn repl(args: &Args) -> Result<(), ClientError> {
    let mut session = Session::connect(&args.host, args.port, CONNECT_TIMEOUT).await?;
    info!(
        "Connected to {}:{}. One JSON request per line, EOF or Ctrl-C to exit.",
        args.host, args.port
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(request) => {
                let reply = session.request_raw(&request).await?;
                print_reply(&reply, args.pretty);
            }
            Err(e) => warn!("invalid JSON: {e}"),
        }
    }
    session.close().await
}

async fn stick(args: &Args) -> Result<(), ClientError> {
    let params = MapParams::default();
    let held = StickState {
        lx: args.lx,
        ly: args.ly,
        rx: args.rx,
        ry: args.ry,
        lb: args.lb,
        rb: args.rb,
    };
    let velocity = map_velocity(&held, &params);
    let (yaw_n, pitch_n) = map_head(&held, &params);
    let hz = stick_rate(args.hz);
    let period = Duration::from_secs_f64(1.0 / hz);
    let total = Duration::try_from_secs_f64(args.seconds.max(0.0)).unwrap_or(Duration::ZERO);

    let mut session = Session::connect(&args.host, args.port, CONNECT_TIMEOUT).await?;
    let reply = session
        .request(Request::new("set_deadman").with_arg("enabled", true))
        .await?;
    if !reply.ok {
        warn!("Deadman enable refused: {:?}", reply.error);
    }

    info!(
        "Streaming vx={:+.2} vy={:+.2} vw={:+.2} yaw={:+.2} pitch={:+.2} at {hz:.1} Hz for {:.1}s",
        velocity.vx,
        velocity.vy,
        velocity.vw,
        yaw_n,
        pitch_n,
        total.as_secs_f64()
    );

    let started = Instant::now();
    let mut ticker = tokio::time::interval(period);
    let mut sent = 0u64;
    while started.elapsed() < total {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                break;
            }
        }
        session
            .request(
                Request::new("set_target")
                    .with_arg("vx_n", velocity.vx)
                    .with_arg("vy_n", velocity.vy)
                    .with_arg("vw_n", velocity.vw),
            )
            .await?;
        session
            .request(
                Request::new("set_head")
                    .with_arg("yaw_n", yaw_n)
                    .with_arg("pitch_n", pitch_n),
            )
            .await?;
        sent += 1;
    }
    debug!("Sent {sent} stick updates");

    let reply = session.request(Request::new("stop")).await?;
    session.request(Request::new("set_head")).await?;
    if let Some(data) = reply.data {
        print_reply(&data, args.pretty);
    }
    session.close().await
}

/// Streaming rate kept within a range whose period is always representable.
fn stick_rate(hz: f64) -> f64 {
    if hz.is_finite() && hz > 0.0 {
        hz.clamp(STICK_HZ_MIN, STICK_HZ_MAX)
    } else {
        STICK_HZ_DEFAULT
    }
}

fn print_reply(reply: &Value, pretty: bool) {
    let text = if pretty {
        serde_json::to_string_pretty(reply)
    } else {
        serde_json::to_string(reply)
    };
    match text {
        Ok(text) => println!("{text}"),
        Err(e) => warn!("could not render reply: {e}"),
    }
}

fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
