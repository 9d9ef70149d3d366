//! System-wide constants for the teleop workspace.
//!
//! Single source of truth for numeric limits, defaults and default paths.
//! Imported by all crates; no duplication permitted.

/// Default TCP port of the session server.
pub const DEFAULT_PORT: u16 = 40100;

/// Default bind address of the session server.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default control loop frequency [Hz].
pub const DEFAULT_LOOP_HZ: f64 = 20.0;

/// Control loop frequency bounds [Hz].
pub const LOOP_HZ_MIN: f64 = 1.0;
pub const LOOP_HZ_MAX: f64 = 500.0;

/// Measured tick deltas above this are treated as clock anomalies [s].
pub const MAX_TICK_DT_S: f64 = 0.5;

/// Lower/upper bound of every normalized axis.
pub const NORM_MIN: f64 = -1.0;
pub const NORM_MAX: f64 = 1.0;

/// Default posture transition speed (fraction of max speed).
pub const DEFAULT_POSTURE_SPEED: f64 = 0.7;

/// Posture used by `wake` and its speed.
pub const WAKE_POSTURE_SPEED: f64 = 0.75;

/// Posture speed used by `rest`.
pub const REST_POSTURE_SPEED: f64 = 0.5;

/// Default per-record limit on the wire [bytes].
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/teleop.toml";

/// Canonical service name.
pub const TELEOP_SERVICE_NAME: &str = "teleop";
