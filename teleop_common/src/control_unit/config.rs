//! Configuration structures for the teleop control unit.
//!
//! All config types use `serde::Deserialize` for TOML loading.
//! Every section and key is optional; missing values take the defaults below.
//! Numeric parameters have const `MIN`/`MAX` bounds checked by `validate()`.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    DEFAULT_HOST, DEFAULT_LOOP_HZ, DEFAULT_MAX_LINE_BYTES, DEFAULT_PORT, LOOP_HZ_MAX, LOOP_HZ_MIN,
};

/// Accept-loop poll bound [ms].
pub const ACCEPT_POLL_MS_MIN: u64 = 10;
pub const ACCEPT_POLL_MS_MAX: u64 = 5_000;

/// Connection drain period bounds [s].
pub const CONNECTION_GRACE_S_MAX: f64 = 30.0;

/// Per-record wire limit bounds [bytes].
pub const MAX_LINE_BYTES_MIN: usize = 256;
pub const MAX_LINE_BYTES_MAX: usize = 16 * 1024 * 1024;

/// Idle auto-zero timeout upper bound [s].
pub const IDLE_ZERO_S_MAX: f64 = 3_600.0;

/// Actuator call timebox bounds [ms].
pub const ACTUATOR_TIMEOUT_MS_MIN: u64 = 1;
pub const ACTUATOR_TIMEOUT_MS_MAX: u64 = 10_000;

/// Request-path actuator call timebox bounds [ms].
pub const COMMAND_TIMEOUT_MS_MIN: u64 = 100;
pub const COMMAND_TIMEOUT_MS_MAX: u64 = 120_000;

/// Outstanding actuator call bounds.
pub const MAX_PENDING_CALLS_MIN: usize = 1;
pub const MAX_PENDING_CALLS_MAX: usize = 64;

// ─── Top-Level Config ───────────────────────────────────────────────

/// Top-level teleop configuration.
///
/// Loaded from TOML at startup, immutable afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TeleopConfig {
    /// Service identity and log level.
    #[serde(default)]
    pub shared: SharedConfig,
    /// Session server endpoint.
    #[serde(default)]
    pub server: ServerConfig,
    /// Locomotion loop parameters.
    #[serde(default)]
    pub control: ControlConfig,
    /// Head joint limits and rates.
    #[serde(default)]
    pub head: HeadConfig,
    /// Actuator backend selection.
    #[serde(default)]
    pub actuator: ActuatorConfig,
}

impl TeleopConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.server.validate().map_err(ConfigError::ValidationError)?;
        self.control.validate().map_err(ConfigError::ValidationError)?;
        self.head.validate().map_err(ConfigError::ValidationError)?;
        self.actuator.validate().map_err(ConfigError::ValidationError)?;
        Ok(())
    }
}

// ─── Server ─────────────────────────────────────────────────────────

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port (0 = ephemeral).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on how long the accept loop takes to notice shutdown [ms].
    #[serde(default = "default_accept_poll_ms")]
    pub accept_poll_ms: u64,
    /// Drain period granted to connection tasks on shutdown [s].
    #[serde(default = "default_connection_grace_s")]
    pub connection_grace_s: f64,
    /// Longest accepted record [bytes].
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_accept_poll_ms() -> u64 {
    500
}
fn default_connection_grace_s() -> f64 {
    2.0
}
fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            accept_poll_ms: default_accept_poll_ms(),
            connection_grace_s: default_connection_grace_s(),
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

impl ServerConfig {
    /// Validate parameter bounds.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("server.host cannot be empty".to_string());
        }
        if !(ACCEPT_POLL_MS_MIN..=ACCEPT_POLL_MS_MAX).contains(&self.accept_poll_ms) {
            return Err(format!(
                "server.accept_poll_ms {} out of range [{}, {}]",
                self.accept_poll_ms, ACCEPT_POLL_MS_MIN, ACCEPT_POLL_MS_MAX
            ));
        }
        if !(0.0..=CONNECTION_GRACE_S_MAX).contains(&self.connection_grace_s) {
            return Err(format!(
                "server.connection_grace_s {} out of range [0, {}]",
                self.connection_grace_s, CONNECTION_GRACE_S_MAX
            ));
        }
        if !(MAX_LINE_BYTES_MIN..=MAX_LINE_BYTES_MAX).contains(&self.max_line_bytes) {
            return Err(format!(
                "server.max_line_bytes {} out of range [{}, {}]",
                self.max_line_bytes, MAX_LINE_BYTES_MIN, MAX_LINE_BYTES_MAX
            ));
        }
        Ok(())
    }

    /// `host:port` string for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ─── Control ────────────────────────────────────────────────────────

/// `[control]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlConfig {
    /// Nominal control loop frequency [Hz].
    #[serde(default = "default_loop_hz")]
    pub loop_hz: f64,
    /// Forward axis max acceleration [norm/s].
    #[serde(default = "default_max_acc_linear")]
    pub max_acc_vx: f64,
    /// Lateral axis max acceleration [norm/s].
    #[serde(default = "default_max_acc_linear")]
    pub max_acc_vy: f64,
    /// Turn axis max acceleration [norm/s].
    #[serde(default = "default_max_acc_vw")]
    pub max_acc_vw: f64,
    /// Target is forced to zero after this long without `set_target` [s]; 0 disables.
    #[serde(default = "default_idle_zero_s")]
    pub idle_zero_s: f64,
    /// Deadman state at startup.
    #[serde(default)]
    pub deadman_initial: bool,
    /// Timebox for a single actuator call [ms].
    #[serde(default = "default_actuator_timeout_ms")]
    pub actuator_timeout_ms: u64,
    /// Timebox for actuator calls made on behalf of requests (posture
    /// transitions block for seconds) [ms].
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
    /// Calls allowed in flight per link before new calls fail fast.
    #[serde(default = "default_max_pending_calls")]
    pub max_pending_calls: usize,
}

fn default_loop_hz() -> f64 {
    DEFAULT_LOOP_HZ
}
fn default_max_acc_linear() -> f64 {
    1.5
}
fn default_max_acc_vw() -> f64 {
    3.0
}
fn default_idle_zero_s() -> f64 {
    2.0
}
fn default_actuator_timeout_ms() -> u64 {
    150
}
fn default_command_timeout_ms() -> u64 {
    10_000
}
fn default_max_pending_calls() -> usize {
    4
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            loop_hz: default_loop_hz(),
            max_acc_vx: default_max_acc_linear(),
            max_acc_vy: default_max_acc_linear(),
            max_acc_vw: default_max_acc_vw(),
            idle_zero_s: default_idle_zero_s(),
            deadman_initial: false,
            actuator_timeout_ms: default_actuator_timeout_ms(),
            command_timeout_ms: default_command_timeout_ms(),
            max_pending_calls: default_max_pending_calls(),
        }
    }
}

impl ControlConfig {
    /// Validate parameter bounds.
    pub fn validate(&self) -> Result<(), String> {
        if !(LOOP_HZ_MIN..=LOOP_HZ_MAX).contains(&self.loop_hz) {
            return Err(format!(
                "control.loop_hz {} out of range [{}, {}]",
                self.loop_hz, LOOP_HZ_MIN, LOOP_HZ_MAX
            ));
        }
        for (name, value) in [
            ("max_acc_vx", self.max_acc_vx),
            ("max_acc_vy", self.max_acc_vy),
            ("max_acc_vw", self.max_acc_vw),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("control.{name} must be > 0, got {value}"));
            }
        }
        if !(0.0..=IDLE_ZERO_S_MAX).contains(&self.idle_zero_s) {
            return Err(format!(
                "control.idle_zero_s {} out of range [0, {}]",
                self.idle_zero_s, IDLE_ZERO_S_MAX
            ));
        }
        if !(ACTUATOR_TIMEOUT_MS_MIN..=ACTUATOR_TIMEOUT_MS_MAX).contains(&self.actuator_timeout_ms)
        {
            return Err(format!(
                "control.actuator_timeout_ms {} out of range [{}, {}]",
                self.actuator_timeout_ms, ACTUATOR_TIMEOUT_MS_MIN, ACTUATOR_TIMEOUT_MS_MAX
            ));
        }
        if !(COMMAND_TIMEOUT_MS_MIN..=COMMAND_TIMEOUT_MS_MAX).contains(&self.command_timeout_ms) {
            return Err(format!(
                "control.command_timeout_ms {} out of range [{}, {}]",
                self.command_timeout_ms, COMMAND_TIMEOUT_MS_MIN, COMMAND_TIMEOUT_MS_MAX
            ));
        }
        if !(MAX_PENDING_CALLS_MIN..=MAX_PENDING_CALLS_MAX).contains(&self.max_pending_calls) {
            return Err(format!(
                "control.max_pending_calls {} out of range [{}, {}]",
                self.max_pending_calls, MAX_PENDING_CALLS_MIN, MAX_PENDING_CALLS_MAX
            ));
        }
        Ok(())
    }

    /// Nominal loop period.
    pub fn period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.loop_hz)
    }

    /// Loop-side actuator call timebox.
    pub fn actuator_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.actuator_timeout_ms)
    }

    /// Request-side actuator call timebox.
    pub fn command_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.command_timeout_ms)
    }
}

// ─── Head ───────────────────────────────────────────────────────────

/// `[head]` section. Angles in radians, rates in rad/s.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeadConfig {
    #[serde(default = "default_yaw_min")]
    pub yaw_min: f64,
    #[serde(default = "default_yaw_max")]
    pub yaw_max: f64,
    #[serde(default = "default_pitch_min")]
    pub pitch_min: f64,
    #[serde(default = "default_pitch_max")]
    pub pitch_max: f64,
    /// Yaw rate at full deflection.
    #[serde(default = "default_max_yaw_rate")]
    pub max_yaw_rate: f64,
    /// Pitch rate at full deflection.
    #[serde(default = "default_max_pitch_rate")]
    pub max_pitch_rate: f64,
    /// Fraction of max joint speed for angle commands, clipped to [0, 1].
    #[serde(default = "default_fraction_speed")]
    pub fraction_speed: f64,
}

fn default_yaw_min() -> f64 {
    -2.0857
}
fn default_yaw_max() -> f64 {
    2.0857
}
fn default_pitch_min() -> f64 {
    -0.6720
}
fn default_pitch_max() -> f64 {
    0.5149
}
fn default_max_yaw_rate() -> f64 {
    1.5
}
fn default_max_pitch_rate() -> f64 {
    1.0
}
fn default_fraction_speed() -> f64 {
    0.3
}

impl Default for HeadConfig {
    fn default() -> Self {
        Self {
            yaw_min: default_yaw_min(),
            yaw_max: default_yaw_max(),
            pitch_min: default_pitch_min(),
            pitch_max: default_pitch_max(),
            max_yaw_rate: default_max_yaw_rate(),
            max_pitch_rate: default_max_pitch_rate(),
            fraction_speed: default_fraction_speed(),
        }
    }
}

impl HeadConfig {
    /// Validate limits and rates.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.yaw_min < self.yaw_max) {
            return Err(format!(
                "head.yaw_min {} must be below head.yaw_max {}",
                self.yaw_min, self.yaw_max
            ));
        }
        if !(self.pitch_min < self.pitch_max) {
            return Err(format!(
                "head.pitch_min {} must be below head.pitch_max {}",
                self.pitch_min, self.pitch_max
            ));
        }
        for (name, value) in [
            ("max_yaw_rate", self.max_yaw_rate),
            ("max_pitch_rate", self.max_pitch_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("head.{name} must be >= 0, got {value}"));
            }
        }
        if !self.fraction_speed.is_finite() {
            return Err("head.fraction_speed must be finite".to_string());
        }
        Ok(())
    }

    /// Angle command speed, clipped to [0, 1].
    pub fn clipped_fraction_speed(&self) -> f64 {
        self.fraction_speed.clamp(0.0, 1.0)
    }
}

// ─── Actuator ───────────────────────────────────────────────────────

/// `[actuator]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActuatorConfig {
    /// Registered backend name.
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Robot endpoint host for networked backends.
    #[serde(default = "default_robot_host")]
    pub robot_host: String,
    /// Robot endpoint port for networked backends.
    #[serde(default = "default_robot_port")]
    pub robot_port: u16,
    /// Spoken after startup; empty disables.
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Spoken at shutdown; empty disables.
    #[serde(default = "default_farewell")]
    pub farewell: String,
}

fn default_driver() -> String {
    "simulation".to_string()
}
fn default_robot_host() -> String {
    "127.0.0.1".to_string()
}
fn default_robot_port() -> u16 {
    9559
}
fn default_greeting() -> String {
    "Interface ready.".to_string()
}
fn default_farewell() -> String {
    "Goodbye.".to_string()
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            robot_host: default_robot_host(),
            robot_port: default_robot_port(),
            greeting: default_greeting(),
            farewell: default_farewell(),
        }
    }
}

impl ActuatorConfig {
    /// Validate backend selection.
    pub fn validate(&self) -> Result<(), String> {
        if self.driver.trim().is_empty() {
            return Err("actuator.driver cannot be empty".to_string());
        }
        Ok(())
    }
}
