//! Prelude module for common re-exports.
//!
//! Consumers can do `use teleop_common::prelude::*;` and get the most
//! important types without listing individual paths.

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};
pub use crate::control_unit::{
    ActuatorConfig, ControlConfig, HeadConfig, ServerConfig, TeleopConfig,
};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEFAULT_LOOP_HZ, DEFAULT_PORT, MAX_TICK_DT_S};

// ─── Actuator Interface ─────────────────────────────────────────────
pub use crate::hal::actuator::{Actuator, ActuatorError, ActuatorFactory};
pub use crate::hal::posture::Posture;
pub use crate::hal::types::{
    HEAD_JOINTS, HeadAngles, Joint, JointGroup, Velocity, clip_norm,
};

// ─── Wire Protocol ──────────────────────────────────────────────────
pub use crate::protocol::{ProtocolError, Reply, Request, encode_line};
