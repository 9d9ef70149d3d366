//! Control unit shared types.
//!
//! Configuration sections consumed by the control unit binary and its tests.

pub mod config;

pub use config::{ActuatorConfig, ControlConfig, HeadConfig, ServerConfig, TeleopConfig};
