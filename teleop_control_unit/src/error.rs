//! Startup and lifecycle errors.
//!
//! Everything here is fatal: `main` logs `FATAL: ...` and exits with status 1.
//! Errors inside the control loop or a session never reach this type.

use teleop_common::config::ConfigError;
use teleop_common::hal::actuator::ActuatorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TeleopError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("actuator: {0}")]
    Actuator(#[from] ActuatorError),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    /// A service task ended abnormally.
    #[error("task {task} failed: {reason}")]
    Task { task: &'static str, reason: String },
}
