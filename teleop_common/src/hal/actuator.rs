//! Actuator Interface trait and error types.
//!
//! This module defines:
//! - `Actuator` trait - Interface for pluggable robot backends
//! - `ActuatorError` enum - Error kinds returned by every actuator call
//! - `ActuatorFactory` type alias - Factory function type

use crate::control_unit::config::ActuatorConfig;
use crate::hal::posture::Posture;
use crate::hal::types::{Joint, JointGroup, Velocity};
use thiserror::Error;

/// Error kinds for actuator operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActuatorError {
    /// Backend could not be brought up.
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Link to the robot failed.
    #[error("Communication error: {0}")]
    Communication(String),

    /// The robot refused the request in its current state.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The call did not complete within its timebox.
    #[error("{op} timed out after {timeout_ms}ms")]
    Timeout {
        /// Operation name.
        op: &'static str,
        /// Timebox that expired.
        timeout_ms: u64,
    },

    /// Too many earlier calls are still outstanding.
    #[error("{op} skipped: {pending} calls still outstanding")]
    Busy {
        /// Operation name.
        op: &'static str,
        /// Calls in flight when this one was refused.
        pending: usize,
    },

    /// The backend panicked while serving the call.
    #[error("{0} aborted inside the backend")]
    Panicked(&'static str),

    /// No backend registered under the requested name.
    #[error("Actuator backend not found: {0}")]
    BackendNotFound(String),
}

/// Factory function type for creating backend instances.
pub type ActuatorFactory = fn(&ActuatorConfig) -> Result<Box<dyn Actuator>, ActuatorError>;

/// The Actuator Interface consumed by the control unit.
///
/// Calls are blocking and expected to be fast; the control unit runs them on
/// a blocking pool under a timebox, so implementations use interior
/// mutability and must be `Send + Sync`.
///
/// # Timing Contracts
///
/// | Operation | Expected | Caller |
/// |-----------|----------|--------|
/// | `set_velocity` | < 1 ms | control loop, every tick |
/// | `set_joint_angles` | < 1 ms | control loop, every tick |
/// | `set_stiffness` | < 10 ms | loop + requests |
/// | `goto_posture` | seconds (blocking) | requests only |
/// | `speak` | best-effort | startup/shutdown, requests |
pub trait Actuator: Send + Sync {
    /// Returns the backend's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Set stiffness of a joint group; `level` in [0, 1].
    fn set_stiffness(&self, group: JointGroup, level: f64) -> Result<(), ActuatorError>;

    /// Continuous normalized walk velocity. Zero stops walking.
    fn set_velocity(&self, velocity: Velocity) -> Result<(), ActuatorError>;

    /// Absolute joint angle targets [rad] at `speed_fraction` of max speed.
    fn set_joint_angles(
        &self,
        joints: &[Joint],
        angles: &[f64],
        speed_fraction: f64,
    ) -> Result<(), ActuatorError>;

    /// Current measured joint angles [rad], same order as `joints`.
    fn get_joint_angles(&self, joints: &[Joint]) -> Result<Vec<f64>, ActuatorError>;

    /// Blocking transition to a predefined posture.
    fn goto_posture(&self, posture: Posture, speed: f64) -> Result<(), ActuatorError>;

    /// Text-to-speech, best-effort.
    fn speak(&self, text: &str) -> Result<(), ActuatorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actuator_error_display() {
        let err = ActuatorError::InitFailed("no robot".to_string());
        assert!(err.to_string().contains("no robot"));

        let err = ActuatorError::Timeout {
            op: "set_velocity",
            timeout_ms: 150,
        };
        assert_eq!(err.to_string(), "set_velocity timed out after 150ms");

        let err = ActuatorError::Busy {
            op: "set_joint_angles",
            pending: 4,
        };
        assert!(err.to_string().contains("4 calls"));
    }

    #[test]
    fn test_actuator_error_not_found() {
        let err = ActuatorError::BackendNotFound("naoqi".to_string());
        assert!(err.to_string().contains("naoqi"));
    }
}
