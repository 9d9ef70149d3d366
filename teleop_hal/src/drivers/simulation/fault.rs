//! Fault injection for the simulated robot.

use std::time::Duration;

use teleop_common::hal::actuator::ActuatorError;

/// Actuator operations, as seen by fault injection and the call journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    SetStiffness,
    SetVelocity,
    SetJointAngles,
    GetJointAngles,
    GotoPosture,
    Speak,
}

impl Op {
    pub const fn name(self) -> &'static str {
        match self {
            Self::SetStiffness => "set_stiffness",
            Self::SetVelocity => "set_velocity",
            Self::SetJointAngles => "set_joint_angles",
            Self::GetJointAngles => "get_joint_angles",
            Self::GotoPosture => "goto_posture",
            Self::Speak => "speak",
        }
    }
}

/// What happens to calls of one operation.
///
/// Latency is served first (the call blocks), then the panic or error. A
/// fault marked `once` is removed after the first call that sees it.
#[derive(Debug, Clone, Default)]
pub struct Fault {
    pub latency: Duration,
    pub error: Option<ActuatorError>,
    pub panic: bool,
    pub once: bool,
}

impl Fault {
    /// Fail with `error`.
    pub fn error(error: ActuatorError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Block for `latency`, then behave normally.
    pub fn latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Panic inside the call.
    pub fn panic() -> Self {
        Self {
            panic: true,
            ..Self::default()
        }
    }

    /// Apply to the next call only.
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }
}
