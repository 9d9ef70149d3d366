//! Simulation backend.
//!
//! A software robot for development and testing without hardware. It keeps
//! enough state to be observable from tests: stiffness, walk velocity and
//! odometry, head joints tracking their targets, posture, spoken lines, and
//! a bounded journal of every call. Faults and latency can be injected per
//! operation.

mod fault;
mod joint;
mod robot;

pub use fault::{Fault, Op};
pub use joint::{JointSimulator, joint_limits, joint_max_speed};
pub use robot::{Call, JOURNAL_CAPACITY, Pose, RobotSnapshot, SimulatedRobot};

use teleop_common::control_unit::ActuatorConfig;
use teleop_common::hal::actuator::{Actuator, ActuatorError};
use tracing::info;

/// Registry name of this backend.
pub const BACKEND_NAME: &str = "simulation";

/// Factory for the registry.
pub fn create_actuator(config: &ActuatorConfig) -> Result<Box<dyn Actuator>, ActuatorError> {
    info!(
        "Simulation backend selected (robot endpoint {}:{} ignored)",
        config.robot_host, config.robot_port
    );
    Ok(Box::new(SimulatedRobot::new()))
}
