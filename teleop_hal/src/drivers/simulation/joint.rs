//! Position-controlled joint with a speed limit.

use teleop_common::hal::types::Joint;

/// Hardware range of a joint [rad].
pub const fn joint_limits(joint: Joint) -> (f64, f64) {
    match joint {
        Joint::HeadYaw => (-2.0857, 2.0857),
        Joint::HeadPitch => (-0.6720, 0.5149),
    }
}

/// Joint speed at a speed fraction of 1.0 [rad/s].
pub const fn joint_max_speed(joint: Joint) -> f64 {
    match joint {
        Joint::HeadYaw => 8.26819,
        Joint::HeadPitch => 7.19407,
    }
}

/// A single joint moving toward its target at a commanded fraction of its
/// maximum speed.
#[derive(Debug, Clone)]
pub struct JointSimulator {
    joint: Joint,
    min: f64,
    max: f64,
    position: f64,
    target: f64,
    /// Current tracking speed [rad/s].
    speed: f64,
}

impl JointSimulator {
    /// Joint at rest at 0 rad.
    pub fn new(joint: Joint) -> Self {
        let (min, max) = joint_limits(joint);
        Self {
            joint,
            min,
            max,
            position: 0.0,
            target: 0.0,
            speed: 0.0,
        }
    }

    /// New target; clamped to the hardware range.
    pub fn command(&mut self, target: f64, speed_fraction: f64) {
        if target.is_finite() {
            self.target = target.clamp(self.min, self.max);
        }
        self.speed = speed_fraction.clamp(0.0, 1.0) * joint_max_speed(self.joint);
    }

    /// Move toward the target for `dt_s` seconds.
    pub fn update(&mut self, dt_s: f64) {
        if dt_s <= 0.0 {
            return;
        }
        let error = self.target - self.position;
        let step = self.speed * dt_s;
        if error.abs() <= step {
            self.position = self.target;
        } else {
            self.position += step.copysign(error);
        }
    }

    /// Jump straight to the target.
    pub fn settle(&mut self) {
        self.position = self.target;
    }

    pub fn joint(&self) -> Joint {
        self.joint
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn in_position(&self) -> bool {
        self.position == self.target
    }
}
