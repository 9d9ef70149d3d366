//! Value types crossing the Actuator Interface.

use serde::{Deserialize, Serialize};

use crate::consts::{NORM_MAX, NORM_MIN};

/// Clip a value into the normalized range [-1, 1].
///
/// NaN collapses to 0.0 so a bad input can never command motion.
#[inline]
pub fn clip_norm(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(NORM_MIN, NORM_MAX)
    }
}

/// Normalized planar velocity command (forward, lateral, turn).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    #[serde(rename = "vx_n")]
    pub vx: f64,
    #[serde(rename = "vy_n")]
    pub vy: f64,
    #[serde(rename = "vw_n")]
    pub vw: f64,
}

impl Velocity {
    /// All axes at rest.
    pub const ZERO: Self = Self {
        vx: 0.0,
        vy: 0.0,
        vw: 0.0,
    };

    /// Create a velocity with every axis clipped to [-1, 1].
    pub fn clipped(vx: f64, vy: f64, vw: f64) -> Self {
        Self {
            vx: clip_norm(vx),
            vy: clip_norm(vy),
            vw: clip_norm(vw),
        }
    }

    /// True when every axis is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.vx == 0.0 && self.vy == 0.0 && self.vw == 0.0
    }
}

/// Individually addressable joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Joint {
    HeadYaw,
    HeadPitch,
}

impl Joint {
    /// Joint name as understood by the robot.
    pub const fn name(self) -> &'static str {
        match self {
            Self::HeadYaw => "HeadYaw",
            Self::HeadPitch => "HeadPitch",
        }
    }
}

/// The head joints in (yaw, pitch) order.
pub const HEAD_JOINTS: [Joint; 2] = [Joint::HeadYaw, Joint::HeadPitch];

/// Groups of joints addressed together for stiffness control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointGroup {
    /// Every joint of the robot.
    Body,
    /// HeadYaw + HeadPitch.
    Head,
}

impl JointGroup {
    /// Group name as understood by the robot.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Body => "Body",
            Self::Head => "Head",
        }
    }

    /// Whether `joint` belongs to this group.
    pub fn contains(self, joint: Joint) -> bool {
        match self {
            Self::Body => true,
            Self::Head => HEAD_JOINTS.contains(&joint),
        }
    }
}

/// Absolute head joint angles [rad].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadAngles {
    pub yaw: f64,
    pub pitch: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_norm_bounds_and_nan() {
        assert_eq!(clip_norm(2.5), 1.0);
        assert_eq!(clip_norm(-7.0), -1.0);
        assert_eq!(clip_norm(0.25), 0.25);
        assert_eq!(clip_norm(f64::NAN), 0.0);
    }

    #[test]
    fn velocity_clipped_per_axis() {
        let v = Velocity::clipped(1.2, -0.5, -3.0);
        assert_eq!(v, Velocity { vx: 1.0, vy: -0.5, vw: -1.0 });
        assert!(!v.is_zero());
        assert!(Velocity::ZERO.is_zero());
    }

    #[test]
    fn velocity_serializes_with_wire_names() {
        let json = serde_json::to_value(Velocity::clipped(0.5, 0.0, -0.25)).unwrap();
        assert_eq!(json["vx_n"], 0.5);
        assert_eq!(json["vw_n"], -0.25);
    }

    #[test]
    fn head_group_membership() {
        assert!(JointGroup::Head.contains(Joint::HeadPitch));
        assert!(JointGroup::Body.contains(Joint::HeadYaw));
        assert_eq!(JointGroup::Body.name(), "Body");
    }
}
