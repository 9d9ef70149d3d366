//! Head rate integration.
//!
//! The operator commands normalized yaw/pitch *rates*; the integrator turns
//! them into absolute joint angles clamped to the mechanical range. No slew
//! limiting and no deadman gating apply here.

use serde::Serialize;
use teleop_common::control_unit::HeadConfig;
use teleop_common::hal::types::{HeadAngles, clip_norm};

/// Normalized head rate command, each axis in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HeadRateCommand {
    pub yaw_n: f64,
    pub pitch_n: f64,
}

impl HeadRateCommand {
    pub const IDLE: Self = Self {
        yaw_n: 0.0,
        pitch_n: 0.0,
    };

    pub fn clipped(yaw_n: f64, pitch_n: f64) -> Self {
        Self {
            yaw_n: clip_norm(yaw_n),
            pitch_n: clip_norm(pitch_n),
        }
    }
}

/// Absolute head target driven by rate commands.
#[derive(Debug, Clone)]
pub struct HeadTargetIntegrator {
    angles: HeadAngles,
    limits: HeadConfig,
}

impl HeadTargetIntegrator {
    /// Integrator at (0, 0), clamped into range.
    pub fn new(limits: HeadConfig) -> Self {
        Self::seeded(limits, HeadAngles::default())
    }

    /// Integrator starting from measured joint angles.
    pub fn seeded(limits: HeadConfig, angles: HeadAngles) -> Self {
        let mut integrator = Self {
            angles: HeadAngles::default(),
            limits,
        };
        integrator.seed(angles);
        integrator
    }

    /// Replace the absolute angles, e.g. with a fresh measurement.
    pub fn seed(&mut self, angles: HeadAngles) {
        self.angles = self.clamp(angles);
    }

    /// `angle += rate_n · max_rate · dt` per axis, then clamp.
    pub fn step(&mut self, command: HeadRateCommand, dt: f64) -> HeadAngles {
        if dt > 0.0 && dt.is_finite() {
            let command = HeadRateCommand::clipped(command.yaw_n, command.pitch_n);
            let next = HeadAngles {
                yaw: self.angles.yaw + command.yaw_n * self.limits.max_yaw_rate * dt,
                pitch: self.angles.pitch + command.pitch_n * self.limits.max_pitch_rate * dt,
            };
            self.angles = self.clamp(next);
        }
        self.angles
    }

    /// Jump to (0, 0) without integrating.
    pub fn center(&mut self) {
        self.angles = self.clamp(HeadAngles::default());
    }

    pub fn angles(&self) -> HeadAngles {
        self.angles
    }

    fn clamp(&self, angles: HeadAngles) -> HeadAngles {
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        HeadAngles {
            yaw: finite_or_zero(angles.yaw).clamp(self.limits.yaw_min, self.limits.yaw_max),
            pitch: finite_or_zero(angles.pitch)
                .clamp(self.limits.pitch_min, self.limits.pitch_max),
        }
    }
}
