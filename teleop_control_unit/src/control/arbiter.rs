//! Motion target arbitration.
//!
//! Request handlers write a target velocity (last write wins); the control
//! loop steps it once per tick through three slew limiters. A target can
//! carry a deadline, and an idle timeout forces it to zero when requests
//! stop arriving.
//!
//! Time is passed in explicitly (`*_at` methods) so the loop, the request
//! path and tests share one notion of "now".

use std::time::{Duration, Instant};

use serde_json::{Value, json};
use teleop_common::control_unit::ControlConfig;
use teleop_common::hal::types::Velocity;

use super::slew::SlewLimiter;

/// Diagnostic view of the arbiter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSnapshot {
    /// Target after clipping and any forced zeroing.
    pub target: Velocity,
    /// Smoothed output of the last step.
    pub current: Velocity,
    /// Seconds until the deadline, if one is set.
    pub deadline_in_s: Option<f64>,
    /// Seconds since the last `set_target`, if there was one.
    pub last_update_age_s: Option<f64>,
}

impl MotionSnapshot {
    /// Reply payload form.
    pub fn to_json(&self) -> Value {
        json!({
            "target": velocity_json(self.target),
            "current": velocity_json(self.current),
            "deadline_in_s": self.deadline_in_s,
            "last_update_age_s": self.last_update_age_s,
        })
    }
}

fn velocity_json(v: Velocity) -> Value {
    json!({ "vx_n": v.vx, "vy_n": v.vy, "vw_n": v.vw })
}

/// Holds the operator's velocity intent and smooths it.
#[derive(Debug, Clone)]
pub struct MotionTargetArbiter {
    target: Velocity,
    deadline: Option<Instant>,
    last_update: Option<Instant>,
    /// `None` disables idle auto-zero.
    idle_timeout: Option<Duration>,
    vx: SlewLimiter,
    vy: SlewLimiter,
    vw: SlewLimiter,
}

impl MotionTargetArbiter {
    /// Arbiter with per-axis max accelerations [norm/s] and an idle timeout
    /// [s]; `idle_zero_s <= 0` disables the timeout.
    pub fn new(max_acc: [f64; 3], idle_zero_s: f64) -> Self {
        let idle_timeout = if idle_zero_s > 0.0 {
            Duration::try_from_secs_f64(idle_zero_s).ok()
        } else {
            None
        };
        Self {
            target: Velocity::ZERO,
            deadline: None,
            last_update: None,
            idle_timeout,
            vx: SlewLimiter::new(max_acc[0]),
            vy: SlewLimiter::new(max_acc[1]),
            vw: SlewLimiter::new(max_acc[2]),
        }
    }

    pub fn from_config(control: &ControlConfig) -> Self {
        Self::new(
            [control.max_acc_vx, control.max_acc_vy, control.max_acc_vw],
            control.idle_zero_s,
        )
    }

    /// Record a new target. A positive `duration_s` sets a deadline
    /// relative to `now`; anything else clears it.
    pub fn set_target_at(
        &mut self,
        now: Instant,
        vx: f64,
        vy: f64,
        vw: f64,
        duration_s: Option<f64>,
    ) {
        self.target = Velocity::clipped(vx, vy, vw);
        self.last_update = Some(now);
        self.deadline = duration_s
            .filter(|d| *d > 0.0)
            .and_then(|d| Duration::try_from_secs_f64(d).ok())
            .and_then(|d| now.checked_add(d));
    }

    pub fn set_target(&mut self, vx: f64, vy: f64, vw: f64, duration_s: Option<f64>) {
        self.set_target_at(Instant::now(), vx, vy, vw, duration_s);
    }

    /// Zero the target immediately; the limiters ramp down.
    pub fn stop_at(&mut self, now: Instant) {
        self.set_target_at(now, 0.0, 0.0, 0.0, None);
    }

    /// Apply deadline and idle rules, then advance the limiters by `dt`.
    ///
    /// The idle rule re-applies on every step while idle.
    pub fn step_at(&mut self, now: Instant, dt: f64) -> Velocity {
        if self.deadline.is_some_and(|deadline| now >= deadline) {
            self.target = Velocity::ZERO;
            self.deadline = None;
        }
        if let (Some(timeout), Some(last)) = (self.idle_timeout, self.last_update) {
            if now.saturating_duration_since(last) > timeout {
                self.target = Velocity::ZERO;
            }
        }

        Velocity {
            vx: self.vx.step(self.target.vx, dt),
            vy: self.vy.step(self.target.vy, dt),
            vw: self.vw.step(self.target.vw, dt),
        }
    }

    pub fn step(&mut self, dt: f64) -> Velocity {
        self.step_at(Instant::now(), dt)
    }

    pub fn target(&self) -> Velocity {
        self.target
    }

    /// Smoothed output of the last step.
    pub fn current(&self) -> Velocity {
        Velocity {
            vx: self.vx.current(),
            vy: self.vy.current(),
            vw: self.vw.current(),
        }
    }

    pub fn snapshot_at(&self, now: Instant) -> MotionSnapshot {
        MotionSnapshot {
            target: self.target,
            current: self.current(),
            deadline_in_s: self
                .deadline
                .map(|d| d.saturating_duration_since(now).as_secs_f64()),
            last_update_age_s: self
                .last_update
                .map(|t| now.saturating_duration_since(t).as_secs_f64()),
        }
    }

    pub fn snapshot(&self) -> MotionSnapshot {
        self.snapshot_at(Instant::now())
    }
}
