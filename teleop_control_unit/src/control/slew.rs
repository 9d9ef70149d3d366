//! Per-axis bounded-rate follower.
//!
//! The output moves toward the target by at most `max_acceleration · dt` per
//! step and always stays in the normalized range [-1, 1].

use teleop_common::hal::types::clip_norm;

/// Slew-rate limiter for one normalized axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlewLimiter {
    current: f64,
    max_acceleration: f64,
}

impl SlewLimiter {
    /// Limiter at rest with the given max acceleration [norm/s].
    pub fn new(max_acceleration: f64) -> Self {
        Self::with_current(max_acceleration, 0.0)
    }

    /// Limiter starting from `current`.
    pub fn with_current(max_acceleration: f64, current: f64) -> Self {
        Self {
            current: clip_norm(current),
            max_acceleration: max_acceleration.abs(),
        }
    }

    /// Advance one step toward `target` over `dt` seconds.
    ///
    /// `dt <= 0` (or NaN) leaves the output unchanged.
    #[inline]
    pub fn step(&mut self, target: f64, dt: f64) -> f64 {
        if !(dt > 0.0) {
            return self.current;
        }
        let max_delta = self.max_acceleration * dt;
        let delta = (clip_norm(target) - self.current).clamp(-max_delta, max_delta);
        self.current = clip_norm(self.current + delta);
        self.current
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn max_acceleration(&self) -> f64 {
        self.max_acceleration
    }
}
