//! Shared teleop state.
//!
//! One `TeleopState` is created at startup and injected (as `Arc`) into both
//! the request path and the control loop. Each component carries its own
//! lock; no lock is ever held across an `.await`.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde_json::{Value, json};
use teleop_common::control_unit::TeleopConfig;

use crate::control::arbiter::MotionTargetArbiter;
use crate::control::head::{HeadRateCommand, HeadTargetIntegrator};
use crate::safety::flags::{DeadmanFlag, ShutdownFlag};

/// State shared between connection tasks and the control loop.
#[derive(Debug)]
pub struct TeleopState {
    /// Velocity target and its limiters.
    pub motion: Mutex<MotionTargetArbiter>,
    /// Absolute head target.
    pub head: Mutex<HeadTargetIntegrator>,
    /// Latest head rate command.
    pub head_command: Mutex<HeadRateCommand>,
    pub deadman: DeadmanFlag,
    pub shutdown: ShutdownFlag,
    cycles: AtomicU64,
}

impl TeleopState {
    pub fn new(config: &TeleopConfig) -> Self {
        Self {
            motion: Mutex::new(MotionTargetArbiter::from_config(&config.control)),
            head: Mutex::new(HeadTargetIntegrator::new(config.head)),
            head_command: Mutex::new(HeadRateCommand::IDLE),
            deadman: DeadmanFlag::new(config.control.deadman_initial),
            shutdown: ShutdownFlag::new(),
            cycles: AtomicU64::new(0),
        }
    }

    /// Completed control loop ticks.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    pub(crate) fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// Full diagnostic view for `get_state`.
    pub fn to_json(&self) -> Value {
        let motion = self.motion.lock().snapshot();
        let head = self.head.lock().angles();
        let rate = *self.head_command.lock();
        json!({
            "motion": motion.to_json(),
            "deadman": self.deadman.is_enabled(),
            "head": {
                "yaw": head.yaw,
                "pitch": head.pitch,
                "yaw_n": rate.yaw_n,
                "pitch_n": rate.pitch_n,
            },
            "loop": { "cycles": self.cycles() },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_follows_config() {
        let mut config = TeleopConfig::default();
        config.control.deadman_initial = true;
        let state = TeleopState::new(&config);

        assert!(state.deadman.is_enabled());
        assert!(!state.shutdown.is_requested());
        assert_eq!(state.cycles(), 0);

        let value = state.to_json();
        assert_eq!(value["deadman"], json!(true));
        assert_eq!(value["head"]["yaw"], json!(0.0));
        assert_eq!(value["loop"]["cycles"], json!(0));
        assert_eq!(value["motion"]["deadline_in_s"], Value::Null);
    }

    #[test]
    fn cycle_counter_increments() {
        let state = TeleopState::new(&TeleopConfig::default());
        state.record_cycle();
        state.record_cycle();
        assert_eq!(state.cycles(), 2);
    }
}
