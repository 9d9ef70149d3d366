//! Fixed-rate control loop.
//!
//! ```text
//!            ┌──────────┐ shutdown ┌──────────┐ final zero ┌─────────┐
//!  start ──► │ Running  │ ───────► │ Draining │ ─────────► │ Stopped │
//!            └──────────┘          └──────────┘            └─────────┘
//! ```
//!
//! Each Running tick:
//! 1. `dt` from the wall clock since the previous tick start; the nominal
//!    period substitutes when the measurement is non-positive, above
//!    `MAX_TICK_DT_S`, or missing (first tick).
//! 2. Locomotion: step the arbiter; send its output if the deadman is set,
//!    zero otherwise. The arbiter keeps integrating either way.
//! 3. Head: integrate the current rate command, keep the head stiff, send
//!    the absolute angles.
//! 4. Sleep for the remainder of the period (woken early by shutdown).
//!
//! Actuator faults inside a tick are logged and dropped; nothing in a tick
//! can end the loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use teleop_common::consts::MAX_TICK_DT_S;
use teleop_common::control_unit::TeleopConfig;
use teleop_common::hal::actuator::ActuatorError;
use teleop_common::hal::types::{HEAD_JOINTS, HeadAngles, JointGroup, Velocity};
use tracing::{debug, info, warn};

use crate::link::ActuatorLink;
use crate::state::TeleopState;

/// Loop lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Draining,
    Stopped,
}

/// Tick length to integrate with.
///
/// `measured` is `None` on the first tick.
pub fn effective_dt(measured: Option<Duration>, nominal_s: f64) -> f64 {
    match measured.map(|d| d.as_secs_f64()) {
        Some(dt) if dt > 0.0 && dt <= MAX_TICK_DT_S => dt,
        _ => nominal_s,
    }
}

/// Everything one tick decided, before any actuator call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickPlan {
    pub dt: f64,
    /// Arbiter output.
    pub smoothed: Velocity,
    /// What goes to the actuator after the deadman gate.
    pub velocity: Velocity,
    pub head: HeadAngles,
}

/// Compute one tick from shared state. Each lock is held only for its step.
pub fn plan_tick(state: &TeleopState, now: Instant, dt: f64) -> TickPlan {
    let smoothed = state.motion.lock().step_at(now, dt);
    let velocity = if state.deadman.is_enabled() {
        smoothed
    } else {
        Velocity::ZERO
    };

    let rate = *state.head_command.lock();
    let head = state.head.lock().step(rate, dt);

    TickPlan {
        dt,
        smoothed,
        velocity,
        head,
    }
}

/// Rate-limited reporting for faults swallowed inside the loop.
///
/// WARN for the first 10 and every 1000th, DEBUG otherwise.
#[derive(Debug, Default)]
pub struct FaultLog {
    count: u64,
}

impl FaultLog {
    pub fn record(&mut self, phase: &'static str, error: &ActuatorError) {
        self.count += 1;
        if self.count <= 10 || self.count % 1000 == 0 {
            warn!("Actuator fault #{} in {phase} phase (ignored): {error}", self.count);
        } else {
            debug!("Actuator fault #{} in {phase} phase (ignored): {error}", self.count);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Loop timing statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub cycle_count: u64,
    /// Ticks whose body ran longer than the period.
    pub overruns: u64,
    pub max_tick_us: u64,
    pub total_tick_us: u64,
    /// Faults swallowed in locomotion or head phases.
    pub actuator_faults: u64,
}

impl LoopStats {
    pub fn avg_tick_us(&self) -> u64 {
        self.total_tick_us.checked_div(self.cycle_count).unwrap_or(0)
    }
}

/// The control loop task.
pub struct ControlLoop {
    state: Arc<TeleopState>,
    link: ActuatorLink,
    period: Duration,
    head_speed: f64,
    loop_state: LoopState,
    stats: LoopStats,
    faults: FaultLog,
}

impl ControlLoop {
    pub fn new(state: Arc<TeleopState>, link: ActuatorLink, config: &TeleopConfig) -> Self {
        Self {
            state,
            link,
            period: config.control.period(),
            head_speed: config.head.clipped_fraction_speed(),
            loop_state: LoopState::Running,
            stats: LoopStats::default(),
            faults: FaultLog::default(),
        }
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// One Running tick: plan, then locomotion and head actuator calls.
    pub async fn tick(&mut self, now: Instant, dt: f64) -> TickPlan {
        let plan = plan_tick(&self.state, now, dt);

        if let Err(e) = self.link.set_velocity(plan.velocity).await {
            self.faults.record("locomotion", &e);
        }

        if let Err(e) = self.link.set_stiffness(JointGroup::Head, 1.0).await {
            self.faults.record("head", &e);
        }
        if let Err(e) = self
            .link
            .set_joint_angles(&HEAD_JOINTS, vec![plan.head.yaw, plan.head.pitch], self.head_speed)
            .await
        {
            self.faults.record("head", &e);
        }

        self.state.record_cycle();
        plan
    }

    /// Run until shutdown, then drain. Returns the final statistics.
    pub async fn run(mut self) -> LoopStats {
        info!(
            "Control loop starting (period={}ms, backend={})",
            self.period.as_millis(),
            self.link.backend_name()
        );

        let nominal = self.period.as_secs_f64();
        let period_us = self.period.as_micros() as u64;
        let mut last_tick: Option<Instant> = None;

        while !self.state.shutdown.is_requested() {
            let tick_start = Instant::now();
            let dt = effective_dt(
                last_tick.map(|t| tick_start.saturating_duration_since(t)),
                nominal,
            );
            last_tick = Some(tick_start);

            self.tick(tick_start, dt).await;

            let tick_us = tick_start.elapsed().as_micros() as u64;
            self.stats.cycle_count += 1;
            self.stats.total_tick_us += tick_us;
            self.stats.max_tick_us = self.stats.max_tick_us.max(tick_us);
            self.stats.actuator_faults = self.faults.count();

            if tick_us > period_us {
                self.stats.overruns += 1;
                if self.stats.overruns <= 10 || self.stats.overruns % 1000 == 0 {
                    warn!(
                        "Timing overrun #{}: tick took {}us (period {}us)",
                        self.stats.overruns, tick_us, period_us
                    );
                }
            }

            if self.stats.cycle_count % 1000 == 0 {
                debug!(
                    "Control loop: {} cycles, avg={}us, max={}us, overruns={}, faults={}",
                    self.stats.cycle_count,
                    self.stats.avg_tick_us(),
                    self.stats.max_tick_us,
                    self.stats.overruns,
                    self.stats.actuator_faults
                );
            }

            let elapsed = tick_start.elapsed();
            if elapsed < self.period {
                tokio::select! {
                    _ = tokio::time::sleep(self.period - elapsed) => {}
                    _ = self.state.shutdown.wait() => {}
                }
            }
        }

        self.drain().await;
        self.stats
    }

    /// Draining: exactly one best-effort zero velocity, then Stopped.
    async fn drain(&mut self) {
        self.loop_state = LoopState::Draining;
        info!("Control loop draining: sending final stop");
        if let Err(e) = self.link.set_velocity(Velocity::ZERO).await {
            warn!("Final stop command failed: {e}");
        }
        self.loop_state = LoopState::Stopped;
        info!(
            "Control loop stopped after {} cycles (overruns: {}, actuator faults: {})",
            self.stats.cycle_count, self.stats.overruns, self.stats.actuator_faults
        );
    }
}
