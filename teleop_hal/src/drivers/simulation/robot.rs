//! Simulated robot implementing the `Actuator` trait.
//!
//! Time advances lazily: every call integrates walk odometry and joint
//! motion over the wall-clock time elapsed since the previous call.

use std::collections::{HashMap, VecDeque};
use std::f64::consts::PI;
use std::thread;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;
use teleop_common::hal::actuator::{Actuator, ActuatorError};
use teleop_common::hal::posture::Posture;
use teleop_common::hal::types::{HeadAngles, Joint, JointGroup, Velocity};
use tracing::{debug, info};

use super::fault::{Fault, Op};
use super::joint::JointSimulator;

/// Oldest journal entries are dropped beyond this many.
pub const JOURNAL_CAPACITY: usize = 4096;

/// Spoken lines kept for inspection.
const SPOKEN_CAPACITY: usize = 256;

/// Walk speed at full normalized deflection.
const MAX_FORWARD_MPS: f64 = 0.1;
const MAX_LATERAL_MPS: f64 = 0.08;
const MAX_TURN_RADPS: f64 = 0.5;

/// One recorded actuator call, in the order received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetStiffness {
        group: JointGroup,
        level: f64,
    },
    SetVelocity(Velocity),
    SetJointAngles {
        joints: Vec<Joint>,
        angles: Vec<f64>,
        speed_fraction: f64,
    },
    GetJointAngles(Vec<Joint>),
    GotoPosture {
        posture: Posture,
        speed: f64,
    },
    Speak(String),
}

impl Call {
    pub fn op(&self) -> Op {
        match self {
            Self::SetStiffness { .. } => Op::SetStiffness,
            Self::SetVelocity(_) => Op::SetVelocity,
            Self::SetJointAngles { .. } => Op::SetJointAngles,
            Self::GetJointAngles(_) => Op::GetJointAngles,
            Self::GotoPosture { .. } => Op::GotoPosture,
            Self::Speak(_) => Op::Speak,
        }
    }
}

/// Dead-reckoned planar pose [m, m, rad].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

/// Observable robot state at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotSnapshot {
    pub body_stiffness: f64,
    pub head_stiffness: f64,
    pub velocity: Velocity,
    pub odometry: Pose,
    pub posture: Option<Posture>,
    pub head: HeadAngles,
    pub head_target: HeadAngles,
}

struct RobotState {
    body_stiffness: f64,
    head_stiffness: f64,
    velocity: Velocity,
    odometry: Pose,
    posture: Option<Posture>,
    yaw: JointSimulator,
    pitch: JointSimulator,
    spoken: VecDeque<String>,
    journal: VecDeque<Call>,
    faults: HashMap<Op, Fault>,
    last_update: Instant,
}

impl RobotState {
    fn new() -> Self {
        Self {
            body_stiffness: 0.0,
            head_stiffness: 0.0,
            velocity: Velocity::ZERO,
            odometry: Pose::default(),
            posture: None,
            yaw: JointSimulator::new(Joint::HeadYaw),
            pitch: JointSimulator::new(Joint::HeadPitch),
            spoken: VecDeque::new(),
            journal: VecDeque::new(),
            faults: HashMap::new(),
            last_update: Instant::now(),
        }
    }

    fn advance(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.last_update = now;
        self.integrate(dt);
    }

    fn integrate(&mut self, dt: f64) {
        self.yaw.update(dt);
        self.pitch.update(dt);

        if self.velocity.is_zero() {
            return;
        }
        let forward = self.velocity.vx * MAX_FORWARD_MPS;
        let lateral = self.velocity.vy * MAX_LATERAL_MPS;
        let (sin, cos) = self.odometry.theta.sin_cos();
        self.odometry.x += (forward * cos - lateral * sin) * dt;
        self.odometry.y += (forward * sin + lateral * cos) * dt;
        self.odometry.theta = wrap_angle(self.odometry.theta + self.velocity.vw * MAX_TURN_RADPS * dt);
    }

    fn joint_mut(&mut self, joint: Joint) -> &mut JointSimulator {
        match joint {
            Joint::HeadYaw => &mut self.yaw,
            Joint::HeadPitch => &mut self.pitch,
        }
    }

    fn joint(&self, joint: Joint) -> &JointSimulator {
        match joint {
            Joint::HeadYaw => &self.yaw,
            Joint::HeadPitch => &self.pitch,
        }
    }

    fn record(&mut self, call: Call) {
        if self.journal.len() == JOURNAL_CAPACITY {
            self.journal.pop_front();
        }
        self.journal.push_back(call);
    }

    fn take_fault(&mut self, op: Op) -> Option<Fault> {
        if self.faults.get(&op)?.once {
            self.faults.remove(&op)
        } else {
            self.faults.get(&op).cloned()
        }
    }
}

fn wrap_angle(theta: f64) -> f64 {
    let wrapped = (theta + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped == -PI { PI } else { wrapped }
}

/// Software robot for development and tests.
pub struct SimulatedRobot {
    state: Mutex<RobotState>,
}

impl SimulatedRobot {
    /// Robot powered on but unstiff, posture unknown.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RobotState::new()),
        }
    }

    /// Robot already stiff and standing.
    pub fn awake() -> Self {
        let robot = Self::new();
        {
            let mut st = robot.state.lock();
            st.body_stiffness = 1.0;
            st.head_stiffness = 1.0;
            st.posture = Some(Posture::StandInit);
        }
        robot
    }

    // ─── Fault injection ────────────────────────────────────────────

    /// Install a fault for every subsequent call of `op`.
    pub fn inject(&self, op: Op, fault: Fault) {
        self.state.lock().faults.insert(op, fault);
    }

    /// Remove the fault installed for `op`.
    pub fn clear(&self, op: Op) {
        self.state.lock().faults.remove(&op);
    }

    /// Remove every installed fault.
    pub fn clear_faults(&self) {
        self.state.lock().faults.clear();
    }

    // ─── Inspection ─────────────────────────────────────────────────

    /// Every recorded call, oldest first.
    pub fn journal(&self) -> Vec<Call> {
        self.state.lock().journal.iter().cloned().collect()
    }

    /// Recorded calls of one operation, oldest first.
    pub fn calls(&self, op: Op) -> Vec<Call> {
        self.state
            .lock()
            .journal
            .iter()
            .filter(|c| c.op() == op)
            .cloned()
            .collect()
    }

    /// Number of recorded calls of one operation.
    pub fn count(&self, op: Op) -> usize {
        self.state.lock().journal.iter().filter(|c| c.op() == op).count()
    }

    /// Every velocity passed to `set_velocity`, accepted or not.
    pub fn velocity_commands(&self) -> Vec<Velocity> {
        self.state
            .lock()
            .journal
            .iter()
            .filter_map(|c| match c {
                Call::SetVelocity(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn clear_journal(&self) {
        self.state.lock().journal.clear();
    }

    /// Lines spoken so far, oldest first.
    pub fn spoken(&self) -> Vec<String> {
        self.state.lock().spoken.iter().cloned().collect()
    }

    /// Current state, after advancing simulated time to now.
    pub fn snapshot(&self) -> RobotSnapshot {
        self.with_state(|st| RobotSnapshot {
            body_stiffness: st.body_stiffness,
            head_stiffness: st.head_stiffness,
            velocity: st.velocity,
            odometry: st.odometry,
            posture: st.posture,
            head: HeadAngles {
                yaw: st.yaw.position(),
                pitch: st.pitch.position(),
            },
            head_target: HeadAngles {
                yaw: st.yaw.target(),
                pitch: st.pitch.target(),
            },
        })
    }

    /// Put the head at `angles` immediately, as if it had been moved by hand.
    pub fn place_head(&self, angles: HeadAngles) {
        self.with_state(|st| {
            st.yaw.command(angles.yaw, 0.0);
            st.yaw.settle();
            st.pitch.command(angles.pitch, 0.0);
            st.pitch.settle();
        });
    }

    /// Let the head joints reach their targets.
    pub fn settle_head(&self) {
        self.with_state(|st| {
            st.yaw.settle();
            st.pitch.settle();
        });
    }

    // ─── Internals ──────────────────────────────────────────────────

    fn with_state<R>(&self, f: impl FnOnce(&mut RobotState) -> R) -> R {
        let mut st = self.state.lock();
        st.advance(Instant::now());
        f(&mut st)
    }

    /// Journal the call and serve any injected fault.
    fn enter(&self, call: Call) -> Result<(), ActuatorError> {
        let op = call.op();
        let fault = {
            let mut st = self.state.lock();
            st.record(call);
            st.take_fault(op)
        };
        let Some(fault) = fault else {
            return Ok(());
        };

        if !fault.latency.is_zero() {
            thread::sleep(fault.latency);
        }
        if fault.panic {
            panic!("simulated fault in {}", op.name());
        }
        match fault.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for SimulatedRobot {
    fn default() -> Self {
        Self::new()
    }
}

impl Actuator for SimulatedRobot {
    fn name(&self) -> &'static str {
        super::BACKEND_NAME
    }

    fn set_stiffness(&self, group: JointGroup, level: f64) -> Result<(), ActuatorError> {
        self.enter(Call::SetStiffness { group, level })?;
        if !level.is_finite() {
            return Err(ActuatorError::Rejected(format!(
                "stiffness level {level} is not a number"
            )));
        }
        let level = level.clamp(0.0, 1.0);
        self.with_state(|st| match group {
            JointGroup::Body => {
                st.body_stiffness = level;
                st.head_stiffness = level;
                if level == 0.0 {
                    st.velocity = Velocity::ZERO;
                }
            }
            JointGroup::Head => st.head_stiffness = level,
        });
        debug!("Stiffness {} -> {:.2}", group.name(), level);
        Ok(())
    }

    fn set_velocity(&self, velocity: Velocity) -> Result<(), ActuatorError> {
        self.enter(Call::SetVelocity(velocity))?;
        self.with_state(|st| {
            if !velocity.is_zero() && st.body_stiffness <= 0.0 {
                return Err(ActuatorError::Rejected(
                    "cannot walk while body stiffness is off".to_string(),
                ));
            }
            st.velocity = Velocity::clipped(velocity.vx, velocity.vy, velocity.vw);
            Ok(())
        })
    }

    fn set_joint_angles(
        &self,
        joints: &[Joint],
        angles: &[f64],
        speed_fraction: f64,
    ) -> Result<(), ActuatorError> {
        self.enter(Call::SetJointAngles {
            joints: joints.to_vec(),
            angles: angles.to_vec(),
            speed_fraction,
        })?;
        if joints.len() != angles.len() {
            return Err(ActuatorError::Rejected(format!(
                "{} joints but {} angles",
                joints.len(),
                angles.len()
            )));
        }
        self.with_state(|st| {
            for (joint, angle) in joints.iter().zip(angles) {
                st.joint_mut(*joint).command(*angle, speed_fraction);
            }
        });
        Ok(())
    }

    fn get_joint_angles(&self, joints: &[Joint]) -> Result<Vec<f64>, ActuatorError> {
        self.enter(Call::GetJointAngles(joints.to_vec()))?;
        Ok(self.with_state(|st| joints.iter().map(|j| st.joint(*j).position()).collect()))
    }

    fn goto_posture(&self, posture: Posture, speed: f64) -> Result<(), ActuatorError> {
        self.enter(Call::GotoPosture { posture, speed })?;
        self.with_state(|st| {
            st.velocity = Velocity::ZERO;
            if st.body_stiffness <= 0.0 {
                st.body_stiffness = 1.0;
                st.head_stiffness = 1.0;
            }
            st.yaw.command(0.0, 1.0);
            st.yaw.settle();
            st.pitch.command(0.0, 1.0);
            st.pitch.settle();
            st.posture = Some(posture);
        });
        info!("Posture -> {} (speed {:.2})", posture, speed);
        Ok(())
    }

    fn speak(&self, text: &str) -> Result<(), ActuatorError> {
        self.enter(Call::Speak(text.to_string()))?;
        self.with_state(|st| {
            if st.spoken.len() == SPOKEN_CAPACITY {
                st.spoken.pop_front();
            }
            st.spoken.push_back(text.to_string());
        });
        info!("Robot says: {text}");
        Ok(())
    }
}
