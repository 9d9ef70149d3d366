//! Simulation backend through the registry, as the control unit sees it.

use std::sync::Arc;
use std::thread;

use teleop_common::control_unit::ActuatorConfig;
use teleop_common::hal::actuator::{Actuator, ActuatorError};
use teleop_common::hal::posture::Posture;
use teleop_common::hal::types::{HEAD_JOINTS, JointGroup, Velocity};
use teleop_hal::ActuatorRegistry;
use teleop_hal::drivers::simulation::{Op, SimulatedRobot};

#[test]
fn wake_walk_rest_sequence() {
    let actuator = ActuatorRegistry::with_builtin()
        .create(&ActuatorConfig::default())
        .unwrap();

    actuator.set_stiffness(JointGroup::Body, 1.0).unwrap();
    actuator.goto_posture(Posture::StandInit, 0.75).unwrap();
    actuator.set_velocity(Velocity::clipped(0.3, 0.0, 0.1)).unwrap();
    actuator.set_velocity(Velocity::ZERO).unwrap();
    actuator.goto_posture(Posture::Crouch, 0.5).unwrap();
    actuator.set_stiffness(JointGroup::Body, 0.0).unwrap();

    assert!(matches!(
        actuator.set_velocity(Velocity::clipped(0.3, 0.0, 0.0)),
        Err(ActuatorError::Rejected(_))
    ));
}

#[test]
fn unknown_backend_is_reported() {
    let config = ActuatorConfig {
        driver: "naoqi".to_string(),
        ..ActuatorConfig::default()
    };
    match ActuatorRegistry::with_builtin().create(&config) {
        Err(ActuatorError::BackendNotFound(name)) => assert_eq!(name, "naoqi"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unexpected backend"),
    }
}

#[test]
fn concurrent_callers_share_one_robot() {
    let robot = Arc::new(SimulatedRobot::awake());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let robot = Arc::clone(&robot);
            thread::spawn(move || {
                for _ in 0..100 {
                    if i % 2 == 0 {
                        robot.set_velocity(Velocity::ZERO).unwrap();
                    } else {
                        robot.get_joint_angles(&HEAD_JOINTS).unwrap();
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(robot.count(Op::SetVelocity), 200);
    assert_eq!(robot.count(Op::GetJointAngles), 200);
}
