//! Locomotion behavior observed at the actuator while driving the service
//! over the wire.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use teleop_common::hal::actuator::ActuatorError;
use teleop_common::hal::types::{HeadAngles, Velocity};
use teleop_hal::SimulatedRobot;
use teleop_hal::drivers::simulation::{Fault, Op};

use super::harness::{Client, start, start_with, test_config};

fn nonzero(velocities: &[Velocity]) -> usize {
    velocities.iter().filter(|v| !v.is_zero()).count()
}

#[tokio::test(flavor = "multi_thread")]
async fn deadman_gates_actuator_velocity() {
    let running = start(test_config()).await;
    let mut client = Client::connect(&running).await;

    let reply = client
        .request("set_target", 1, json!({"vx_n": 0.8, "vw_n": -0.4}))
        .await;
    assert_eq!(reply["ok"], json!(true));
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Deadman off: the arbiter is integrating, the actuator sees only zeros.
    assert_eq!(nonzero(&running.robot.velocity_commands()), 0);
    let state = client.request("get_state", 2, json!({})).await;
    assert!(state["data"]["motion"]["current"]["vx_n"].as_f64().unwrap() > 0.0);

    client
        .request("set_deadman", 3, json!({"enabled": true}))
        .await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let velocities = running.robot.velocity_commands();
    let last = *velocities.last().unwrap();
    assert!(last.vx > 0.0 && last.vw < 0.0, "unexpected {last:?}");

    client
        .request("set_deadman", 4, json!({"enabled": false}))
        .await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    running.robot.clear_journal();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(nonzero(&running.robot.velocity_commands()), 0);

    running.service.request_shutdown();
    running.service.wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn duration_expires_into_zero() {
    let mut config = test_config();
    config.control.deadman_initial = true;
    let running = start(config).await;
    let mut client = Client::connect(&running).await;

    let reply = client
        .request("set_target", 1, json!({"vx_n": 1.0, "duration_s": 0.1}))
        .await;
    let deadline = reply["data"]["deadline_in_s"].as_f64().unwrap();
    assert!(deadline > 0.0 && deadline <= 0.1);

    // 1.5/s slew from at most ~0.2 reached before expiry: zero within ~1 s.
    tokio::time::sleep(Duration::from_millis(1200)).await;
    let state = client.request("get_state", 2, json!({})).await;
    let motion = &state["data"]["motion"];
    assert_eq!(motion["target"]["vx_n"], json!(0.0));
    assert_eq!(motion["current"]["vx_n"], json!(0.0));
    assert_eq!(motion["deadline_in_s"], json!(null));
    assert!(running.robot.velocity_commands().last().unwrap().is_zero());

    running.service.request_shutdown();
    running.service.wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn idle_timeout_zeroes_until_fresh_target() {
    let mut config = test_config();
    config.control.idle_zero_s = 0.2;
    let running = start(config).await;
    let mut client = Client::connect(&running).await;

    client.request("set_target", 1, json!({"vy_n": 0.5})).await;
    tokio::time::sleep(Duration::from_millis(400)).await;

    let state = client.request("get_state", 2, json!({})).await;
    assert_eq!(state["data"]["motion"]["target"]["vy_n"], json!(0.0));

    let reply = client.request("set_target", 3, json!({"vy_n": 0.5})).await;
    assert_eq!(reply["data"]["target"]["vy_n"], json!(0.5));
    tokio::time::sleep(Duration::from_millis(60)).await;
    let state = client.request("get_state", 4, json!({})).await;
    assert_eq!(state["data"]["motion"]["target"]["vy_n"], json!(0.5));

    running.service.request_shutdown();
    running.service.wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn head_follows_rate_and_center() {
    let running = start(test_config()).await;
    let mut client = Client::connect(&running).await;

    let reply = client
        .request("set_head", 1, json!({"yaw_n": 2.0, "pitch_n": "x"}))
        .await;
    assert_eq!(reply["data"], json!({"yaw_n": 1.0, "pitch_n": 0.0}));
    tokio::time::sleep(Duration::from_millis(300)).await;

    let state = client.request("get_state", 2, json!({})).await;
    let yaw = state["data"]["head"]["yaw"].as_f64().unwrap();
    assert!(yaw > 0.2 && yaw <= 2.0857, "yaw {yaw}");
    assert!(running.robot.snapshot().head_target.yaw > 0.0);

    client.request("set_head", 3, json!({})).await;
    client.request("center_head", 4, json!({})).await;
    let state = client.request("get_state", 5, json!({})).await;
    assert_eq!(state["data"]["head"]["yaw"], json!(0.0));
    assert!(state["data"]["loop"]["cycles"].as_u64().unwrap() > 0);

    running.service.request_shutdown();
    running.service.wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn head_target_seeded_from_actuator() {
    let robot = Arc::new(SimulatedRobot::awake());
    robot.place_head(HeadAngles {
        yaw: 1.0,
        pitch: 0.2,
    });
    let running = start_with(test_config(), robot).await;
    let mut client = Client::connect(&running).await;

    let state = client.request("get_state", 1, json!({})).await;
    let head = &state["data"]["head"];
    assert!((head["yaw"].as_f64().unwrap() - 1.0).abs() < 1e-9, "{head}");
    assert!((head["pitch"].as_f64().unwrap() - 0.2).abs() < 1e-9, "{head}");

    running.service.request_shutdown();
    running.service.wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn unreadable_head_seeds_at_zero() {
    let robot = Arc::new(SimulatedRobot::awake());
    robot.place_head(HeadAngles {
        yaw: 1.0,
        pitch: 0.2,
    });
    robot.inject(
        Op::GetJointAngles,
        Fault::error(ActuatorError::Communication("joint bus down".to_string())),
    );
    let running = start_with(test_config(), robot).await;
    let mut client = Client::connect(&running).await;

    let state = client.request("get_state", 1, json!({})).await;
    assert_eq!(state["data"]["head"]["yaw"], json!(0.0));
    assert_eq!(state["data"]["head"]["pitch"], json!(0.0));

    running.service.request_shutdown();
    running.service.wait().await.unwrap();
}
