//! Shutdown sequencing: accept loop, open sessions, final stop, farewell.

use std::time::{Duration, Instant};

use serde_json::json;
use teleop_hal::drivers::simulation::Call;
use tokio::net::TcpStream;

use super::harness::{Client, start, test_config};

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_command_stops_everything_with_one_final_zero() {
    let mut config = test_config();
    config.control.deadman_initial = true;
    let running = start(config).await;
    let addr = running.service.local_addr();

    let mut driver = Client::connect(&running).await;
    let mut idle = Client::connect(&running).await;
    driver.request("set_target", 1, json!({"vx_n": 1.0})).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let reply = driver.request("shutdown", 2, json!({})).await;
    assert_eq!(reply["data"], json!({"shutting_down": true}));

    let started = Instant::now();
    let report = tokio::time::timeout(Duration::from_secs(3), running.service.wait())
        .await
        .expect("service did not stop")
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(report.abandoned_connections, 0);
    assert!(report.loop_stats.cycle_count > 0);

    // Both sessions were closed by the server.
    assert!(idle.recv().await.is_none());
    assert!(driver.recv().await.is_none());

    // Once motion started, exactly one zero velocity went out: the last one.
    let velocities = running.robot.velocity_commands();
    let first_moving = velocities
        .iter()
        .position(|v| !v.is_zero())
        .expect("robot never moved");
    let tail = &velocities[first_moving..];
    assert!(tail.last().unwrap().is_zero());
    assert_eq!(tail.iter().filter(|v| v.is_zero()).count(), 1);

    // Farewell after the final stop.
    let journal = running.robot.journal();
    assert_eq!(journal.last(), Some(&Call::Speak("Goodbye.".to_string())));
    assert_eq!(running.robot.spoken().first().map(String::as_str), Some("Interface ready."));

    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn local_request_shutdown_without_clients() {
    let running = start(test_config()).await;
    tokio::time::sleep(Duration::from_millis(60)).await;

    running.service.request_shutdown();
    let report = tokio::time::timeout(Duration::from_secs(2), running.service.wait())
        .await
        .expect("service did not stop")
        .unwrap();
    assert_eq!(report.abandoned_connections, 0);
    assert!(
        running
            .robot
            .velocity_commands()
            .last()
            .is_some_and(|v| v.is_zero())
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn silent_announcements_when_empty() {
    let mut config = test_config();
    config.actuator.greeting = String::new();
    config.actuator.farewell = String::new();
    let running = start(config).await;

    running.service.request_shutdown();
    running.service.wait().await.unwrap();
    assert!(running.robot.spoken().is_empty());
}
