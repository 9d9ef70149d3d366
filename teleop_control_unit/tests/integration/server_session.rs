//! Wire-level session behavior: framing, ordering, error replies.

use serde_json::json;
use teleop_common::hal::posture::Posture;
use teleop_hal::drivers::simulation::{Call, Op};

use super::harness::{Client, start, test_config};

#[tokio::test(flavor = "multi_thread")]
async fn pipelined_requests_reply_in_order() {
    let running = start(test_config()).await;
    let mut client = Client::connect(&running).await;

    client
        .send_raw(
            b"{\"cmd\":\"set_target\",\"rid\":\"a\",\"args\":{\"vx_n\":0.3}}\n\
              {\"cmd\":\"ping\",\"rid\":\"b\"}\n",
        )
        .await;

    let first = client.recv().await.unwrap();
    let second = client.recv().await.unwrap();
    assert_eq!(first["rid"], json!("a"));
    assert_eq!(first["ok"], json!(true));
    assert_eq!(first["data"]["target"]["vx_n"], json!(0.3));
    assert_eq!(second["rid"], json!("b"));
    assert!(second["data"]["pong"].as_f64().unwrap() > 1.0e9);

    running.service.request_shutdown();
    running.service.wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn bad_records_get_errors_and_session_survives() {
    let running = start(test_config()).await;
    let mut client = Client::connect(&running).await;

    client.send_raw(b"{not json\n").await;
    let reply = client.recv().await.unwrap();
    assert_eq!(reply["ok"], json!(false));
    assert_eq!(reply["rid"], json!(null));
    assert!(reply["error"].as_str().unwrap().starts_with("invalid request"));

    // Blank lines produce nothing; the next reply belongs to rid 7.
    client.send_raw(b"\n   \n").await;
    let reply = client.request("dance", 7, json!({})).await;
    assert_eq!(reply["ok"], json!(false));
    assert_eq!(reply["error"], json!("unknown cmd: dance"));

    let reply = client
        .request("set_target", 8, json!({"vx_n": "fast"}))
        .await;
    assert_eq!(reply["ok"], json!(false));
    assert!(reply["error"].as_str().unwrap().contains("vx_n"));

    let reply = client.request("ping", 9, json!({})).await;
    assert_eq!(reply["ok"], json!(true));

    running.service.request_shutdown();
    running.service.wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_posture_never_reaches_actuator() {
    let running = start(test_config()).await;
    let mut client = Client::connect(&running).await;

    let reply = client
        .request("posture", 1, json!({"name": "moonwalk"}))
        .await;
    assert_eq!(reply["ok"], json!(false));
    assert!(reply["error"].as_str().unwrap().contains("StandInit"));
    assert_eq!(running.robot.count(Op::GotoPosture), 0);

    let reply = client
        .request("posture", 2, json!({"name": " sit relax ", "speed": 0.4}))
        .await;
    assert_eq!(reply["data"], json!({"name": "SitRelax", "speed": 0.4}));
    assert_eq!(
        running.robot.calls(Op::GotoPosture),
        vec![Call::GotoPosture {
            posture: Posture::SitRelax,
            speed: 0.4
        }]
    );

    running.service.request_shutdown();
    running.service.wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn trailing_record_without_newline_is_served() {
    let running = start(test_config()).await;
    let mut client = Client::connect(&running).await;

    client
        .send_raw(b"{\"cmd\":\"ping\",\"rid\":1}\n{\"cmd\":\"ping\",\"rid\":2}")
        .await;
    client.close_write().await;

    assert_eq!(client.recv().await.unwrap()["rid"], json!(1));
    assert_eq!(client.recv().await.unwrap()["rid"], json!(2));
    assert!(client.recv().await.is_none());

    running.service.request_shutdown();
    running.service.wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_record_is_rejected_and_session_continues() {
    let mut config = test_config();
    config.server.max_line_bytes = 256;
    let running = start(config).await;
    let mut client = Client::connect(&running).await;

    let mut line = vec![b'x'; 300];
    line.push(b'\n');
    client.send_raw(&line).await;

    let reply = client.recv().await.unwrap();
    assert_eq!(reply["ok"], json!(false));
    assert_eq!(reply["rid"], json!(null));
    assert!(reply["error"].as_str().unwrap().contains("256"));
    assert_eq!(client.request("ping", 2, json!({})).await["ok"], json!(true));

    // Several limits' worth in one record, followed by a request in the same write.
    let mut burst = vec![b'y'; 4096];
    burst.extend_from_slice(b"\n{\"cmd\":\"ping\",\"rid\":3}\n");
    client.send_raw(&burst).await;
    assert_eq!(client.recv().await.unwrap()["ok"], json!(false));
    let pong = client.recv().await.unwrap();
    assert_eq!(pong["rid"], json!(3));
    assert_eq!(pong["ok"], json!(true));

    running.service.request_shutdown();
    running.service.wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn sessions_share_state() {
    let running = start(test_config()).await;
    let mut a = Client::connect(&running).await;
    let mut b = Client::connect(&running).await;

    a.request("set_deadman", 1, json!({"enabled": "yes"})).await;
    let state = b.request("get_state", 1, json!({})).await;
    assert_eq!(state["data"]["deadman"], json!(true));

    let reply = b.request("say", 2, json!({"text": "hello"})).await;
    assert_eq!(reply["data"], json!({"spoken": true}));
    assert!(running.robot.spoken().contains(&"hello".to_string()));

    running.service.request_shutdown();
    running.service.wait().await.unwrap();
}
