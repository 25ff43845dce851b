//! End-to-end admission flow tests for the gate.

use std::time::Duration;

use serde_json::Value;
use throttle_gate::audit::store::{ALLOWED_BUCKET, DENIED_BUCKET};
use throttle_gate::config::GateConfig;

mod common;

#[tokio::test]
async fn test_quota_scenario_ten_allowed_then_denied() {
    let mut config = GateConfig::default();
    config.throttle.quota_per_window = 10;
    let gate = common::start_gate(config).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    for _ in 0..10 {
        let res = client
            .get(gate.url("/"))
            .header("X-Forwarded-For", "1.2.3.4")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], "Welcome!");
    }

    let res = client
        .get(gate.url("/"))
        .header("X-Forwarded-For", "1.2.3.4")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 429);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], 429);
    assert!(
        body["status"].as_str().unwrap().contains("11/10"),
        "denial should report count and quota, got {}",
        body["status"]
    );

    // Every decision lands in exactly one bucket.
    assert_eq!(
        common::wait_for_records(&gate.store, ALLOWED_BUCKET, 10).await,
        10
    );
    assert_eq!(
        common::wait_for_records(&gate.store, DENIED_BUCKET, 1).await,
        1
    );

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_window_reset_starts_counting_from_one() {
    let mut config = GateConfig::default();
    config.throttle.quota_per_window = 1;
    config.throttle.window_secs = 1;
    let gate = common::start_gate(config).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let send = || {
        client
            .get(gate.url("/"))
            .header("X-Forwarded-For", "1.2.3.4")
            .send()
    };

    assert_eq!(send().await.unwrap().status(), 200);
    assert_eq!(send().await.unwrap().status(), 429);

    // Cross the window boundary; the table is discarded wholesale.
    tokio::time::sleep(Duration::from_millis(1300)).await;

    assert_eq!(send().await.unwrap().status(), 200);

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_forwarded_identity_takes_precedence_over_peer() {
    let mut config = GateConfig::default();
    config.throttle.quota_per_window = 1;
    let gate = common::start_gate(config).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .get(gate.url("/"))
        .header("X-Forwarded-For", "9.9.9.9, 10.0.0.1")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    // Same forwarded client, different last hop: still one identity.
    let res = client
        .get(gate.url("/"))
        .header("X-Forwarded-For", "9.9.9.9, 172.16.0.5")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 429);

    // No forwarded header falls back to the peer address, which has its
    // own untouched count.
    let res = client.get(gate.url("/")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    common::wait_for_records(&gate.store, ALLOWED_BUCKET, 2).await;
    let allowed = gate.store.bucket(ALLOWED_BUCKET);
    assert!(
        allowed.iter().any(|(key, _)| key.ends_with("::9.9.9.9")),
        "record key should carry the forwarded identity"
    );
    assert!(
        allowed.iter().any(|(key, _)| key.ends_with("::127.0.0.1")),
        "record key should carry the peer identity"
    );

    gate.shutdown.trigger();
}

#[tokio::test]
async fn test_audit_record_captures_request_context() {
    let mut config = GateConfig::default();
    config.throttle.quota_per_window = 10;
    let gate = common::start_gate(config).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .post(gate.url("/v1/api/request/ping"))
        .header("X-Forwarded-For", "5.6.7.8")
        .header("User-Agent", "gate-test/1.0")
        .header("Referer", "https://example.com/")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "RequestPost::Welcome");

    assert_eq!(
        common::wait_for_records(&gate.store, ALLOWED_BUCKET, 1).await,
        1
    );
    let (_, record) = gate.store.bucket(ALLOWED_BUCKET).pop().unwrap();
    let record: Value = serde_json::from_str(&record).unwrap();
    assert_eq!(record["identity"], "5.6.7.8");
    assert_eq!(record["url"], "/v1/api/request/ping");
    assert_eq!(record["user_agent"], "gate-test/1.0");
    assert_eq!(record["referrer"], "https://example.com/");
    assert_eq!(record["tag"], "ping");
    assert_eq!(record["outcome"], "Allowed");
    assert!(!record["timestamp"].as_str().unwrap().is_empty());

    gate.shutdown.trigger();
}
