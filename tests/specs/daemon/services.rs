//! Scenario: stable port assignment and stale-service cleanup.

use crate::prelude::harness;
use axum::http::StatusCode;

#[tokio::test]
async fn stable_port_scenario() {
    let h = harness();

    // First claim hands out a port.
    let (status, body) = h.call("POST", "/claim/myapp:api", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["existing"], false);
    let port = body["port"].as_u64().unwrap();

    // Repeat claim: same port, existing=true.
    let (_, body) = h.call("POST", "/claim/myapp:api", None).await;
    assert_eq!(body["existing"], true);
    assert_eq!(body["port"].as_u64().unwrap(), port);

    // Release, then claim again: a fresh assignment.
    let (_, body) = h.call("DELETE", "/release/myapp:api", None).await;
    assert_eq!(body["released"], 1);

    let (_, body) = h.call("POST", "/claim/myapp:api", None).await;
    assert_eq!(body["existing"], false);
    assert!(body["port"].as_u64().is_some());
}

#[tokio::test]
async fn identity_and_port_stay_unique() {
    let h = harness();
    let (_, a) = h.call("POST", "/claim/svc:one", None).await;
    let (_, b) = h.call("POST", "/claim/svc:two", None).await;
    assert_ne!(a["port"], b["port"]);

    let (_, body) = h.call("GET", "/services", None).await;
    assert_eq!(body["services"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn stale_service_cleanup_scenario() {
    let h = harness();

    // Claim on behalf of a child process, then let it die. The claim goes
    // through the kernel directly: real pids may exceed the HTTP layer's
    // pid ceiling.
    let mut child = std::process::Command::new("sleep")
        .arg("60")
        .spawn()
        .unwrap();
    let pid = child.id();

    h.state
        .kernel
        .claim(
            &harbor_core::Identity::parse("myapp:web").unwrap(),
            &harbor_engine::ClaimOptions {
                pid: Some(pid),
                ..Default::default()
            },
        )
        .unwrap();

    child.kill().unwrap();
    child.wait().unwrap();

    // Reaper pass drops the row.
    let (_, body) = h.call("POST", "/resurrection/reap", None).await;
    assert_eq!(body["report"]["stale_services"], 1);

    let (status, _) = h.call("GET", "/services/myapp:web", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A new claim starts fresh.
    let (_, body) = h.call("POST", "/claim/myapp:web", None).await;
    assert_eq!(body["existing"], false);
}
