//! Scenario: lock contention between two owners.

use crate::prelude::harness;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn lock_contention_scenario() {
    let h = harness();

    // A takes the lock for 60s.
    let (status, _) = h
        .call(
            "POST",
            "/locks/db-mig",
            Some(json!({ "owner": "A", "ttl_ms": 60_000 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // B is refused with the holder's name.
    let (status, body) = h
        .call(
            "POST",
            "/locks/db-mig",
            Some(json!({ "owner": "B", "ttl_ms": 60_000 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["holder"], "A");

    // After A releases, B succeeds.
    let (_, body) = h.call("DELETE", "/locks/db-mig?owner=A", None).await;
    assert_eq!(body["released"], true);

    let (status, body) = h
        .call(
            "POST",
            "/locks/db-mig",
            Some(json!({ "owner": "B", "ttl_ms": 60_000 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lock"]["owner"], "B");
}

#[tokio::test]
async fn lock_list_shows_only_live_leases() {
    let h = harness();
    h.call(
        "POST",
        "/locks/one",
        Some(json!({ "owner": "A", "ttl_ms": 60_000 })),
    )
    .await;
    h.call("POST", "/locks/two", Some(json!({ "owner": "B" })))
        .await;

    let (_, body) = h.call("GET", "/locks", None).await;
    assert_eq!(body["locks"].as_array().unwrap().len(), 2);

    let (_, body) = h.call("GET", "/locks?owner=A", None).await;
    assert_eq!(body["locks"].as_array().unwrap().len(), 1);
}
