//! Scenario: session cascade delete.

use crate::prelude::harness;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn session_cascade_scenario() {
    let h = harness();

    let (_, body) = h
        .call("POST", "/sessions", Some(json!({ "purpose": "x" })))
        .await;
    let id = body["session"]["id"].as_str().unwrap().to_string();

    h.call(
        "POST",
        &format!("/sessions/{id}/notes"),
        Some(json!({ "content": "a" })),
    )
    .await;
    h.call(
        "POST",
        &format!("/sessions/{id}/files"),
        Some(json!({ "paths": ["p.ts"] })),
    )
    .await;

    let (_, body) = h.call("GET", &format!("/sessions/{id}"), None).await;
    assert_eq!(body["notes"].as_array().unwrap().len(), 1);
    assert_eq!(body["files"].as_array().unwrap().len(), 1);

    let (status, _) = h.call("DELETE", &format!("/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    // Session, notes, and claims are all gone.
    let (status, _) = h.call("GET", &format!("/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = h
        .call("GET", &format!("/notes?session_id={id}"), None)
        .await;
    assert!(body["notes"].as_array().unwrap().is_empty());

    // The path is claimable again.
    let (_, body) = h
        .call(
            "POST",
            "/sessions",
            Some(json!({ "purpose": "y", "files": ["p.ts"] })),
        )
        .await;
    assert!(body["conflicts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn terminal_status_never_reverts() {
    let h = harness();
    let (_, body) = h
        .call("POST", "/sessions", Some(json!({ "purpose": "x" })))
        .await;
    let id = body["session"]["id"].as_str().unwrap().to_string();

    h.call(
        "PUT",
        &format!("/sessions/{id}"),
        Some(json!({ "status": "completed" })),
    )
    .await;

    // No way back to active, and no switch to abandoned.
    let (status, _) = h
        .call(
            "PUT",
            &format!("/sessions/{id}"),
            Some(json!({ "status": "active" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h
        .call(
            "PUT",
            &format!("/sessions/{id}"),
            Some(json!({ "status": "abandoned" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = h.call("GET", &format!("/sessions/{id}"), None).await;
    assert_eq!(body["session"]["status"], "completed");
}
