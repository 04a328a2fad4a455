//! Scenario: salvage handoff of a dead agent's sessions.

use crate::prelude::harness;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn salvage_handoff_scenario() {
    let h = harness();

    // α registers with an identity and starts a session.
    h.call(
        "POST",
        "/agents/alpha",
        Some(json!({ "type": "coder", "identity": "myapp:api" })),
    )
    .await;
    let (_, body) = h
        .call(
            "POST",
            "/sessions",
            Some(json!({ "purpose": "refactor", "agent_id": "alpha" })),
        )
        .await;
    let session_id = body["session"]["id"].as_str().unwrap().to_string();
    h.call(
        "POST",
        &format!("/sessions/{session_id}/notes"),
        Some(json!({ "content": "halfway through", "created_by": "alpha" })),
    )
    .await;

    // Backdate α's heartbeat past DEAD_AFTER, then force a reaper pass.
    let dead_gap = h.state.kernel.config().staleness.dead_after_ms;
    let backdated = h.state.kernel.now() - dead_gap - 1_000;
    h.state
        .kernel
        .store()
        .set_agent_heartbeat("alpha", backdated)
        .unwrap();

    let (_, body) = h.call("POST", "/resurrection/reap", None).await;
    assert_eq!(body["report"]["agents_marked_dead"], 1);
    assert_eq!(body["report"]["resurrections_created"], 1);

    // The pending queue for the project lists the session snapshot.
    let (status, body) = h.call("GET", "/salvage?project=myapp", None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry["dead_agent_id"], "alpha");
    assert_eq!(entry["sessions"][0]["session"]["id"], session_id);
    assert_eq!(entry["sessions"][0]["notes"][0]["content"], "halfway through");
    let entry_id = entry["id"].as_i64().unwrap();

    // β claims the entry.
    let (status, body) = h
        .call(
            "POST",
            "/salvage",
            Some(json!({ "entry_id": entry_id, "agent_id": "beta" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entry"]["state"], "claimed");
    assert_eq!(body["entry"]["claimed_by"], "beta");

    // β registering for the same project would have seen the hint before
    // the claim; after it, the pending queue is empty.
    let (_, body) = h.call("GET", "/salvage?project=myapp", None).await;
    assert!(body["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn register_surfaces_the_salvage_hint() {
    let h = harness();

    h.call(
        "POST",
        "/agents/alpha",
        Some(json!({ "type": "coder", "identity": "myapp:api" })),
    )
    .await;
    h.call(
        "POST",
        "/sessions",
        Some(json!({ "purpose": "wip", "agent_id": "alpha" })),
    )
    .await;

    let dead_gap = h.state.kernel.config().staleness.dead_after_ms;
    let backdated = h.state.kernel.now() - dead_gap - 1_000;
    h.state
        .kernel
        .store()
        .set_agent_heartbeat("alpha", backdated)
        .unwrap();
    h.call("POST", "/resurrection/reap", None).await;

    let (_, body) = h
        .call(
            "POST",
            "/agents/beta",
            Some(json!({ "type": "coder", "identity": "myapp:web" })),
        )
        .await;
    assert_eq!(body["salvage_hint"], 1);
}
