use super::super::test_helpers::{call, test_router};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn contention_reports_the_holder() {
    let (router, _state) = test_router();

    let (status, _) = call(
        &router,
        "POST",
        "/locks/db-mig",
        Some(json!({ "owner": "A", "ttl_ms": 60_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &router,
        "POST",
        "/locks/db-mig",
        Some(json!({ "owner": "B", "ttl_ms": 60_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "LOCK_HELD");
    assert_eq!(body["holder"], "A");

    // A releases; B succeeds.
    let (_, body) = call(&router, "DELETE", "/locks/db-mig?owner=A", None).await;
    assert_eq!(body["released"], true);

    let (status, _) = call(
        &router,
        "POST",
        "/locks/db-mig",
        Some(json!({ "owner": "B" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn release_of_unheld_lock_is_ok_false() {
    let (router, _state) = test_router();
    let (status, body) = call(&router, "DELETE", "/locks/ghost?owner=A", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["released"], false);
}

#[tokio::test]
async fn extend_and_check() {
    let (router, _state) = test_router();
    call(
        &router,
        "POST",
        "/locks/db-mig",
        Some(json!({ "owner": "A", "ttl_ms": 10_000 })),
    )
    .await;

    let (status, body) = call(
        &router,
        "PUT",
        "/locks/db-mig",
        Some(json!({ "owner": "A", "ttl_ms": 60_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["lock"]["expires_at"].is_i64());

    let (_, body) = call(&router, "GET", "/locks/db-mig/check", None).await;
    assert_eq!(body["held"], true);
    assert_eq!(body["lock"]["owner"], "A");

    let (_, body) = call(&router, "GET", "/locks", None).await;
    assert_eq!(body["locks"].as_array().unwrap().len(), 1);

    let (_, body) = call(&router, "GET", "/locks?owner=B", None).await;
    assert!(body["locks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn ttl_validation_is_400() {
    let (router, _state) = test_router();
    let (status, body) = call(
        &router,
        "POST",
        "/locks/db-mig",
        Some(json!({ "owner": "A", "ttl_ms": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
}

#[tokio::test]
async fn forced_release() {
    let (router, _state) = test_router();
    call(
        &router,
        "POST",
        "/locks/db-mig",
        Some(json!({ "owner": "A" })),
    )
    .await;

    let (status, body) = call(&router, "DELETE", "/locks/db-mig?owner=B", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["holder"], "A");

    let (status, body) = call(&router, "DELETE", "/locks/db-mig?owner=B&force=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["released"], true);
}
