use super::super::test_helpers::{call, test_router};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn claim_release_claim_round_trip() {
    let (router, _state) = test_router();

    let (status, body) = call(&router, "POST", "/claim/myapp:api", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["existing"], false);
    let port = body["port"].as_u64().unwrap();

    // Same name, same port.
    let (_, body) = call(&router, "POST", "/claim/myapp:api", None).await;
    assert_eq!(body["existing"], true);
    assert_eq!(body["port"].as_u64().unwrap(), port);

    let (status, body) = call(&router, "DELETE", "/release/myapp:api", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["released"], 1);

    let (_, body) = call(&router, "POST", "/claim/myapp:api", None).await;
    assert_eq!(body["existing"], false);
}

#[tokio::test]
async fn claim_with_body_identity() {
    let (router, _state) = test_router();
    let (status, body) = call(
        &router,
        "POST",
        "/claim",
        Some(json!({ "identity": "myapp:web", "preferred_port": 18_450 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["port"], 18_450);
}

#[tokio::test]
async fn claim_requires_identity() {
    let (router, _state) = test_router();
    let (status, body) = call(&router, "POST", "/claim", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
}

#[tokio::test]
async fn invalid_identity_is_400() {
    let (router, _state) = test_router();
    let (status, body) = call(&router, "POST", "/claim/bad..:", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
}

#[tokio::test]
async fn unknown_body_field_is_400() {
    let (router, _state) = test_router();
    let (status, body) = call(
        &router,
        "POST",
        "/claim/myapp:api",
        Some(json!({ "bogus": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
}

#[tokio::test]
async fn pid_bounds_are_validated() {
    let (router, _state) = test_router();
    let (status, _) = call(
        &router,
        "POST",
        "/claim/myapp:api",
        Some(json!({ "pid": 100_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_and_detail() {
    let (router, _state) = test_router();
    call(&router, "POST", "/claim/myapp:api", None).await;
    call(&router, "POST", "/claim/other", None).await;

    let (_, body) = call(&router, "GET", "/services", None).await;
    assert_eq!(body["services"].as_array().unwrap().len(), 2);

    let (_, body) = call(&router, "GET", "/services?pattern=myapp:*", None).await;
    assert_eq!(body["services"].as_array().unwrap().len(), 1);

    let (status, body) = call(&router, "GET", "/services/myapp:api", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"]["identity"], "myapp:api");

    let (status, body) = call(&router, "GET", "/services/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn release_query_forms() {
    let (router, _state) = test_router();
    call(&router, "POST", "/claim/myapp:api", None).await;

    // No pattern and no expired flag: invalid.
    let (status, _) = call(&router, "DELETE", "/release", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = call(&router, "DELETE", "/release?expired=true", None).await;
    assert_eq!(body["expired"], true);

    let (_, body) = call(&router, "DELETE", "/release?pattern=myapp:*", None).await;
    assert_eq!(body["released"], 1);
}

#[tokio::test]
async fn endpoint_merge_over_http() {
    let (router, _state) = test_router();
    call(&router, "POST", "/claim/myapp:api", None).await;

    let (status, body) = call(
        &router,
        "PUT",
        "/services/myapp:api/endpoint",
        Some(json!({ "env": "tunnel", "url": "https://x.example" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"]["endpoints"]["tunnel"], "https://x.example");
}
