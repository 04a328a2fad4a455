use super::test_helpers::{call, test_router};
use axum::http::StatusCode;

#[tokio::test]
async fn unknown_route_gets_the_envelope() {
    let (router, _state) = test_router();
    let (status, body) = call(&router, "GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn rate_limit_refuses_with_429() {
    // A tight limiter: 2 requests per minute.
    let (_unused, base) = test_router();
    let state = super::AppState {
        limiter: std::sync::Arc::new(crate::ratelimit::RateLimiter::new(
            2,
            std::time::Duration::from_secs(60),
        )),
        ..base
    };
    let router = super::router(state.clone());

    let (status, _) = call(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "CAPACITY");
    assert!(state.kernel.metrics().snapshot().rate_limited >= 1);
}

#[tokio::test]
async fn success_and_error_counters_track_outcomes() {
    let (router, state) = test_router();
    call(&router, "GET", "/health", None).await;
    call(&router, "GET", "/services/ghost", None).await;

    let snap = state.kernel.metrics().snapshot();
    assert_eq!(snap.requests_ok, 1);
    assert_eq!(snap.requests_error, 1);
}

#[tokio::test]
async fn malformed_json_body_is_enveloped() {
    use axum::body::Body as AxumBody;
    use tower::ServiceExt;

    let (router, _state) = test_router();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/sessions")
        .header("content-type", "application/json")
        .body(AxumBody::from("{not json"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), 65_536).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "VALIDATION");
}
