use std::sync::Arc;

use axum::body::Body as AxumBody;
use axum::http::{Request, StatusCode};
use axum::Router;
use harbor_engine::{KernelConfig, Reaper, SystemKernel};
use harbor_storage::Store;
use tower::ServiceExt;

use super::{router, AppState};

/// Kernel config shaped for tests: tiny port range, fast thresholds.
pub(crate) fn test_config() -> KernelConfig {
    KernelConfig {
        port_range: (18_400, 18_499),
        reserved_ports: vec![],
        ..Default::default()
    }
}

pub(crate) fn test_state() -> AppState {
    test_state_with(test_config())
}

pub(crate) fn test_state_with(config: KernelConfig) -> AppState {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let kernel = Arc::new(SystemKernel::system(store, config));
    let reaper = Arc::new(Reaper::new(Arc::clone(&kernel)));
    AppState::new(kernel, reaper, 9876)
}

pub(crate) fn test_router() -> (Router, AppState) {
    let state = test_state();
    (router(state.clone()), state)
}

/// Drive one request through the router; returns status + parsed body.
pub(crate) async fn call(
    router: &Router,
    method: &str,
    path: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(AxumBody::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(path)
            .body(AxumBody::empty())
            .unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, value)
}

/// Publish a raw (non-JSON-wrapped) body, as `/msg` requires.
pub(crate) async fn call_raw(
    router: &Router,
    method: &str,
    path: &str,
    body: &str,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .body(AxumBody::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
}
