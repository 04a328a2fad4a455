//! Shared harness for the daemon specs.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use harbor_daemon::http::{router, AppState};
use harbor_engine::{KernelConfig, Reaper, SystemKernel};
use harbor_storage::Store;
use tower::ServiceExt;

/// A daemon stack on a temp-dir database.
pub struct Harness {
    pub router: Router,
    pub state: AppState,
    _dir: tempfile::TempDir,
}

pub fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = KernelConfig {
        port_range: (19_000, 19_099),
        reserved_ports: vec![],
        ..Default::default()
    };
    let store = Arc::new(Store::open(&dir.path().join("harbor.db")).unwrap());
    let kernel = Arc::new(SystemKernel::system(store, config));
    let reaper = Arc::new(Reaper::new(Arc::clone(&kernel)));
    let state = AppState::new(kernel, reaper, 9876);
    Harness {
        router: router(state.clone()),
        state,
        _dir: dir,
    }
}

impl Harness {
    /// One JSON request through the router.
    pub async fn call(
        &self,
        method: &str,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let request = match body {
            Some(json) => Request::builder()
                .method(method)
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    /// Publish with the raw payload body `/msg` expects.
    pub async fn publish(&self, channel: &str, payload: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/msg/{channel}"))
            .body(Body::from(payload.to_string()))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
