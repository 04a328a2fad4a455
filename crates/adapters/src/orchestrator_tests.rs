use super::*;

#[test]
fn service_ready_serializes_for_the_wire() {
    let ready = ServiceReady::new(Identity::parse("myapp:api").unwrap(), 4001);
    let json = serde_json::to_value(&ready).unwrap();
    assert_eq!(json["event"], "service.ready");
    assert_eq!(json["identity"], "myapp:api");
    assert_eq!(json["port"], 4001);
    assert!(json.get("url").is_none());
}

#[tokio::test]
async fn noop_probe_is_never_healthy() {
    let probe = NoOpHealthProbe;
    assert!(!probe.probe("http://127.0.0.1:4001/healthz").await);
}
