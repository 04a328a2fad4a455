use super::*;

fn entry(action: &str) -> ActivityEntry {
    ActivityEntry {
        id: 1,
        entry_type: "service".into(),
        action: action.into(),
        target: "myapp:api".into(),
        details: Some(serde_json::json!({ "port": 4001 })),
        agent_id: Some("alpha".into()),
        created_at: 1_000,
    }
}

#[test]
fn default_filter_curates_actions() {
    let deliverer = FakeWebhookDeliverer::new();
    assert!(deliverer.wants("claim"));
    assert!(deliverer.wants("agent.dead"));
    assert!(!deliverer.wants("heartbeat"));
}

#[tokio::test]
async fn fake_deliverer_records_events() {
    let deliverer = FakeWebhookDeliverer::new();
    let event = WebhookEvent::from(&entry("claim"));
    deliverer.deliver(&event).await.unwrap();

    let delivered = deliverer.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].action, "claim");
    assert_eq!(delivered[0].details.as_ref().unwrap()["port"], 4001);
}

#[test]
fn noop_wants_nothing() {
    let deliverer = NoOpWebhookDeliverer;
    assert!(!deliverer.wants("claim"));
}
