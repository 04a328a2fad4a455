//! Scenario: pub/sub fan-out to concurrent subscribers.

use crate::prelude::harness;
use axum::http::StatusCode;

#[tokio::test]
async fn fanout_scenario() {
    let h = harness();

    // Two subscribers on the same channel (kernel-level: the SSE layer is
    // a thin pump over these queues).
    let mut first = h.state.kernel.subscribe("builds", "client-a").unwrap();
    let mut second = h.state.kernel.subscribe("builds", "client-b").unwrap();

    let (status, _) = h.publish("builds", "{\"s\":1}").await;
    assert_eq!(status, StatusCode::OK);
    h.publish("builds", "{\"s\":2}").await;

    // Both see both messages, in publish order.
    for sub in [&mut first, &mut second] {
        let one = sub.recv().await.unwrap();
        let two = sub.recv().await.unwrap();
        assert_eq!(one.payload, "{\"s\":1}");
        assert_eq!(two.payload, "{\"s\":2}");
        assert!(one.id < two.id);
    }

    // History agrees.
    let (_, body) = h.call("GET", "/msg/builds?since=0", None).await;
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["payload"], "{\"s\":1}");
    assert_eq!(messages[1]["payload"], "{\"s\":2}");
}

#[tokio::test]
async fn history_survives_subscriber_churn() {
    let h = harness();
    {
        let _sub = h.state.kernel.subscribe("builds", "client").unwrap();
        h.publish("builds", "{\"n\":1}").await;
    } // subscriber gone

    h.publish("builds", "{\"n\":2}").await;
    let (_, body) = h.call("GET", "/msg/builds", None).await;
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);

    let (_, body) = h.call("GET", "/channels", None).await;
    assert_eq!(body["channels"][0]["channel"], "builds");
    assert_eq!(body["channels"][0]["message_count"], 2);
}
