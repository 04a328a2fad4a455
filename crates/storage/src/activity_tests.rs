use super::*;

fn store() -> Store {
    Store::open_in_memory().unwrap()
}

#[test]
fn append_and_list() {
    let store = store();
    store
        .append_activity("service", "claim", "myapp:api", None, Some("alpha"), 10)
        .unwrap();
    store
        .append_activity(
            "lock",
            "acquire",
            "db-mig",
            Some(&serde_json::json!({"ttl": 60000})),
            None,
            20,
        )
        .unwrap();

    let all = store
        .list_activity(&ActivityQuery {
            limit: 100,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(all.len(), 2);
    // Newest first.
    assert_eq!(all[0].entry_type, "lock");
    assert_eq!(all[0].details.as_ref().unwrap()["ttl"], 60000);
}

#[test]
fn filters_compose() {
    let store = store();
    for i in 0..10 {
        let t = if i % 2 == 0 { "service" } else { "lock" };
        store
            .append_activity(t, "x", "t", None, Some("alpha"), i)
            .unwrap();
    }
    store
        .append_activity("service", "x", "t", None, Some("beta"), 100)
        .unwrap();

    let filtered = store
        .list_activity(&ActivityQuery {
            entry_type: Some("service"),
            agent_id: Some("alpha"),
            from: Some(2),
            to: Some(8),
            limit: 100,
            offset: 0,
        })
        .unwrap();
    assert_eq!(filtered.len(), 4); // created_at 2, 4, 6, 8
    assert!(filtered.iter().all(|e| e.entry_type == "service"));
}

#[test]
fn pagination() {
    let store = store();
    for i in 0..10 {
        store
            .append_activity("service", "x", "t", None, None, i)
            .unwrap();
    }
    let page = store
        .list_activity(&ActivityQuery {
            limit: 3,
            offset: 3,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page[0].created_at, 6);
}

#[test]
fn summary_counts_by_type() {
    let store = store();
    store
        .append_activity("service", "claim", "a", None, None, 10)
        .unwrap();
    store
        .append_activity("service", "release", "a", None, None, 20)
        .unwrap();
    store
        .append_activity("lock", "acquire", "b", None, None, 30)
        .unwrap();

    let summary = store.activity_summary(15).unwrap();
    assert_eq!(summary.get("service"), Some(&1));
    assert_eq!(summary.get("lock"), Some(&1));
}

#[test]
fn stats_aggregates() {
    let store = store();
    store
        .append_activity("service", "claim", "a", None, None, 10)
        .unwrap();
    store
        .append_activity("service", "claim", "b", None, None, 50)
        .unwrap();

    let stats = store.activity_stats().unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.first_at, Some(10));
    assert_eq!(stats.last_at, Some(50));
    assert_eq!(stats.by_action.get("claim"), Some(&2));
}

#[test]
fn prune_by_age_then_rows() {
    let store = store();
    for i in 0..10 {
        store
            .append_activity("service", "x", "t", None, None, i)
            .unwrap();
    }
    // Age removes 0..5, row cap 3 removes 5 and 6.
    let reclaimed = store.prune_activity(5, 3).unwrap();
    assert_eq!(reclaimed, 7);
    let left = store
        .list_activity(&ActivityQuery {
            limit: 100,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(left.len(), 3);
    assert_eq!(left[2].created_at, 7);
}
