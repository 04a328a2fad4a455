use super::*;

fn store() -> Store {
    Store::open_in_memory().unwrap()
}

#[test]
fn ids_are_monotonic() {
    let store = store();
    let a = store.append_message("builds", "{\"s\":1}", None, 10).unwrap();
    let b = store.append_message("builds", "{\"s\":2}", None, 20).unwrap();
    let c = store.append_message("other", "{}", Some("me"), 30).unwrap();
    assert!(a < b && b < c);
}

#[test]
fn history_in_id_order_with_since() {
    let store = store();
    for i in 0..5 {
        store
            .append_message("builds", &format!("{{\"n\":{i}}}"), None, i)
            .unwrap();
    }

    let all = store.get_messages("builds", 100, 0).unwrap();
    assert_eq!(all.len(), 5);
    assert!(all.windows(2).all(|w| w[0].id < w[1].id));

    let since = store.get_messages("builds", 100, all[2].id).unwrap();
    assert_eq!(since.len(), 2);
    assert_eq!(since[0].id, all[3].id);
}

#[test]
fn limit_keeps_the_newest() {
    let store = store();
    for i in 0..10 {
        store
            .append_message("builds", &format!("{i}"), None, i)
            .unwrap();
    }
    let tail = store.get_messages("builds", 3, 0).unwrap();
    assert_eq!(tail.len(), 3);
    assert_eq!(tail[2].payload, "9");
    assert_eq!(tail[0].payload, "7");
}

#[test]
fn channels_are_isolated() {
    let store = store();
    store.append_message("a", "1", None, 0).unwrap();
    store.append_message("b", "2", None, 0).unwrap();
    assert_eq!(store.get_messages("a", 100, 0).unwrap().len(), 1);
}

#[test]
fn list_channels_reports_counts() {
    let store = store();
    store.append_message("builds", "1", None, 10).unwrap();
    store.append_message("builds", "2", None, 20).unwrap();
    store.append_message("deploys", "3", None, 30).unwrap();

    let channels = store.list_channels().unwrap();
    assert_eq!(channels.len(), 2);
    let builds = channels.iter().find(|c| c.channel == "builds").unwrap();
    assert_eq!(builds.message_count, 2);
    assert_eq!(builds.last_message, Some(20));
}

#[test]
fn clear_channel_counts() {
    let store = store();
    store.append_message("builds", "1", None, 0).unwrap();
    store.append_message("builds", "2", None, 0).unwrap();
    assert_eq!(store.clear_channel("builds").unwrap(), 2);
    assert_eq!(store.clear_channel("builds").unwrap(), 0);
}

#[test]
fn prune_by_age_and_count() {
    let store = store();
    // Three old rows, seven new rows.
    for i in 0..3 {
        store.append_message("builds", "old", None, i).unwrap();
    }
    for i in 100..107 {
        store.append_message("builds", "new", None, i).unwrap();
    }

    // Age cutoff removes the 3 old; count cap 5 trims 2 more.
    let reclaimed = store.prune_messages(100, 5).unwrap();
    assert_eq!(reclaimed, 5);
    assert_eq!(store.get_messages("builds", 100, 0).unwrap().len(), 5);
}

#[test]
fn last_message_id_defaults_to_zero() {
    let store = store();
    assert_eq!(store.last_message_id("builds").unwrap(), 0);
    let id = store.append_message("builds", "x", None, 0).unwrap();
    assert_eq!(store.last_message_id("builds").unwrap(), id);
}
