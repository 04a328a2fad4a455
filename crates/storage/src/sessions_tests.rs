use super::*;

fn store() -> Store {
    Store::open_in_memory().unwrap()
}

fn session(id: &str, created_by: &str) -> SessionRecord {
    SessionRecord {
        id: id.into(),
        purpose: "work".into(),
        created_by: created_by.into(),
        created_at: 1_000,
        updated_at: 1_000,
        status: SessionStatus::Active,
        identity: Some(Identity::parse("myapp:api").unwrap()),
    }
}

#[test]
fn insert_get_round_trip() {
    let store = store();
    store.insert_session(&session("s-1", "alpha")).unwrap();
    let got = store.get_session("s-1").unwrap().unwrap();
    assert_eq!(got.purpose, "work");
    assert_eq!(got.status, SessionStatus::Active);
    assert_eq!(got.identity.unwrap().to_string(), "myapp:api");
}

#[test]
fn list_filters_by_status() {
    let store = store();
    store.insert_session(&session("s-1", "alpha")).unwrap();
    store.insert_session(&session("s-2", "alpha")).unwrap();
    store
        .update_session_status("s-2", SessionStatus::Completed, 2_000)
        .unwrap();

    assert_eq!(store.list_sessions(None, 100).unwrap().len(), 2);
    let active = store
        .list_sessions(Some(SessionStatus::Active), 100)
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "s-1");
}

#[test]
fn update_status_touches_updated_at() {
    let store = store();
    store.insert_session(&session("s-1", "alpha")).unwrap();
    assert!(store
        .update_session_status("s-1", SessionStatus::Abandoned, 5_000)
        .unwrap());
    let got = store.get_session("s-1").unwrap().unwrap();
    assert_eq!(got.status, SessionStatus::Abandoned);
    assert_eq!(got.updated_at, 5_000);

    assert!(!store
        .update_session_status("ghost", SessionStatus::Completed, 0)
        .unwrap());
}

#[test]
fn delete_cascades_to_notes_and_claims() {
    let store = store();
    store.insert_session(&session("s-1", "alpha")).unwrap();
    store
        .insert_note("s-1", "note", "hello", "alpha", 1_000)
        .unwrap();
    store.insert_file_claim("s-1", "src/main.rs", 1_000).unwrap();

    assert!(store.delete_session("s-1").unwrap());
    assert_eq!(store.count_notes("s-1").unwrap(), 0);
    assert!(store.list_file_claims("s-1").unwrap().is_empty());
}

#[test]
fn latest_active_session_prefers_newest() {
    let store = store();
    let mut old = session("s-old", "alpha");
    old.created_at = 100;
    store.insert_session(&old).unwrap();
    let mut new = session("s-new", "alpha");
    new.created_at = 200;
    store.insert_session(&new).unwrap();
    // Terminal sessions are skipped.
    let mut newest_done = session("s-done", "alpha");
    newest_done.created_at = 300;
    newest_done.status = SessionStatus::Completed;
    store.insert_session(&newest_done).unwrap();

    let got = store.latest_active_session_for("alpha").unwrap().unwrap();
    assert_eq!(got.id, "s-new");
    assert!(store.latest_active_session_for("beta").unwrap().is_none());
}

#[test]
fn notes_append_in_order() {
    let store = store();
    store.insert_session(&session("s-1", "alpha")).unwrap();
    let a = store.insert_note("s-1", "note", "a", "alpha", 10).unwrap();
    let b = store.insert_note("s-1", "todo", "b", "alpha", 20).unwrap();
    assert!(a < b);

    let newest_first = store.list_notes(Some("s-1"), None, 100).unwrap();
    assert_eq!(newest_first[0].content, "b");

    let todos = store.list_notes(Some("s-1"), Some("todo"), 100).unwrap();
    assert_eq!(todos.len(), 1);

    let oldest_first = store.recent_notes_for_session("s-1", 100).unwrap();
    assert_eq!(oldest_first[0].content, "a");
}

#[test]
fn recent_notes_bounds_to_the_tail() {
    let store = store();
    store.insert_session(&session("s-1", "alpha")).unwrap();
    for i in 0..10 {
        store
            .insert_note("s-1", "note", &format!("n{i}"), "alpha", i)
            .unwrap();
    }
    let tail = store.recent_notes_for_session("s-1", 3).unwrap();
    assert_eq!(tail.len(), 3);
    assert_eq!(tail[0].content, "n7");
    assert_eq!(tail[2].content, "n9");
}

#[test]
fn file_claim_idempotent_per_session() {
    let store = store();
    store.insert_session(&session("s-1", "alpha")).unwrap();
    store.insert_file_claim("s-1", "p.ts", 10).unwrap();
    store.insert_file_claim("s-1", "p.ts", 20).unwrap();
    let claims = store.list_file_claims("s-1").unwrap();
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].claimed_at, 10, "first claim wins");
}

#[test]
fn active_claims_on_path_reports_other_active_sessions() {
    let store = store();
    store.insert_session(&session("s-1", "alpha")).unwrap();
    store.insert_session(&session("s-2", "beta")).unwrap();
    store.insert_file_claim("s-1", "p.ts", 10).unwrap();

    // s-2 asking about p.ts sees s-1's claim.
    let conflicts = store.active_claims_on_path("p.ts", "s-2").unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].1.id, "s-1");

    // s-1 asking about its own path sees nothing.
    assert!(store.active_claims_on_path("p.ts", "s-1").unwrap().is_empty());

    // Terminal sessions stop conflicting.
    store
        .update_session_status("s-1", SessionStatus::Completed, 99)
        .unwrap();
    assert!(store.active_claims_on_path("p.ts", "s-2").unwrap().is_empty());
}

#[test]
fn remove_file_claim() {
    let store = store();
    store.insert_session(&session("s-1", "alpha")).unwrap();
    store.insert_file_claim("s-1", "p.ts", 10).unwrap();
    assert!(store.delete_file_claim("s-1", "p.ts").unwrap());
    assert!(!store.delete_file_claim("s-1", "p.ts").unwrap());
}

#[test]
fn active_sessions_created_by_lists_only_active() {
    let store = store();
    store.insert_session(&session("s-1", "alpha")).unwrap();
    let mut done = session("s-2", "alpha");
    done.status = SessionStatus::Completed;
    store.insert_session(&done).unwrap();
    store.insert_session(&session("s-3", "beta")).unwrap();

    let active = store.active_sessions_created_by("alpha").unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "s-1");
}
