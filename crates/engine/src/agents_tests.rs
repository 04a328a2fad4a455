use super::*;
use crate::kernel::test_helpers::kernel;
use std::time::Duration;

fn registration(identity: Option<&str>) -> RegisterAgent {
    RegisterAgent {
        agent_type: "coder".into(),
        purpose: Some("refactor".into()),
        identity: identity.map(|s| Identity::parse(s).unwrap()),
        worktree_id: None,
    }
}

#[test]
fn register_and_reread() {
    let t = kernel();
    let result = t
        .kernel
        .register_agent("alpha", &registration(Some("myapp:api")))
        .unwrap();
    assert_eq!(result.agent.id, "alpha");
    assert_eq!(result.agent.project.as_deref(), Some("myapp"));
    assert_eq!(result.agent.stack.as_deref(), Some("api"));
    assert_eq!(result.salvage_hint, 0);
}

#[test]
fn reregister_keeps_registered_at() {
    let t = kernel();
    let first = t.kernel.register_agent("alpha", &registration(None)).unwrap();
    t.clock.advance(Duration::from_secs(60));
    let second = t.kernel.register_agent("alpha", &registration(None)).unwrap();

    assert_eq!(second.agent.registered_at, first.agent.registered_at);
    assert!(second.agent.last_heartbeat > first.agent.last_heartbeat);
}

#[test]
fn register_validates_inputs() {
    let t = kernel();
    assert!(t.kernel.register_agent("", &registration(None)).is_err());
    assert!(t
        .kernel
        .register_agent("has space", &registration(None))
        .is_err());
    let mut no_type = registration(None);
    no_type.agent_type = String::new();
    assert!(t.kernel.register_agent("alpha", &no_type).is_err());
}

#[test]
fn salvage_hint_counts_pending_entries_for_project() {
    let t = kernel();
    t.kernel
        .store()
        .insert_resurrection(
            "dead-agent",
            Some(&Identity::parse("myapp:api").unwrap()),
            &[],
            0,
        )
        .unwrap();

    let result = t
        .kernel
        .register_agent("alpha", &registration(Some("myapp:web")))
        .unwrap();
    assert_eq!(result.salvage_hint, 1, "same project counts");

    let other = t
        .kernel
        .register_agent("beta", &registration(Some("other")))
        .unwrap();
    assert_eq!(other.salvage_hint, 0);
}

#[test]
fn heartbeat_refreshes_and_rejects_unknown() {
    let t = kernel();
    t.kernel.register_agent("alpha", &registration(None)).unwrap();
    t.clock.advance(Duration::from_secs(30));
    t.kernel.heartbeat("alpha").unwrap();

    let agent = t.kernel.agent("alpha").unwrap();
    assert_eq!(agent.agent.last_heartbeat, t.clock.epoch_ms());

    let err = t.kernel.heartbeat("ghost").unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[test]
fn unregister_removes_but_keeps_sessions() {
    let t = kernel();
    t.kernel.register_agent("alpha", &registration(None)).unwrap();
    let started = t
        .kernel
        .start_session(&crate::sessions::StartSession {
            purpose: "work".into(),
            agent_id: Some("alpha".into()),
            ..Default::default()
        })
        .unwrap();

    t.kernel.unregister_agent("alpha").unwrap();
    assert_eq!(t.kernel.unregister_agent("alpha").unwrap_err().code(), "NOT_FOUND");

    // The session survives the clean exit.
    let session = t.kernel.session_detail(&started.session.id).unwrap();
    assert_eq!(session.session.status, harbor_core::SessionStatus::Active);
}

#[test]
fn list_derives_states_and_filters() {
    let t = kernel();
    t.kernel.register_agent("fresh", &registration(Some("myapp"))).unwrap();
    t.kernel.register_agent("tired", &registration(Some("myapp"))).unwrap();
    t.kernel.register_agent("gone", &registration(Some("other"))).unwrap();

    // Backdate heartbeats: "tired" past stale, "gone" past dead.
    let stale_gap = t.kernel.config().staleness.stale_after_ms;
    let dead_gap = t.kernel.config().staleness.dead_after_ms;
    let now = t.clock.epoch_ms();
    t.kernel
        .store()
        .set_agent_heartbeat("tired", now - stale_gap)
        .unwrap();
    t.kernel
        .store()
        .set_agent_heartbeat("gone", now - dead_gap)
        .unwrap();

    let all = t.kernel.agents(None, None).unwrap();
    assert_eq!(all.len(), 3);

    let stale = t.kernel.agents(None, Some(AgentState::Stale)).unwrap();
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].agent.id, "tired");

    let dead_myapp = t
        .kernel
        .agents(Some("myapp"), Some(AgentState::Dead))
        .unwrap();
    assert!(dead_myapp.is_empty(), "gone is in another project");

    let myapp = t.kernel.agents(Some("myapp"), None).unwrap();
    assert_eq!(myapp.len(), 2);
}
