use super::*;
use crate::kernel::test_helpers::kernel;
use std::time::Duration;

fn owned(owner: &str, ttl_ms: Option<i64>) -> LockOptions {
    LockOptions {
        owner: Some(owner.into()),
        ttl_ms,
        pid: None,
    }
}

#[test]
fn acquire_then_contend() {
    let t = kernel();
    t.kernel.acquire_lock("db-mig", &owned("A", Some(60_000))).unwrap();

    let err = t
        .kernel
        .acquire_lock("db-mig", &owned("B", Some(60_000)))
        .unwrap_err();
    match err {
        KernelError::LockHeld { owner, .. } => assert_eq!(owner, "A"),
        other => panic!("expected LockHeld, got {other:?}"),
    }
}

#[test]
fn acquire_after_release() {
    let t = kernel();
    t.kernel.acquire_lock("db-mig", &owned("A", None)).unwrap();
    assert!(t.kernel.release_lock("db-mig", Some("A"), false).unwrap());
    let lock = t.kernel.acquire_lock("db-mig", &owned("B", None)).unwrap();
    assert_eq!(lock.owner, "B");
}

#[test]
fn acquire_after_expiry() {
    let t = kernel();
    t.kernel.acquire_lock("db-mig", &owned("A", Some(1_000))).unwrap();
    t.clock.advance(Duration::from_secs(2));
    let lock = t.kernel.acquire_lock("db-mig", &owned("B", None)).unwrap();
    assert_eq!(lock.owner, "B");
}

#[test]
fn default_owner_is_the_process_pid() {
    let t = kernel();
    let lock = t
        .kernel
        .acquire_lock("db-mig", &LockOptions::default())
        .unwrap();
    assert_eq!(lock.owner, std::process::id().to_string());
}

#[test]
fn ttl_bounds_are_validated() {
    let t = kernel();
    for bad in [0, -5, 25 * 60 * 60 * 1000] {
        let err = t
            .kernel
            .acquire_lock("db-mig", &owned("A", Some(bad)))
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION", "ttl {bad}");
    }
}

#[test]
fn bad_lock_names_are_rejected() {
    let t = kernel();
    for bad in ["", "has space", "x\ny"] {
        let err = t
            .kernel
            .acquire_lock(bad, &owned("A", None))
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION");
    }
}

#[test]
fn extend_requires_matching_owner() {
    let t = kernel();
    t.kernel.acquire_lock("db-mig", &owned("A", Some(10_000))).unwrap();

    let err = t
        .kernel
        .extend_lock("db-mig", &owned("B", Some(10_000)), false)
        .unwrap_err();
    assert_eq!(err.code(), "LOCK_HELD");

    // Matching owner pushes the lease out.
    let before = t.kernel.check_lock("db-mig").unwrap().unwrap();
    t.clock.advance(Duration::from_secs(5));
    let extended = t
        .kernel
        .extend_lock("db-mig", &owned("A", Some(10_000)), false)
        .unwrap();
    assert!(extended.expires_at.unwrap() > before.expires_at.unwrap());

    // Force overrides ownership.
    let forced = t
        .kernel
        .extend_lock("db-mig", &owned("B", Some(10_000)), true)
        .unwrap();
    assert_eq!(forced.owner, "A", "owner is unchanged by a forced extend");
}

#[test]
fn extend_missing_or_expired_is_not_found() {
    let t = kernel();
    let err = t
        .kernel
        .extend_lock("ghost", &owned("A", Some(1_000)), false)
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");

    t.kernel.acquire_lock("db-mig", &owned("A", Some(1_000))).unwrap();
    t.clock.advance(Duration::from_secs(2));
    let err = t
        .kernel
        .extend_lock("db-mig", &owned("A", Some(1_000)), false)
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

#[test]
fn release_semantics() {
    let t = kernel();

    // Nothing held: false, not an error.
    assert!(!t.kernel.release_lock("ghost", Some("A"), false).unwrap());

    // Wrong owner: conflict.
    t.kernel.acquire_lock("db-mig", &owned("A", None)).unwrap();
    let err = t.kernel.release_lock("db-mig", Some("B"), false).unwrap_err();
    assert_eq!(err.code(), "LOCK_HELD");

    // Force wins regardless of owner.
    assert!(t.kernel.release_lock("db-mig", Some("B"), true).unwrap());

    // Expired lease releases as a no-op.
    t.kernel.acquire_lock("db-mig", &owned("A", Some(1_000))).unwrap();
    t.clock.advance(Duration::from_secs(2));
    assert!(!t.kernel.release_lock("db-mig", Some("A"), false).unwrap());
    assert!(t.kernel.check_lock("db-mig").unwrap().is_none());
}

#[test]
fn check_and_list_hide_expired() {
    let t = kernel();
    t.kernel.acquire_lock("live", &owned("A", None)).unwrap();
    t.kernel.acquire_lock("lapsing", &owned("A", Some(1_000))).unwrap();

    t.clock.advance(Duration::from_secs(2));
    assert!(t.kernel.check_lock("lapsing").unwrap().is_none());
    let locks = t.kernel.locks(None).unwrap();
    assert_eq!(locks.len(), 1);
    assert_eq!(locks[0].name, "live");

    let for_owner = t.kernel.locks(Some("A")).unwrap();
    assert_eq!(for_owner.len(), 1);
    assert!(t.kernel.locks(Some("B")).unwrap().is_empty());
}

#[test]
fn mutual_exclusion_holds_until_release_or_expiry() {
    let t = kernel();
    t.kernel.acquire_lock("db-mig", &owned("A", Some(10_000))).unwrap();

    // While the lease is live, every contender fails.
    for _ in 0..3 {
        assert!(t
            .kernel
            .acquire_lock("db-mig", &owned("B", Some(10_000)))
            .is_err());
        t.clock.advance(Duration::from_secs(1));
    }

    t.clock.advance(Duration::from_secs(10));
    assert!(t.kernel.acquire_lock("db-mig", &owned("B", None)).is_ok());
}
