use super::*;
use crate::kernel::test_helpers::kernel;

fn change(identity: &str, summary: &str) -> RecordChange {
    RecordChange {
        identity: Identity::parse(identity).unwrap(),
        change_type: ChangeType::Fix,
        summary: summary.into(),
        description: None,
        session_id: None,
        agent_id: Some("alpha".into()),
    }
}

#[test]
fn record_and_query_with_rollup() {
    let t = kernel();
    t.kernel.record_change(&change("myapp:api:dev", "deep fix")).unwrap();
    t.kernel.record_change(&change("myapp", "top-level fix")).unwrap();

    let project_view = t
        .kernel
        .changelog(Some(&Identity::parse("myapp").unwrap()), None, None)
        .unwrap();
    assert_eq!(project_view.len(), 2);

    let stack_view = t
        .kernel
        .changelog(Some(&Identity::parse("myapp:api").unwrap()), None, None)
        .unwrap();
    assert_eq!(stack_view.len(), 1);
    assert_eq!(stack_view[0].summary, "deep fix");
}

#[test]
fn empty_summary_is_refused() {
    let t = kernel();
    assert!(t.kernel.record_change(&change("myapp", "")).is_err());
}

#[test]
fn type_filter() {
    let t = kernel();
    t.kernel.record_change(&change("myapp", "a fix")).unwrap();
    let mut feat = change("myapp", "a feature");
    feat.change_type = ChangeType::Feature;
    t.kernel.record_change(&feat).unwrap();

    let fixes = t
        .kernel
        .changelog(None, Some(ChangeType::Fix), None)
        .unwrap();
    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0].summary, "a fix");
}
