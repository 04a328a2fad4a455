use super::*;
use std::collections::HashSet;

#[test]
fn uuid_gen_is_unique() {
    let gen = UuidIdGen;
    let ids: HashSet<String> = (0..100).map(|_| gen.next()).collect();
    assert_eq!(ids.len(), 100);
}

#[test]
fn sequential_gen_counts_up() {
    let gen = SequentialIdGen::new("sess");
    assert_eq!(gen.next(), "sess-1");
    assert_eq!(gen.next(), "sess-2");
    assert_eq!(gen.next(), "sess-3");
}

#[test]
fn sequential_clones_share_the_counter() {
    let gen = SequentialIdGen::new("s");
    let clone = gen.clone();
    assert_eq!(gen.next(), "s-1");
    assert_eq!(clone.next(), "s-2");
}
