//! Test that deletes remove every index entry.

use crate::e2e_tests::helpers::*;
use crate::types::{MatchTerms, Quad};

#[test]
fn test_delete_quad_removes_all_entries() {
    let test = TestStore::new();
    let quads = grid_quads();
    test.put(&quads).expect("put");

    let victim = quads[5].clone();
    test.del(victim.clone()).expect("del");

    assert_eq!(test.entry_count(), (quads.len() - 1) * 6);
    assert!(test.get(&MatchTerms::from_quad(&victim)).is_empty());
    for index in test.store.indexes() {
        let remaining = test.by_index(index.name(), &crate::store::IndexQuery::all());
        assert!(!remaining.contains(&victim), "{} still has it", index.name());
    }
}

#[test]
fn test_delete_by_pattern() {
    let test = TestStore::new();
    let quads = grid_quads();
    test.put(&quads).expect("put");

    test.del(MatchTerms::new().predicate("ex:p1")).expect("del");

    let expected: Vec<Quad> = quads
        .iter()
        .filter(|q| q.predicate != "ex:p1")
        .cloned()
        .collect();
    assert_eq!(test.get(&MatchTerms::new()), sorted(expected.clone()));
    assert_eq!(test.entry_count(), expected.len() * 6);
}

#[test]
fn test_delete_everything() {
    let test = TestStore::new();
    test.put(&grid_quads()).expect("put");
    test.del(MatchTerms::new()).expect("del");
    assert_eq!(test.entry_count(), 0);
}

#[test]
fn test_delete_missing_quad_is_noop() {
    let test = TestStore::new();
    let stored = quad("ex:s", "ex:p", "ex:o", "ex:g");
    test.put(&[stored.clone()]).expect("put");

    test.del(quad("ex:s", "ex:p", "ex:other", "ex:g"))
        .expect("del");
    assert_eq!(test.get(&MatchTerms::new()), [stored]);
}
