//! Test replacing quads in one batch.

use crate::e2e_tests::helpers::*;
use crate::types::MatchTerms;

#[test]
fn test_patch_explicit_quads() {
    let test = TestStore::new();
    let old = quad("ex:s", "ex:status", "ex:draft", "ex:g");
    test.put(&[old.clone()]).expect("put");

    let new = quad("ex:s", "ex:status", "ex:published", "ex:g");
    test.patch(vec![old], &[new.clone()]).expect("patch");

    assert_eq!(test.get(&MatchTerms::new()), [new]);
    assert_eq!(test.entry_count(), 6);
}

#[test]
fn test_patch_by_pattern() {
    let test = TestStore::new();
    test.put(&grid_quads()).expect("put");

    let replacement = quad("ex:s0", "ex:summary", "ex:replaced", "ex:g0");
    test.patch(MatchTerms::new().subject("ex:s0"), &[replacement.clone()])
        .expect("patch");

    let remaining = test.get(&MatchTerms::new().subject("ex:s0"));
    assert_eq!(remaining, [replacement]);
    assert_eq!(test.get(&MatchTerms::new().subject("ex:s1")).len(), 12);
}

#[test]
fn test_delput_same_quad_keeps_it() {
    let test = TestStore::new();
    let stored = quad("ex:s", "ex:p", "ex:o", "ex:g");
    test.put(&[stored.clone()]).expect("put");

    test.block_on(test.store.delput(&[stored.clone()], &[stored.clone()]))
        .expect("delput");
    assert_eq!(test.get(&MatchTerms::new()), [stored]);
    assert_eq!(test.entry_count(), 6);
}

#[test]
fn test_getdelput_with_no_matches_only_puts() {
    let test = TestStore::new();
    let stored = quad("ex:s", "ex:p", "ex:o", "ex:g");

    test.block_on(
        test.store
            .getdelput(&MatchTerms::new().subject("ex:missing"), &[stored.clone()]),
    )
    .expect("getdelput");
    assert_eq!(test.get(&MatchTerms::new()), [stored]);
}
