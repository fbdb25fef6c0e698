//! Test that written quads read back unchanged.

use crate::e2e_tests::helpers::*;
use crate::types::MatchTerms;

#[test]
fn test_put_then_get_by_exact_quad() {
    let test = TestStore::new();
    let stored = quad("ex:alice", "ex:knows", "ex:bob", "ex:social");
    test.put(&[stored.clone()]).expect("put");

    let found = test.get(&MatchTerms::from_quad(&stored));
    assert_eq!(found, [stored]);
}

#[test]
fn test_put_is_idempotent() {
    let test = TestStore::new();
    let stored = quad("ex:s", "ex:p", "ex:o", "ex:g");
    test.put(&[stored.clone()]).expect("put");
    test.put(&[stored.clone()]).expect("put again");

    assert_eq!(test.get(&MatchTerms::new()), [stored]);
    assert_eq!(test.entry_count(), 6);
}

#[test]
fn test_unbound_get_returns_everything_in_spog_order() {
    let test = TestStore::new();
    let quads = grid_quads();
    test.put(&quads).expect("put");

    assert_eq!(test.get(&MatchTerms::new()), sorted(quads.clone()));
    assert_eq!(test.entry_count(), quads.len() * 6);
}

#[test]
fn test_literal_terms_round_trip() {
    let test = TestStore::new();
    let stored = quad("ex:s", "ex:age", &integer_term(42), "ex:g");
    test.put(&[stored.clone()]).expect("put");

    let found = test.get(&MatchTerms::new().predicate("ex:age"));
    assert_eq!(found, [stored.clone()]);

    let literal = crate::codec::Literal::from_term(&found[0].object)
        .expect("decode")
        .expect("literal");
    assert_eq!(literal.value, "42");
}

#[test]
fn test_reverse_order() {
    let test = TestStore::new();
    let quads = grid_quads();
    test.put(&quads).expect("put");

    let terms = MatchTerms::new().subject("ex:s1");
    let forward = test.get(&terms);
    let mut backward = test
        .get_with(&terms, &crate::query::QueryOptions::default().reverse())
        .expect("reverse get");
    backward.reverse();
    assert_eq!(forward, backward);
}
