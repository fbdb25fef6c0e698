//! Test custom index registration and ordering.

use crate::e2e_tests::helpers::*;
use crate::query::QueryOptions;
use crate::store::IndexQuery;
use crate::types::Quad;

fn by_object_length(quad: &Quad) -> String {
    format!("{:04}", quad.object.len())
}

#[test]
fn test_custom_index_orders_by_generated_key() {
    let mut test = TestStore::new();
    test.store
        .register_index("byObjectLength", by_object_length)
        .expect("register");

    let quads = vec![
        quad("ex:a", "ex:p", "ex:loooooong", "ex:g"),
        quad("ex:b", "ex:p", "ex:x", "ex:g"),
        quad("ex:c", "ex:p", "ex:mid", "ex:g"),
    ];
    test.put(&quads).expect("put");
    assert_eq!(test.entry_count(), quads.len() * 7);

    let found = test.by_index("byObjectLength", &IndexQuery::all());
    let subjects: Vec<&str> = found.iter().map(|q| q.subject.as_str()).collect();
    assert_eq!(subjects, ["ex:b", "ex:c", "ex:a"]);
}

#[test]
fn test_custom_index_bounds() {
    let mut test = TestStore::new();
    test.store
        .register_index("byObjectLength", by_object_length)
        .expect("register");
    let quads: Vec<Quad> = (1..=6)
        .map(|n| quad(&format!("ex:s{n}"), "ex:p", &"o".repeat(n), "ex:g"))
        .collect();
    test.put(&quads).expect("put");

    let query = IndexQuery {
        gte: Some("0002".to_owned()),
        lt: Some("0005".to_owned()),
        ..IndexQuery::default()
    };
    let lengths: Vec<usize> = test
        .by_index("byObjectLength", &query)
        .iter()
        .map(|q| q.object.len())
        .collect();
    assert_eq!(lengths, [2, 3, 4]);

    let query = IndexQuery {
        gt: Some("0002".to_owned()),
        options: QueryOptions::default().reverse().limit(2),
        ..IndexQuery::default()
    };
    let lengths: Vec<usize> = test
        .by_index("byObjectLength", &query)
        .iter()
        .map(|q| q.object.len())
        .collect();
    assert_eq!(lengths, [6, 5]);
}

#[test]
fn test_equal_generated_keys_do_not_collide() {
    let mut test = TestStore::new();
    test.store
        .register_index("constant", |_| "k".to_owned())
        .expect("register");
    test.put(&grid_quads()).expect("put");

    let found = test.by_index("constant", &IndexQuery::all());
    assert_eq!(sorted(found), sorted(grid_quads()));
}

#[test]
fn test_delete_removes_custom_entries() {
    let mut test = TestStore::new();
    test.store
        .register_index("byObjectLength", by_object_length)
        .expect("register");
    let stored = quad("ex:s", "ex:p", "ex:o", "ex:g");
    test.put(&[stored.clone()]).expect("put");
    test.del(stored).expect("del");

    assert_eq!(test.entry_count(), 0);
    assert!(test.by_index("byObjectLength", &IndexQuery::all()).is_empty());
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mut test = TestStore::new();
    test.store
        .register_index("byObjectLength", by_object_length)
        .expect("register");

    let err = test
        .store
        .register_index("byObjectLength", by_object_length)
        .err()
        .expect("duplicate should fail");
    assert!(err.to_string().contains("already registered"));

    let err = test
        .store
        .register_index("GSP", by_object_length)
        .err()
        .expect("built-in name should fail");
    assert!(err.to_string().contains("already registered"));
    assert_eq!(test.store.indexes().count(), 7);
}

#[test]
fn test_name_overlapping_builtin_range_is_rejected() {
    let mut test = TestStore::new();
    let err = test
        .store
        .register_index("SPOG\u{0}", by_object_length)
        .err()
        .expect("separator character should fail");
    assert!(err.to_string().contains("key separator"));

    test.put(&[quad("ex:s", "ex:p", "ex:o", "ex:g")]).expect("put");
    assert_eq!(test.get(&crate::types::MatchTerms::new()).len(), 1);
    assert_eq!(test.entry_count(), 6);
}
