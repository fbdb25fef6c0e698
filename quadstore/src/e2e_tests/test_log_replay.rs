//! Test that a log-backed store survives a reopen.

use crate::e2e_tests::helpers::*;
use crate::store::IndexQuery;
use crate::types::MatchTerms;

#[test]
fn test_reopen_restores_quads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("quads.log");
    let quads = grid_quads();

    {
        let test = TestStore::open_log(&path);
        test.put(&quads).expect("put");
        test.del(MatchTerms::new().context("ex:g1")).expect("del");
        test.block_on(test.store.close()).expect("close");
    }

    let test = TestStore::open_log(&path);
    let expected: Vec<_> = quads
        .iter()
        .filter(|q| q.context == "ex:g0")
        .cloned()
        .collect();
    assert_eq!(test.get(&MatchTerms::new()), sorted(expected.clone()));
    for index in ["POG", "OS", "GP"] {
        assert_eq!(
            sorted(test.by_index(index, &IndexQuery::all())),
            sorted(expected.clone()),
            "index {index}"
        );
    }
}

#[test]
fn test_reopen_without_close_keeps_acknowledged_writes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("quads.log");
    let stored = quad("ex:s", "ex:p", "ex:o", "ex:g");

    {
        let test = TestStore::open_log(&path);
        test.put(&[stored.clone()]).expect("put");
    }

    let test = TestStore::open_log(&path);
    assert_eq!(test.get(&MatchTerms::new()), [stored]);
}

#[test]
fn test_closed_store_rejects_writes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let test = TestStore::open_log(&dir.path().join("quads.log"));
    test.block_on(test.store.close()).expect("close");
    assert!(test.put(&grid_quads()).is_err());
}
