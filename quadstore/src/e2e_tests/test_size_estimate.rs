//! Test the approximate size estimator.

use crate::config::StoreConfig;
use crate::e2e_tests::helpers::*;
use crate::types::{MatchTerms, RangeFilter};

fn small_records() -> StoreConfig {
    StoreConfig {
        record_size: 16,
        ..StoreConfig::default()
    }
}

#[test]
fn test_empty_store_is_zero() {
    let test = TestStore::new();
    assert_eq!(test.size(&MatchTerms::new()), 0);
}

#[test]
fn test_size_grows_with_writes() {
    let test = TestStore::with_config(small_records());
    let terms = MatchTerms::new().predicate("ex:p0");

    let mut previous = test.size(&terms);
    for chunk in grid_quads().chunks(6) {
        test.put(chunk).expect("put");
        let current = test.size(&terms);
        assert!(current >= previous, "{current} < {previous}");
        previous = current;
    }
    assert!(previous > 0);
}

#[test]
fn test_narrower_patterns_are_not_larger() {
    let test = TestStore::with_config(small_records());
    test.put(&grid_quads()).expect("put");

    let all = test.size(&MatchTerms::new());
    let subject = test.size(&MatchTerms::new().subject("ex:s0"));
    let subject_predicate = test.size(&MatchTerms::new().subject("ex:s0").predicate("ex:p0"));
    assert!(all >= subject);
    assert!(subject >= subject_predicate);
    assert!(subject_predicate > 0);
}

#[test]
fn test_range_filters_are_ignored() {
    let test = TestStore::with_config(small_records());
    test.put(&grid_quads()).expect("put");

    let plain = test.size(&MatchTerms::new().predicate("ex:p1"));
    let ranged = test.size(
        &MatchTerms::new()
            .predicate("ex:p1")
            .object_range(vec![RangeFilter::lt("ex:o1")]),
    );
    assert_eq!(plain, ranged);
}

#[test]
fn test_size_rejects_invalid_pattern() {
    let test = TestStore::new();
    let result = test.block_on(
        test.store.get_approximate_size(
            &MatchTerms::new()
                .subject_range(vec![RangeFilter::gt("a")])
                .object_range(vec![RangeFilter::gt("a")]),
        ),
    );
    assert!(result.is_err());
}
