//! Test that offset/limit pages tile the full result.

use crate::e2e_tests::helpers::*;
use crate::query::QueryOptions;
use crate::types::{MatchTerms, Quad, RangeFilter};

fn pages(test: &TestStore, terms: &MatchTerms, page_size: usize) -> Vec<Quad> {
    let mut collected = Vec::new();
    let mut offset = 0;
    loop {
        let options = QueryOptions::default().offset(offset).limit(page_size);
        let page = test.get_with(terms, &options).expect("page");
        assert!(page.len() <= page_size);
        if page.is_empty() {
            break;
        }
        offset += page.len();
        collected.extend(page);
    }
    collected
}

#[test]
fn test_pages_tile_index_only_result() {
    let test = TestStore::new();
    test.put(&grid_quads()).expect("put");

    let terms = MatchTerms::new().predicate("ex:p0");
    let full = test.get(&terms);
    assert_eq!(full.len(), 18);
    for page_size in [1, 4, 7, 18, 50] {
        assert_eq!(pages(&test, &terms, page_size), full, "page size {page_size}");
    }
}

#[test]
fn test_pages_tile_filtered_result() {
    let test = TestStore::new();
    test.put(&grid_quads()).expect("put");

    // The subject cannot join the context range in any key, so it is
    // checked after the scan.
    let terms = MatchTerms::new()
        .subject("ex:s2")
        .context_range(vec![RangeFilter::gte("ex:g")]);
    let full = test.get(&terms);
    assert_eq!(full.len(), 12);
    assert!(full.iter().all(|q| q.subject == "ex:s2"));
    for page_size in [1, 5, 12] {
        assert_eq!(pages(&test, &terms, page_size), full, "page size {page_size}");
    }
}

#[test]
fn test_offset_past_end_is_empty() {
    let test = TestStore::new();
    test.put(&grid_quads()).expect("put");

    let options = QueryOptions::default().offset(100);
    let page = test
        .get_with(&MatchTerms::new(), &options)
        .expect("get");
    assert!(page.is_empty());
}

#[test]
fn test_limit_zero_is_empty() {
    let test = TestStore::new();
    test.put(&grid_quads()).expect("put");

    let options = QueryOptions::default().limit(0);
    let page = test
        .get_with(&MatchTerms::new(), &options)
        .expect("get");
    assert!(page.is_empty());
}
