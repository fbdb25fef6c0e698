//! Test range filters over encoded literals and plain terms.

use crate::e2e_tests::helpers::*;
use crate::codec::Literal;
use crate::query::QueryOptions;
use crate::types::{MatchTerms, Quad, RangeFilter};

fn numbered(values: impl IntoIterator<Item = i64>) -> Vec<Quad> {
    values
        .into_iter()
        .map(|i| quad(&format!("ex:s{i}"), "ex:value", &integer_term(i), "ex:g"))
        .collect()
}

fn values(quads: &[Quad]) -> Vec<String> {
    quads
        .iter()
        .map(|q| {
            Literal::from_term(&q.object)
                .expect("decode")
                .expect("literal")
                .value
        })
        .collect()
}

#[test]
fn test_gte_and_lt_select_ascending_slice() {
    let test = TestStore::new();
    test.put(&numbered(0..=6)).expect("put");

    let terms = MatchTerms::new().predicate("ex:value").object_range(vec![
        RangeFilter::gte(integer_comparate(0)),
        RangeFilter::lt(integer_comparate(4)),
    ]);
    assert_eq!(values(&test.get(&terms)), ["0", "1", "2", "3"]);
}

#[test]
fn test_gt_and_lte_are_exclusive_and_inclusive() {
    let test = TestStore::new();
    test.put(&numbered(0..=6)).expect("put");

    let terms = MatchTerms::new().object_range(vec![
        RangeFilter::gt(integer_comparate(1)),
        RangeFilter::lte(integer_comparate(4)),
    ]);
    assert_eq!(values(&test.get(&terms)), ["2", "3", "4"]);
}

#[test]
fn test_negative_values_order() {
    let test = TestStore::new();
    test.put(&numbered(-3..3)).expect("put");

    let terms = MatchTerms::new()
        .predicate("ex:value")
        .object_range(vec![RangeFilter::lt(integer_comparate(1))]);
    assert_eq!(values(&test.get(&terms)), ["-3", "-2", "-1", "0"]);
}

#[test]
fn test_decimal_between_integers() {
    let test = TestStore::new();
    let mut quads = numbered(0..4);
    quads.push(quad(
        "ex:half",
        "ex:value",
        &Literal::decimal(1.5).to_term().expect("encode"),
        "ex:g",
    ));
    test.put(&quads).expect("put");

    let terms = MatchTerms::new().predicate("ex:value").object_range(vec![
        RangeFilter::gt(integer_comparate(1)),
        RangeFilter::lt(integer_comparate(3)),
    ]);
    assert_eq!(values(&test.get(&terms)), ["1.5", "2"]);
}

#[test]
fn test_range_in_reverse() {
    let test = TestStore::new();
    test.put(&numbered(0..=6)).expect("put");

    let terms = MatchTerms::new()
        .predicate("ex:value")
        .object_range(vec![RangeFilter::gte(integer_comparate(2))]);
    let options = QueryOptions::default().reverse().limit(2);
    let found = test.get_with(&terms, &options).expect("get");
    assert_eq!(values(&found), ["6", "5"]);
}

#[test]
fn test_datetime_range() {
    let test = TestStore::new();
    let dates = ["2020-01-01T00:00:00Z", "2021-06-15T12:30:00Z", "2023-03-01"];
    let quads: Vec<Quad> = dates
        .iter()
        .map(|date| {
            let term = if date.len() == 10 {
                Literal::typed(*date, format!("{}date", crate::codec::XSD))
            } else {
                Literal::datetime(*date)
            };
            quad(date, "ex:at", &term.to_term().expect("encode"), "ex:g")
        })
        .collect();
    test.put(&quads).expect("put");

    let since = Literal::datetime("2021-01-01T00:00:00Z")
        .comparate()
        .expect("comparate");
    let terms = MatchTerms::new()
        .predicate("ex:at")
        .object_range(vec![RangeFilter::gte(since)]);
    let subjects: Vec<String> = test.get(&terms).into_iter().map(|q| q.subject).collect();
    assert_eq!(subjects, ["2021-06-15T12:30:00Z", "2023-03-01"]);
}

#[test]
fn test_plain_term_range() {
    let test = TestStore::new();
    let quads: Vec<Quad> = ["apple", "banana", "cherry", "date"]
        .iter()
        .map(|fruit| quad(&format!("ex:{fruit}"), "ex:a", "ex:Fruit", "ex:g"))
        .collect();
    test.put(&quads).expect("put");

    let terms = MatchTerms::new()
        .subject_range(vec![RangeFilter::gte("ex:b"), RangeFilter::lt("ex:d")]);
    let subjects: Vec<String> = test.get(&terms).into_iter().map(|q| q.subject).collect();
    assert_eq!(subjects, ["ex:banana", "ex:cherry"]);
}

#[test]
fn test_unsupported_operator_fails_at_planning() {
    let err = "between"
        .parse::<crate::types::RangeTest>()
        .map_err(crate::error::StoreError::from)
        .expect_err("unknown operator");
    assert!(matches!(
        err,
        crate::error::StoreError::Plan(crate::query::PlanError::UnsupportedFilter(ref op))
            if op == "between"
    ));
}
