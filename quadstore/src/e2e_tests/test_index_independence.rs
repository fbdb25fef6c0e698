//! Test that results do not depend on which index serves a pattern.

use proptest::prelude::*;

use crate::e2e_tests::helpers::*;
use crate::store::IndexQuery;
use crate::types::{Match, MatchTerms, Quad, RangeFilter, RangeTest, TermRole};

const fn term_prefix(role: TermRole) -> &'static str {
    match role {
        TermRole::Subject => "ex:s",
        TermRole::Predicate => "ex:p",
        TermRole::Object => "ex:o",
        TermRole::Context => "ex:g",
    }
}

/// Unbound, or bound to one of the role's first two grid values.
fn choices(role: TermRole) -> Vec<Match> {
    let prefix = term_prefix(role);
    vec![
        Match::Unbound,
        Match::Exact(format!("{prefix}0")),
        Match::Exact(format!("{prefix}1")),
    ]
}

/// Every combination of `choices` over `roles`, starting from `base`.
fn expand(base: MatchTerms, roles: impl IntoIterator<Item = TermRole>) -> Vec<MatchTerms> {
    let mut patterns = vec![base];
    for role in roles {
        patterns = patterns
            .into_iter()
            .flat_map(|terms| {
                choices(role)
                    .into_iter()
                    .map(move |choice| terms.clone().with(role, choice))
            })
            .collect();
    }
    patterns
}

/// Every pattern over the grid's vocabulary.
fn patterns() -> Vec<MatchTerms> {
    expand(MatchTerms::new(), TermRole::ALL)
}

/// Range filter sets over a role's grid values. Grid terms never extend
/// one another, so plain string comparison gives the expected order.
fn filter_sets(role: TermRole) -> Vec<Vec<RangeFilter>> {
    let prefix = term_prefix(role);
    vec![
        vec![RangeFilter::gt(format!("{prefix}0"))],
        vec![
            RangeFilter::gte(format!("{prefix}1")),
            RangeFilter::lte(format!("{prefix}2")),
        ],
        vec![RangeFilter::lt(format!("{prefix}1"))],
    ]
}

fn in_range(term: &str, filters: &[RangeFilter]) -> bool {
    filters.iter().all(|filter| {
        let comparate = filter.comparate.as_str();
        match filter.test {
            RangeTest::Gt => term > comparate,
            RangeTest::Gte => term >= comparate,
            RangeTest::Lt => term < comparate,
            RangeTest::Lte => term <= comparate,
        }
    })
}

#[test]
fn test_every_pattern_matches_brute_force() {
    let test = TestStore::new();
    let quads = grid_quads();
    test.put(&quads).expect("put");

    let patterns = patterns();
    assert_eq!(patterns.len(), 81);
    for terms in &patterns {
        let found = sorted(test.get(terms));
        assert_eq!(found, brute_force(&quads, terms), "pattern {terms:?}");
    }
}

#[test]
fn test_every_range_pattern_matches_brute_force() {
    let test = TestStore::new();
    let quads = grid_quads();
    test.put(&quads).expect("put");

    let mut checked = 0;
    for range_role in TermRole::ALL {
        for filters in filter_sets(range_role) {
            let base = MatchTerms::new().with(range_role, Match::Range(filters.clone()));
            let others = TermRole::ALL.into_iter().filter(|role| *role != range_role);
            for terms in expand(base, others) {
                let expected: Vec<Quad> = brute_force(&quads, &terms)
                    .into_iter()
                    .filter(|quad| in_range(quad.term(range_role), &filters))
                    .collect();
                let found = sorted(test.get(&terms));
                assert_eq!(found, expected, "pattern {terms:?}");
                checked += 1;
            }
        }
    }
    assert_eq!(checked, 4 * 3 * 27);
}

#[test]
fn test_every_index_holds_every_quad() {
    let test = TestStore::new();
    let quads = grid_quads();
    test.put(&quads).expect("put");

    for index in ["SPOG", "POG", "OGS", "GSP", "GP", "OS"] {
        let found = sorted(test.by_index(index, &IndexQuery::all()));
        assert_eq!(found, sorted(quads.clone()), "index {index}");
    }
}

fn arb_quad() -> impl Strategy<Value = Quad> {
    (0..3u8, 0..3u8, 0..3u8, 0..2u8).prop_map(|(s, p, o, g)| {
        quad(
            &format!("ex:s{s}"),
            &format!("ex:p{p}"),
            &format!("ex:o{o}"),
            &format!("ex:g{g}"),
        )
    })
}

fn arb_match(prefix: &'static str, values: u8) -> impl Strategy<Value = Match> {
    prop_oneof![
        Just(Match::Unbound),
        (0..values).prop_map(move |v| Match::Exact(format!("{prefix}{v}"))),
    ]
}

fn arb_terms() -> impl Strategy<Value = MatchTerms> {
    (
        arb_match("ex:s", 3),
        arb_match("ex:p", 3),
        arb_match("ex:o", 3),
        arb_match("ex:g", 2),
    )
        .prop_map(|(subject, predicate, object, context)| MatchTerms {
            subject,
            predicate,
            object,
            context,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_stores_match_brute_force(
        quads in prop::collection::vec(arb_quad(), 0..30),
        terms in arb_terms(),
    ) {
        let test = TestStore::new();
        test.put(&quads).expect("put");

        let found = sorted(test.get(&terms));
        let mut expected = brute_force(&quads, &terms);
        expected.dedup();
        prop_assert_eq!(found, expected);
    }
}
