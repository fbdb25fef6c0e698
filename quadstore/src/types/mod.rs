//! Core data types shared by every layer of the store.

mod match_terms;
mod quad;

pub use match_terms::{Match, MatchTerms, RangeFilter, RangeTest, UnsupportedFilter};
pub use quad::{Quad, Term, TermRole};
