//! Match terms: the per-field constraints of a pattern query.

use std::str::FromStr;

use super::quad::{Quad, Term, TermRole};

/// A bound comparison used in a range filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeTest {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl RangeTest {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
        }
    }

    /// Whether this test constrains the lower end of the range.
    #[must_use]
    pub const fn is_lower(self) -> bool {
        matches!(self, Self::Gt | Self::Gte)
    }
}

/// Error returned when parsing an unknown range operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedFilter(pub String);

impl std::fmt::Display for UnsupportedFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported filter '{}' (expected one of gt, gte, lt, lte)",
            self.0
        )
    }
}

impl std::error::Error for UnsupportedFilter {}

impl FromStr for RangeTest {
    type Err = UnsupportedFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Gte),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Lte),
            other => Err(UnsupportedFilter(other.to_owned())),
        }
    }
}

/// One bound of a range filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeFilter {
    pub test: RangeTest,
    pub comparate: Term,
}

impl RangeFilter {
    pub fn new(test: RangeTest, comparate: impl Into<Term>) -> Self {
        Self {
            test,
            comparate: comparate.into(),
        }
    }

    pub fn gt(comparate: impl Into<Term>) -> Self {
        Self::new(RangeTest::Gt, comparate)
    }

    pub fn gte(comparate: impl Into<Term>) -> Self {
        Self::new(RangeTest::Gte, comparate)
    }

    pub fn lt(comparate: impl Into<Term>) -> Self {
        Self::new(RangeTest::Lt, comparate)
    }

    pub fn lte(comparate: impl Into<Term>) -> Self {
        Self::new(RangeTest::Lte, comparate)
    }
}

/// The constraint on a single quad field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Match {
    /// Any value matches.
    #[default]
    Unbound,
    /// Only this exact term matches.
    Exact(Term),
    /// Values within the bounds match. An empty list spans the whole domain.
    Range(Vec<RangeFilter>),
}

impl Match {
    #[must_use]
    pub const fn is_unbound(&self) -> bool {
        matches!(self, Self::Unbound)
    }

    #[must_use]
    pub fn as_exact(&self) -> Option<&str> {
        match self {
            Self::Exact(term) => Some(term),
            _ => None,
        }
    }
}

/// Per-field constraints for a pattern query.
///
/// Built fluently:
///
/// ```
/// use quadstore::types::{MatchTerms, RangeFilter};
///
/// let terms = MatchTerms::new()
///     .subject("http://ex.com/s")
///     .object_range(vec![RangeFilter::gte("a"), RangeFilter::lt("m")]);
/// assert!(terms.predicate.is_unbound());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchTerms {
    pub subject: Match,
    pub predicate: Match,
    pub object: Match,
    pub context: Match,
}

impl MatchTerms {
    /// Match terms binding nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Match terms binding all four fields of `quad` exactly.
    #[must_use]
    pub fn from_quad(quad: &Quad) -> Self {
        Self {
            subject: Match::Exact(quad.subject.clone()),
            predicate: Match::Exact(quad.predicate.clone()),
            object: Match::Exact(quad.object.clone()),
            context: Match::Exact(quad.context.clone()),
        }
    }

    #[must_use]
    pub fn subject(mut self, term: impl Into<Term>) -> Self {
        self.subject = Match::Exact(term.into());
        self
    }

    #[must_use]
    pub fn predicate(mut self, term: impl Into<Term>) -> Self {
        self.predicate = Match::Exact(term.into());
        self
    }

    #[must_use]
    pub fn object(mut self, term: impl Into<Term>) -> Self {
        self.object = Match::Exact(term.into());
        self
    }

    #[must_use]
    pub fn context(mut self, term: impl Into<Term>) -> Self {
        self.context = Match::Exact(term.into());
        self
    }

    #[must_use]
    pub fn subject_range(mut self, filters: Vec<RangeFilter>) -> Self {
        self.subject = Match::Range(filters);
        self
    }

    #[must_use]
    pub fn predicate_range(mut self, filters: Vec<RangeFilter>) -> Self {
        self.predicate = Match::Range(filters);
        self
    }

    #[must_use]
    pub fn object_range(mut self, filters: Vec<RangeFilter>) -> Self {
        self.object = Match::Range(filters);
        self
    }

    #[must_use]
    pub fn context_range(mut self, filters: Vec<RangeFilter>) -> Self {
        self.context = Match::Range(filters);
        self
    }

    /// Set the constraint for `role`.
    #[must_use]
    pub fn with(mut self, role: TermRole, constraint: Match) -> Self {
        match role {
            TermRole::Subject => self.subject = constraint,
            TermRole::Predicate => self.predicate = constraint,
            TermRole::Object => self.object = constraint,
            TermRole::Context => self.context = constraint,
        }
        self
    }

    /// Borrow the constraint for `role`.
    #[must_use]
    pub const fn get(&self, role: TermRole) -> &Match {
        match role {
            TermRole::Subject => &self.subject,
            TermRole::Predicate => &self.predicate,
            TermRole::Object => &self.object,
            TermRole::Context => &self.context,
        }
    }

    /// The same constraints with every range replaced by `Unbound`.
    #[must_use]
    pub fn without_ranges(&self) -> Self {
        let strip = |constraint: &Match| match constraint {
            Match::Range(_) => Match::Unbound,
            other => other.clone(),
        };
        Self {
            subject: strip(&self.subject),
            predicate: strip(&self.predicate),
            object: strip(&self.object),
            context: strip(&self.context),
        }
    }

    /// Whether every exactly-bound field equals the corresponding quad field.
    ///
    /// Range constraints are ignored; this is the in-memory equality test,
    /// not a replacement for the planner.
    #[must_use]
    pub fn matches_exact(&self, quad: &Quad) -> bool {
        TermRole::ALL.iter().all(|role| {
            self.get(*role)
                .as_exact()
                .is_none_or(|term| quad.term(*role) == term)
        })
    }
}
