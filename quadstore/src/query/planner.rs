//! Pattern planner: match terms to an index range plus residual filters.
//!
//! # Index selection
//!
//! For each built-in index the planner counts how many leading key roles
//! are bound exactly. When a field carries range filters, the role right
//! after that prefix must be the range field; otherwise the index can only
//! serve the query if the range field leads its key (prefix length zero).
//! The index absorbing the most exact terms wins, ties going to registry
//! order. Exact terms that are not part of the chosen prefix become
//! residual equality filters.
//!
//! # Bounds
//!
//! With `prefix` the encoded index name and absorbed terms:
//!
//! | filter  | bound                                 |
//! |---------|---------------------------------------|
//! | none    | `[prefix, prefix + boundary]`         |
//! | `gte c` | lower `Included(prefix + c)`          |
//! | `gt c`  | lower `Excluded(prefix + c + boundary)` |
//! | `lt c`  | upper `Excluded(prefix + c)`          |
//! | `lte c` | upper `Included(prefix + c + boundary)` |
//!
//! `gt` and `lte` compare at prefix granularity: a stored term that starts
//! with the comparate counts as equal to it. This is what makes encoded
//! literal comparates (which stop before the lexical form) behave.

use std::ops::Bound;

use crate::config::StoreConfig;
use crate::index::{IndexDefinition, IndexRegistry, KeyBuilder};
use crate::types::{
    Match, MatchTerms, RangeFilter, RangeTest, Term, TermRole, UnsupportedFilter,
};

/// Reasons a query cannot be planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// More than one field carries range filters.
    MultipleRangeFields(Vec<TermRole>),
    /// Two lower (or two upper) bounds were given for the same field.
    ConflictingBounds { role: Option<TermRole>, test: RangeTest },
    /// An exact term or comparate is empty.
    EmptyTerm(TermRole),
    /// A term or comparate contains the key separator.
    SeparatorInTerm(TermRole),
    /// A range operator other than gt, gte, lt or lte.
    UnsupportedFilter(String),
    /// No built-in index can serve the pattern.
    NoUsableIndex,
}

impl std::fmt::Display for PlanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MultipleRangeFields(roles) => {
                let names: Vec<&str> = roles.iter().map(|role| role.as_str()).collect();
                write!(
                    f,
                    "range filters on more than one field: {}",
                    names.join(", ")
                )
            }
            Self::ConflictingBounds {
                role: Some(role),
                test,
            } => write!(f, "conflicting '{}' bound on {role}", test.as_str()),
            Self::ConflictingBounds { role: None, test } => {
                write!(f, "conflicting '{}' bound", test.as_str())
            }
            Self::EmptyTerm(role) => write!(f, "empty term for {role}"),
            Self::SeparatorInTerm(role) => write!(f, "{role} term contains the key separator"),
            Self::UnsupportedFilter(op) => write!(f, "unsupported filter '{op}'"),
            Self::NoUsableIndex => write!(f, "no index can serve this pattern"),
        }
    }
}

impl std::error::Error for PlanError {}

impl From<UnsupportedFilter> for PlanError {
    fn from(e: UnsupportedFilter) -> Self {
        Self::UnsupportedFilter(e.0)
    }
}

/// A planned scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    /// Name of the index to scan.
    pub index: String,
    pub lower: Bound<Vec<u8>>,
    pub upper: Bound<Vec<u8>>,
    /// Exact terms the index prefix could not absorb.
    pub residual: Vec<(TermRole, Term)>,
}

impl QueryPlan {
    /// Whether every constraint is enforced by the key range alone.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.residual.is_empty()
    }
}

/// Plans queries against the indexes of one store.
#[derive(Debug, Clone, Copy)]
pub struct Planner<'a> {
    registry: &'a IndexRegistry,
    config: &'a StoreConfig,
}

impl<'a> Planner<'a> {
    #[must_use]
    pub const fn new(registry: &'a IndexRegistry, config: &'a StoreConfig) -> Self {
        Self { registry, config }
    }

    /// Plan a pattern query.
    pub fn plan(&self, terms: &MatchTerms) -> Result<QueryPlan, PlanError> {
        let range = self.validate(terms)?;

        let mut best: Option<(&IndexDefinition, &[TermRole], usize)> = None;
        for index in self.registry.builtins() {
            let Some(roles) = index.roles() else {
                continue;
            };
            let Some(absorbed) = usable_prefix(terms, roles, range.map(|(role, _)| role)) else {
                continue;
            };
            if best.is_none_or(|(_, _, best_absorbed)| absorbed > best_absorbed) {
                best = Some((index, roles, absorbed));
            }
        }
        let (index, roles, absorbed) = best.ok_or(PlanError::NoUsableIndex)?;

        let mut builder = KeyBuilder::new(index.name(), &self.config.separator);
        for role in &roles[..absorbed] {
            if let Match::Exact(term) = terms.get(*role) {
                builder.push(term);
            }
        }

        let (lower, upper) = if absorbed == roles.len() {
            let key = builder.finish().into_bytes();
            (Bound::Included(key.clone()), Bound::Included(key))
        } else {
            let filters = range.map_or(&[][..], |(_, filters)| filters);
            let role = range.map(|(role, _)| role);
            self.bounds(&builder.prefix(), filters, role)?
        };

        let residual = TermRole::ALL
            .into_iter()
            .filter(|role| !roles[..absorbed].contains(role))
            .filter_map(|role| terms.get(role).as_exact().map(|term| (role, term.to_owned())))
            .collect();

        Ok(QueryPlan {
            index: index.name().to_owned(),
            lower,
            upper,
            residual,
        })
    }

    /// The range covering everything `terms` can match, range filters
    /// ignored. Used for size estimates.
    pub fn prefix_range(&self, terms: &MatchTerms) -> Result<QueryPlan, PlanError> {
        self.plan(&terms.without_ranges())
    }

    /// Bounds for a scan over a whole index, narrowed by `filters` relative
    /// to the index prefix.
    pub fn index_bounds(
        &self,
        index: &IndexDefinition,
        filters: &[RangeFilter],
    ) -> Result<(Bound<Vec<u8>>, Bound<Vec<u8>>), PlanError> {
        let prefix = KeyBuilder::new(index.name(), &self.config.separator).prefix();
        self.bounds(&prefix, filters, None)
    }

    fn bounds(
        &self,
        prefix: &str,
        filters: &[RangeFilter],
        role: Option<TermRole>,
    ) -> Result<(Bound<Vec<u8>>, Bound<Vec<u8>>), PlanError> {
        let boundary = &self.config.boundary;
        let mut lower = None;
        let mut upper = None;

        for filter in filters {
            let comparate = &filter.comparate;
            let bound = match filter.test {
                RangeTest::Gte => Bound::Included(format!("{prefix}{comparate}")),
                RangeTest::Gt => Bound::Excluded(format!("{prefix}{comparate}{boundary}")),
                RangeTest::Lt => Bound::Excluded(format!("{prefix}{comparate}")),
                RangeTest::Lte => Bound::Included(format!("{prefix}{comparate}{boundary}")),
            };
            let slot = if filter.test.is_lower() {
                &mut lower
            } else {
                &mut upper
            };
            if slot.is_some() {
                return Err(PlanError::ConflictingBounds {
                    role,
                    test: filter.test,
                });
            }
            *slot = Some(bound.map(String::into_bytes));
        }

        let lower = lower.unwrap_or_else(|| Bound::Included(prefix.as_bytes().to_vec()));
        let upper =
            upper.unwrap_or_else(|| Bound::Included(format!("{prefix}{boundary}").into_bytes()));
        Ok((lower, upper))
    }

    /// Check term contents and return the range field, if any.
    fn validate<'t>(
        &self,
        terms: &'t MatchTerms,
    ) -> Result<Option<(TermRole, &'t [RangeFilter])>, PlanError> {
        let separator = self.config.separator.as_str();
        let mut ranges = Vec::new();

        for role in TermRole::ALL {
            match terms.get(role) {
                Match::Unbound => {}
                Match::Exact(term) => check_term(role, term, separator)?,
                Match::Range(filters) => {
                    for filter in filters {
                        check_term(role, &filter.comparate, separator)?;
                    }
                    ranges.push((role, filters.as_slice()));
                }
            }
        }

        match ranges.len() {
            0 => Ok(None),
            1 => Ok(ranges.pop()),
            _ => Err(PlanError::MultipleRangeFields(
                ranges.into_iter().map(|(role, _)| role).collect(),
            )),
        }
    }
}

fn check_term(role: TermRole, term: &str, separator: &str) -> Result<(), PlanError> {
    if term.is_empty() {
        return Err(PlanError::EmptyTerm(role));
    }
    if term.contains(separator) {
        return Err(PlanError::SeparatorInTerm(role));
    }
    Ok(())
}

/// Number of leading `roles` an index can absorb, or `None` if it cannot
/// serve the range field.
fn usable_prefix(
    terms: &MatchTerms,
    roles: &[TermRole],
    range: Option<TermRole>,
) -> Option<usize> {
    let exact = roles
        .iter()
        .take_while(|role| terms.get(**role).as_exact().is_some())
        .count();
    match range {
        None => Some(exact),
        Some(range) if roles.get(exact) == Some(&range) => Some(exact),
        Some(range) if roles.first() == Some(&range) => Some(0),
        Some(_) => None,
    }
}
