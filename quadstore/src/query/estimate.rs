//! Size estimation.
//!
//! Counts are derived from the backend's byte estimate for the prefix range
//! of a pattern, divided by an average record size. Range filters are
//! ignored, so the estimate bounds the true count from above (up to the
//! backend's own accuracy).

use std::ops::Bound;

use super::planner::QueryPlan;

/// Convert a byte size into an approximate record count, rounding to the
/// nearest whole record.
#[must_use]
pub const fn approximate_count(bytes: u64, record_size: u64) -> u64 {
    if record_size == 0 {
        return 0;
    }
    bytes.saturating_add(record_size / 2) / record_size
}

/// Inclusive byte bounds of a prefix plan.
///
/// Prefix plans only ever carry inclusive bounds; anything else yields
/// `None`.
#[must_use]
pub fn inclusive_bounds(plan: &QueryPlan) -> Option<(&[u8], &[u8])> {
    match (&plan.lower, &plan.upper) {
        (Bound::Included(lower), Bound::Included(upper)) => {
            Some((lower.as_slice(), upper.as_slice()))
        }
        _ => None,
    }
}
