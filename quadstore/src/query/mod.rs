//! Query planning and execution.
//!
//! - `planner`: match terms to an index range and residual filters
//! - `executor`: the pull-based scan pipeline
//! - `estimate`: byte sizes to approximate counts

mod estimate;
mod executor;
mod planner;

pub use estimate::{approximate_count, inclusive_bounds};
pub use executor::{QueryOptions, QuadStream, execute};
pub use planner::{PlanError, Planner, QueryPlan};
