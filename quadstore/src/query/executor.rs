//! Streaming executor.
//!
//! A query runs as a pull-based pipeline over one backend scan:
//!
//! ```text
//! scan -> decode -> residual filter -> offset skip -> limit
//! ```
//!
//! Nothing is read ahead of demand beyond the backend's own chunking, and
//! dropping the stream drops the scan cursor. The first error is yielded and
//! ends the stream.

use futures::future;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};

use crate::backend::BackendError;
use crate::codec;
use crate::error::StoreError;
use crate::types::{Quad, Term, TermRole};

/// A stream of quads produced by a query.
pub type QuadStream = BoxStream<'static, Result<Quad, StoreError>>;

/// Paging and ordering options for a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Maximum number of quads to return.
    pub limit: Option<usize>,
    /// Number of matching quads to skip.
    pub offset: usize,
    /// Return quads in descending index order.
    pub reverse: bool,
}

impl QueryOptions {
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub const fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// The limit to hand to the backend.
    ///
    /// Only safe to push down when every yielded value is a match; the
    /// offset is skipped after the scan so it widens the limit.
    #[must_use]
    pub fn backend_limit(&self, exact: bool) -> Option<usize> {
        if exact {
            self.limit.map(|limit| limit.saturating_add(self.offset))
        } else {
            None
        }
    }
}

/// Run the pipeline over `values`, the raw output of a backend scan.
pub fn execute(
    values: BoxStream<'static, Result<Vec<u8>, BackendError>>,
    residual: Vec<(TermRole, Term)>,
    options: &QueryOptions,
) -> QuadStream {
    let offset = options.offset;
    let mut skipped = 0;

    let quads = values
        .map_err(StoreError::from)
        .and_then(|bytes| future::ready(codec::decode_quad(&bytes).map_err(StoreError::from)))
        .try_filter(move |quad| {
            let keep = residual
                .iter()
                .all(|(role, term)| quad.term(*role) == term.as_str());
            future::ready(keep)
        })
        .try_filter(move |_| {
            let keep = skipped >= offset;
            if !keep {
                skipped += 1;
            }
            future::ready(keep)
        })
        .scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            *failed = item.is_err();
            future::ready(Some(item))
        });

    match options.limit {
        Some(limit) => quads.take(limit).boxed(),
        None => quads.boxed(),
    }
}
