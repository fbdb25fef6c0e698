//! Ordered key-value backends.
//!
//! The store needs four things from the layer below it: ordered range scans
//! over byte keys, atomic multi-key batches, an estimate of the bytes held in
//! a key range, and a way to release resources. The `Backend` trait captures
//! exactly that, so the store can run against the in-memory map in tests and
//! the log-backed map in the binary.
//!
//! # Invariants
//!
//! - A batch is applied entirely or not at all.
//! - Scans yield values in key order (descending when `reverse`).
//! - After `close()` every operation fails with `BackendError::Closed`.

mod log;
mod memory;

use std::future::Future;
use std::ops::Bound;

use futures::stream::BoxStream;

pub use log::LogBackend;
pub use memory::{FaultConfig, MemoryBackend};

/// One write in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Del { key: Vec<u8> },
}

impl BatchOp {
    #[must_use]
    pub fn key(&self) -> &[u8] {
        match self {
            Self::Put { key, .. } | Self::Del { key } => key,
        }
    }
}

/// Options applied to a batch write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Make the batch durable before reporting success.
    pub sync: bool,
}

/// A key range to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    pub lower: Bound<Vec<u8>>,
    pub upper: Bound<Vec<u8>>,
    /// Maximum number of values to yield.
    pub limit: Option<usize>,
    /// Yield values in descending key order.
    pub reverse: bool,
}

impl RangeQuery {
    /// An unlimited forward scan over `[lower, upper]`.
    #[must_use]
    pub const fn inclusive(lower: Vec<u8>, upper: Vec<u8>) -> Self {
        Self {
            lower: Bound::Included(lower),
            upper: Bound::Included(upper),
            limit: None,
            reverse: false,
        }
    }

    /// Whether the bounds admit no key at all.
    ///
    /// Inverted bounds are legal input and simply scan nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Bound::Included(lower), Bound::Included(upper)) => lower > upper,
            (
                Bound::Included(lower) | Bound::Excluded(lower),
                Bound::Included(upper) | Bound::Excluded(upper),
            ) => lower >= upper,
            _ => false,
        }
    }
}

/// Errors reported by a backend.
#[derive(Debug)]
pub enum BackendError {
    /// I/O error.
    Io(std::io::Error),
    /// Injected fault for simulation.
    InjectedFault(String),
    /// Persistent data failed validation.
    Corruption(String),
    /// The backend has been closed.
    Closed,
    /// A lock was poisoned by a panicking writer.
    LockPoisoned,
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InjectedFault(msg) => write!(f, "injected fault: {msg}"),
            Self::Corruption(msg) => write!(f, "corruption detected: {msg}"),
            Self::Closed => write!(f, "backend is closed"),
            Self::LockPoisoned => write!(f, "backend lock poisoned"),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// An ordered byte-keyed store.
pub trait Backend: Send + Sync + 'static {
    /// Stream the values stored in `query`'s range.
    ///
    /// The stream owns its cursor; dropping it early releases the cursor.
    fn scan(&self, query: &RangeQuery) -> BoxStream<'static, Result<Vec<u8>, BackendError>>;

    /// Apply every operation atomically.
    fn batch(
        &self,
        ops: Vec<BatchOp>,
        options: WriteOptions,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Approximate number of bytes stored for keys in `[lower, upper]`.
    fn approximate_size(
        &self,
        lower: &[u8],
        upper: &[u8],
    ) -> impl Future<Output = Result<u64, BackendError>> + Send;

    /// Release resources. Further calls fail.
    fn close(&self) -> impl Future<Output = Result<(), BackendError>> + Send;
}
