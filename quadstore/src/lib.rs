// Life of a write:
// 1. Quads come in; empty contexts get the default context
// 2. Every quad is keyed once per registered index
// 3. Deletes then puts go to the backend as one atomic batch
//
// Life of a read:
// 1. Match terms are planned onto one index range + residual filters
// 2. The backend scan is decoded, filtered, offset, and limited lazily
//
// System components:
//  - Ordered KV backend (memory, or memory + append-only log)
//  - Index registry and key encoder
//  - Planner and streaming executor

//! A quad store over an ordered key-value backend.
//!
//! Each quad is written to six permutation indexes (plus any custom ones),
//! so any pattern of bound terms is served by one contiguous range scan.
//!
//! ```no_run
//! use quadstore::{MatchTerms, MemoryBackend, QueryOptions, Quad, QuadStore, StoreConfig};
//!
//! # async fn demo() -> Result<(), quadstore::StoreError> {
//! let store = QuadStore::new(MemoryBackend::new(), StoreConfig::default())?;
//! store.put(&[Quad::new("ex:s", "ex:p", "ex:o", "ex:g")]).await?;
//! let quads = store
//!     .get(&MatchTerms::new().predicate("ex:p"), &QueryOptions::default())
//!     .await?;
//! assert_eq!(quads.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod codec;
pub mod config;
mod error;
pub mod index;
pub mod query;
mod store;
pub mod types;

#[cfg(test)]
mod e2e_tests;

pub use backend::{Backend, BackendError, LogBackend, MemoryBackend, WriteOptions};
pub use config::{ConfigError, StoreConfig};
pub use error::StoreError;
pub use query::{QuadStream, QueryOptions};
pub use store::{IndexQuery, QuadStore, Target};
pub use types::{Match, MatchTerms, Quad, RangeFilter, RangeTest, Term, TermRole};
