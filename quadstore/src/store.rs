//! The quad store.
//!
//! `QuadStore` ties the pieces together: writes fan each quad out to every
//! registered index in one atomic backend batch, and reads plan a pattern
//! onto a single index range and stream the matches back.
//!
//! # Invariants
//!
//! - A stored quad has exactly one entry per registered index, all carrying
//!   the same encoded value.
//! - Every mutation call issues at most one backend batch (the stream
//!   writers issue one per chunk).
//! - Argument and planning errors are returned before any backend I/O.

use std::pin::pin;

use futures::{Stream, TryStreamExt};
use tracing::{debug, info};

use crate::backend::{Backend, BatchOp, RangeQuery, WriteOptions};
use crate::codec;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::index::{IndexDefinition, IndexRegistry, encode_key};
use crate::query::{
    Planner, QuadStream, QueryOptions, approximate_count, execute, inclusive_bounds,
};
use crate::types::{MatchTerms, Quad, RangeFilter, RangeTest, TermRole};

/// What a delete or patch applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// These exact quads.
    Quads(Vec<Quad>),
    /// Whatever currently matches the pattern.
    Matching(MatchTerms),
}

impl From<Vec<Quad>> for Target {
    fn from(quads: Vec<Quad>) -> Self {
        Self::Quads(quads)
    }
}

impl From<&[Quad]> for Target {
    fn from(quads: &[Quad]) -> Self {
        Self::Quads(quads.to_vec())
    }
}

impl From<Quad> for Target {
    fn from(quad: Quad) -> Self {
        Self::Quads(vec![quad])
    }
}

impl From<MatchTerms> for Target {
    fn from(terms: MatchTerms) -> Self {
        Self::Matching(terms)
    }
}

/// A range query over one index, with bounds relative to the index name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexQuery {
    pub gt: Option<String>,
    pub gte: Option<String>,
    pub lt: Option<String>,
    pub lte: Option<String>,
    pub options: QueryOptions,
}

impl IndexQuery {
    /// Scan the whole index.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    fn filters(&self) -> Vec<RangeFilter> {
        [
            (RangeTest::Gt, &self.gt),
            (RangeTest::Gte, &self.gte),
            (RangeTest::Lt, &self.lt),
            (RangeTest::Lte, &self.lte),
        ]
        .into_iter()
        .filter_map(|(test, value)| value.as_deref().map(|v| RangeFilter::new(test, v)))
        .collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum StreamWrite {
    Put,
    Del,
}

/// A quad store over an ordered backend.
pub struct QuadStore<B: Backend> {
    backend: B,
    config: StoreConfig,
    registry: IndexRegistry,
    write_options: WriteOptions,
}

impl<B: Backend> QuadStore<B> {
    /// Create a store with the built-in indexes.
    pub fn new(backend: B, config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        info!(
            context_key = %config.context_key,
            default_context = %config.default_context,
            "quad store ready"
        );
        Ok(Self {
            backend,
            config,
            registry: IndexRegistry::with_builtins(),
            write_options: WriteOptions::default(),
        })
    }

    /// Options passed to every backend batch.
    #[must_use]
    pub const fn with_write_options(mut self, options: WriteOptions) -> Self {
        self.write_options = options;
        self
    }

    /// Register a custom index keyed by `keygen(quad)`.
    ///
    /// Only quads written after registration are indexed, so register
    /// indexes before the first write. On error nothing is registered.
    pub fn register_index<F>(
        &mut self,
        name: impl Into<String>,
        keygen: F,
    ) -> Result<&mut Self, StoreError>
    where
        F: Fn(&Quad) -> String + Send + Sync + 'static,
    {
        let index = IndexDefinition::custom(name, keygen);
        let registered = self.registry.register(index, &self.config.separator)?;
        info!(index = registered.name(), "registered custom index");
        Ok(self)
    }

    /// All indexes in registration order.
    pub fn indexes(&self) -> impl Iterator<Item = &IndexDefinition> {
        self.registry.iter()
    }

    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexDefinition> {
        self.registry.get(name)
    }

    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    const fn planner(&self) -> Planner<'_> {
        Planner::new(&self.registry, &self.config)
    }

    /// Store `quads`.
    pub async fn put(&self, quads: &[Quad]) -> Result<(), StoreError> {
        self.delput(&[], quads).await
    }

    /// Delete quads, either given explicitly or by pattern.
    pub async fn del(&self, target: impl Into<Target>) -> Result<(), StoreError> {
        match target.into() {
            Target::Quads(quads) => self.delput(&quads, &[]).await,
            Target::Matching(terms) => self.getdelput(&terms, &[]).await,
        }
    }

    /// Replace the target quads with `new_quads` in one batch.
    pub async fn patch(
        &self,
        target: impl Into<Target>,
        new_quads: &[Quad],
    ) -> Result<(), StoreError> {
        match target.into() {
            Target::Quads(quads) => self.delput(&quads, new_quads).await,
            Target::Matching(terms) => self.getdelput(&terms, new_quads).await,
        }
    }

    /// Delete `old_quads` and store `new_quads` in one atomic batch.
    ///
    /// Deletions are emitted before insertions, so a quad present in both
    /// sets ends up stored.
    pub async fn delput(&self, old_quads: &[Quad], new_quads: &[Quad]) -> Result<(), StoreError> {
        let old_quads = self.prepare_all(old_quads)?;
        let new_quads = self.prepare_all(new_quads)?;
        if old_quads.is_empty() && new_quads.is_empty() {
            return Ok(());
        }

        let index_count = self.registry.len();
        let mut ops = Vec::with_capacity((old_quads.len() + new_quads.len()) * index_count);
        for quad in &old_quads {
            for index in self.registry.iter() {
                ops.push(BatchOp::Del {
                    key: encode_key(index, quad, &self.config.separator),
                });
            }
        }
        for quad in &new_quads {
            let value = codec::encode_quad(quad);
            for index in self.registry.iter() {
                ops.push(BatchOp::Put {
                    key: encode_key(index, quad, &self.config.separator),
                    value: value.clone(),
                });
            }
        }

        debug!(
            deleted = old_quads.len(),
            inserted = new_quads.len(),
            ops = ops.len(),
            "writing batch"
        );
        self.backend.batch(ops, self.write_options).await?;
        Ok(())
    }

    /// Delete whatever matches `terms` and store `new_quads`.
    ///
    /// The read and the write are separate steps: a concurrent writer can
    /// add a matching quad between them, and that quad survives.
    pub async fn getdelput(&self, terms: &MatchTerms, new_quads: &[Quad]) -> Result<(), StoreError> {
        let old_quads = self.get(terms, &QueryOptions::default()).await?;
        self.delput(&old_quads, new_quads).await
    }

    /// Collect every quad matching `terms`.
    pub async fn get(
        &self,
        terms: &MatchTerms,
        options: &QueryOptions,
    ) -> Result<Vec<Quad>, StoreError> {
        self.get_stream(terms, options)?.try_collect().await
    }

    /// Stream the quads matching `terms`.
    ///
    /// Planning errors are returned immediately; the stream only carries
    /// backend and decoding errors.
    pub fn get_stream(
        &self,
        terms: &MatchTerms,
        options: &QueryOptions,
    ) -> Result<QuadStream, StoreError> {
        let plan = self.planner().plan(terms)?;
        debug!(
            index = %plan.index,
            residual = plan.residual.len(),
            "planned pattern query"
        );
        let query = RangeQuery {
            limit: options.backend_limit(plan.is_exact()),
            reverse: options.reverse,
            lower: plan.lower,
            upper: plan.upper,
        };
        let values = self.backend.scan(&query);
        Ok(execute(values, plan.residual, options))
    }

    /// Approximate number of quads matching `terms`, range filters ignored.
    pub async fn get_approximate_size(&self, terms: &MatchTerms) -> Result<u64, StoreError> {
        let planner = self.planner();
        planner.plan(terms)?;
        let plan = planner.prefix_range(terms)?;
        let (lower, upper) = inclusive_bounds(&plan).ok_or_else(|| {
            StoreError::InvalidArgument("pattern has no inclusive prefix range".to_owned())
        })?;
        let bytes = self.backend.approximate_size(lower, upper).await?;
        let count = approximate_count(bytes, self.config.record_size);
        debug!(index = %plan.index, bytes, count, "estimated size");
        Ok(count)
    }

    /// Collect the quads of index `name` within `query`'s bounds.
    pub async fn get_by_index(
        &self,
        name: &str,
        query: &IndexQuery,
    ) -> Result<Vec<Quad>, StoreError> {
        self.get_by_index_stream(name, query)?.try_collect().await
    }

    /// Stream the quads of index `name` within `query`'s bounds, in key order.
    pub fn get_by_index_stream(
        &self,
        name: &str,
        query: &IndexQuery,
    ) -> Result<QuadStream, StoreError> {
        let index = self
            .registry
            .get(name)
            .ok_or_else(|| StoreError::UnknownIndex(name.to_owned()))?;
        let (lower, upper) = self.planner().index_bounds(index, &query.filters())?;
        let range = RangeQuery {
            lower,
            upper,
            limit: query.options.backend_limit(true),
            reverse: query.options.reverse,
        };
        debug!(index = name, "scanning index");
        let values = self.backend.scan(&range);
        Ok(execute(values, Vec::new(), &query.options))
    }

    /// Store every quad from `quads`, one batch per `stream_batch_size`
    /// quads. Returns the number of quads written.
    ///
    /// Batches written before an error stay written.
    pub async fn put_stream<S>(&self, quads: S) -> Result<usize, StoreError>
    where
        S: Stream<Item = Result<Quad, StoreError>>,
    {
        self.write_stream(quads, StreamWrite::Put).await
    }

    /// Delete every quad from `quads`, batched like [`Self::put_stream`].
    pub async fn del_stream<S>(&self, quads: S) -> Result<usize, StoreError>
    where
        S: Stream<Item = Result<Quad, StoreError>>,
    {
        self.write_stream(quads, StreamWrite::Del).await
    }

    async fn write_stream<S>(&self, quads: S, mode: StreamWrite) -> Result<usize, StoreError>
    where
        S: Stream<Item = Result<Quad, StoreError>>,
    {
        let mut quads = pin!(quads);
        let batch_size = self.config.stream_batch_size;
        let mut chunk = Vec::with_capacity(batch_size);
        let mut written = 0;

        loop {
            let next = quads.try_next().await?;
            let done = next.is_none();
            chunk.extend(next);
            if chunk.len() >= batch_size || (done && !chunk.is_empty()) {
                match mode {
                    StreamWrite::Put => self.delput(&[], &chunk).await?,
                    StreamWrite::Del => self.delput(&chunk, &[]).await?,
                }
                written += chunk.len();
                chunk.clear();
            }
            if done {
                break;
            }
        }
        debug!(written, "finished stream write");
        Ok(written)
    }

    /// Close the backend.
    pub async fn close(&self) -> Result<(), StoreError> {
        self.backend.close().await?;
        info!("quad store closed");
        Ok(())
    }

    fn prepare_all(&self, quads: &[Quad]) -> Result<Vec<Quad>, StoreError> {
        quads.iter().map(|quad| self.prepare(quad)).collect()
    }

    /// Fill in the default context and check that every term is storable.
    fn prepare(&self, quad: &Quad) -> Result<Quad, StoreError> {
        let quad = quad.clone().with_default_context(&self.config.default_context);
        for role in TermRole::ALL {
            let term = quad.term(role);
            if term.is_empty() {
                return Err(StoreError::InvalidArgument(format!("quad has an empty {role}")));
            }
            if term.contains(self.config.separator.as_str()) {
                return Err(StoreError::InvalidArgument(format!(
                    "quad {role} contains the key separator"
                )));
            }
        }
        Ok(quad)
    }
}
