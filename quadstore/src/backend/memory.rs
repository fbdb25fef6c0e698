//! In-memory ordered backend with optional fault injection.
//!
//! Entries live in a `BTreeMap` behind a `RwLock`. Scans never hold the lock
//! across an await point: the cursor copies out one chunk at a time and
//! resumes from the last key it yielded, so writers interleave with long
//! scans the way they would with a snapshot-free LSM iterator.

use std::collections::{BTreeMap, VecDeque};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use futures::StreamExt;
use futures::stream::{self, BoxStream};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{Backend, BackendError, BatchOp, RangeQuery, WriteOptions};

/// Entries copied out of the map per lock acquisition.
const SCAN_CHUNK: usize = 64;

/// Probabilities of injected failures.
#[derive(Debug, Clone, Default)]
pub struct FaultConfig {
    /// Probability that a batch fails before applying anything (0.0 - 1.0).
    pub batch_error_rate: f64,
    /// Probability that a scan fails before yielding anything (0.0 - 1.0).
    pub scan_error_rate: f64,
    /// Probability that a size estimate fails (0.0 - 1.0).
    pub size_error_rate: f64,
}

impl FaultConfig {
    /// No faults.
    #[must_use]
    pub fn no_faults() -> Self {
        Self::default()
    }

    /// Every operation fails.
    #[must_use]
    pub const fn always() -> Self {
        Self {
            batch_error_rate: 1.0,
            scan_error_rate: 1.0,
            size_error_rate: 1.0,
        }
    }
}

struct FaultInjector {
    config: FaultConfig,
    rng: StdRng,
}

impl FaultInjector {
    fn roll(&mut self, rate: f64, what: &str) -> Result<(), BackendError> {
        if rate > 0.0 && self.rng.random::<f64>() < rate {
            return Err(BackendError::InjectedFault(format!("{what} failed")));
        }
        Ok(())
    }
}

struct Shared {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    faults: Mutex<Option<FaultInjector>>,
    closed: AtomicBool,
}

impl Shared {
    fn check_open(&self) -> Result<(), BackendError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BackendError::Closed);
        }
        Ok(())
    }

    fn inject(&self, rate: impl Fn(&FaultConfig) -> f64, what: &str) -> Result<(), BackendError> {
        let mut faults = self.faults.lock().map_err(|_| BackendError::LockPoisoned)?;
        match faults.as_mut() {
            Some(injector) => {
                let rate = rate(&injector.config);
                injector.roll(rate, what)
            }
            None => Ok(()),
        }
    }
}

/// A `BTreeMap`-backed store.
///
/// Cloning is cheap and yields a handle to the same map.
#[derive(Clone)]
pub struct MemoryBackend {
    shared: Arc<Shared>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// An empty backend without faults.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// An empty backend that fails operations at the configured rates.
    ///
    /// The same seed yields the same failure sequence.
    #[must_use]
    pub fn with_faults(config: FaultConfig, seed: u64) -> Self {
        Self::build(Some(FaultInjector {
            config,
            rng: StdRng::seed_from_u64(seed),
        }))
    }

    fn build(faults: Option<FaultInjector>) -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: RwLock::new(BTreeMap::new()),
                faults: Mutex::new(faults),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Replace the fault configuration and reseed the generator.
    pub fn set_faults(&self, config: FaultConfig, seed: u64) -> Result<(), BackendError> {
        let mut faults = self
            .shared
            .faults
            .lock()
            .map_err(|_| BackendError::LockPoisoned)?;
        *faults = Some(FaultInjector {
            config,
            rng: StdRng::seed_from_u64(seed),
        });
        Ok(())
    }

    /// Number of stored entries.
    pub fn len(&self) -> Result<usize, BackendError> {
        let entries = self
            .shared
            .entries
            .read()
            .map_err(|_| BackendError::LockPoisoned)?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, BackendError> {
        Ok(self.len()? == 0)
    }

    /// Apply `ops` under one write lock, bypassing fault injection.
    pub(crate) fn apply(&self, ops: Vec<BatchOp>) -> Result<(), BackendError> {
        let mut entries = self
            .shared
            .entries
            .write()
            .map_err(|_| BackendError::LockPoisoned)?;
        for op in ops {
            match op {
                BatchOp::Put { key, value } => {
                    entries.insert(key, value);
                }
                BatchOp::Del { key } => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}

/// Resumable position of a scan.
struct Cursor {
    shared: Arc<Shared>,
    lower: Bound<Vec<u8>>,
    upper: Bound<Vec<u8>>,
    remaining: Option<usize>,
    reverse: bool,
    buffer: VecDeque<Vec<u8>>,
    exhausted: bool,
    started: bool,
}

impl Cursor {
    fn next_value(&mut self) -> Option<Result<Vec<u8>, BackendError>> {
        if !self.started {
            self.started = true;
            if let Err(e) = self
                .shared
                .check_open()
                .and_then(|()| self.shared.inject(|c| c.scan_error_rate, "scan"))
            {
                self.exhausted = true;
                return Some(Err(e));
            }
        }

        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fill() {
                self.exhausted = true;
                self.buffer.clear();
                return Some(Err(e));
            }
        }

        let value = self.buffer.pop_front()?;
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(Ok(value))
    }

    fn fill(&mut self) -> Result<(), BackendError> {
        let want = self
            .remaining
            .map_or(SCAN_CHUNK, |remaining| remaining.min(SCAN_CHUNK));
        let window = RangeQuery {
            lower: self.lower.clone(),
            upper: self.upper.clone(),
            limit: None,
            reverse: self.reverse,
        };
        if want == 0 || window.is_empty() {
            self.exhausted = true;
            return Ok(());
        }

        self.shared.check_open()?;
        let entries = self
            .shared
            .entries
            .read()
            .map_err(|_| BackendError::LockPoisoned)?;
        let range = entries.range((self.lower.clone(), self.upper.clone()));

        let mut last_key = None;
        let mut taken = 0;
        let mut take = |(key, value): (&Vec<u8>, &Vec<u8>)| {
            self.buffer.push_back(value.clone());
            last_key = Some(key.clone());
            taken += 1;
        };
        if self.reverse {
            range.rev().take(want).for_each(&mut take);
        } else {
            range.take(want).for_each(&mut take);
        }
        drop(entries);

        if taken < want {
            self.exhausted = true;
        }
        if let Some(key) = last_key {
            if self.reverse {
                self.upper = Bound::Excluded(key);
            } else {
                self.lower = Bound::Excluded(key);
            }
        }
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn scan(&self, query: &RangeQuery) -> BoxStream<'static, Result<Vec<u8>, BackendError>> {
        let cursor = Cursor {
            shared: Arc::clone(&self.shared),
            lower: query.lower.clone(),
            upper: query.upper.clone(),
            remaining: query.limit,
            reverse: query.reverse,
            buffer: VecDeque::new(),
            exhausted: false,
            started: false,
        };
        stream::unfold(cursor, |mut cursor| async move {
            cursor.next_value().map(|item| (item, cursor))
        })
        .boxed()
    }

    async fn batch(&self, ops: Vec<BatchOp>, _options: WriteOptions) -> Result<(), BackendError> {
        self.shared.check_open()?;
        self.shared.inject(|c| c.batch_error_rate, "batch")?;
        debug!(ops = ops.len(), "applying batch");
        self.apply(ops)
    }

    async fn approximate_size(&self, lower: &[u8], upper: &[u8]) -> Result<u64, BackendError> {
        self.shared.check_open()?;
        self.shared.inject(|c| c.size_error_rate, "approximate size")?;
        if lower > upper {
            return Ok(0);
        }
        let entries = self
            .shared
            .entries
            .read()
            .map_err(|_| BackendError::LockPoisoned)?;
        let bytes = entries
            .range::<[u8], _>((Bound::Included(lower), Bound::Included(upper)))
            .map(|(key, value)| (key.len() + value.len()) as u64)
            .sum();
        Ok(bytes)
    }

    async fn close(&self) -> Result<(), BackendError> {
        self.shared.closed.store(true, Ordering::Release);
        Ok(())
    }
}
