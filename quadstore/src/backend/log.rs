//! Durable backend: an in-memory map rebuilt from an append-only batch log.
//!
//! Every batch becomes one frame:
//!
//! ```text
//! +-----------+----------------------+---------+
//! | len (u32) | BatchRecord (prost)  | crc32   |
//! +-----------+----------------------+---------+
//! ```
//!
//! `len` counts the whole frame; the checksum covers everything before it.
//! A frame is appended before its batch touches the map, so on reopen the
//! log replays to the last acknowledged state. A torn or corrupt tail is
//! truncated: a batch is replayed entirely or not at all. An append that
//! fails part way is cut back before the error is returned, so later frames
//! never land behind a torn one.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::BoxStream;
use prost::Message;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::memory::MemoryBackend;
use super::{Backend, BackendError, BatchOp, RangeQuery, WriteOptions};

const LEN_SIZE: usize = 4;
const CHECKSUM_SIZE: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
enum OpKind {
    Put = 0,
    Del = 1,
}

#[derive(Clone, PartialEq, Eq, prost::Message)]
struct OpRecord {
    #[prost(enumeration = "OpKind", tag = "1")]
    kind: i32,
    #[prost(bytes = "vec", tag = "2")]
    key: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    value: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, prost::Message)]
struct BatchRecord {
    #[prost(message, repeated, tag = "1")]
    ops: Vec<OpRecord>,
}

impl BatchRecord {
    fn from_ops(ops: &[BatchOp]) -> Self {
        let ops = ops
            .iter()
            .map(|op| match op {
                BatchOp::Put { key, value } => OpRecord {
                    kind: OpKind::Put as i32,
                    key: key.clone(),
                    value: value.clone(),
                },
                BatchOp::Del { key } => OpRecord {
                    kind: OpKind::Del as i32,
                    key: key.clone(),
                    value: Vec::new(),
                },
            })
            .collect();
        Self { ops }
    }

    fn into_ops(self) -> Result<Vec<BatchOp>, BackendError> {
        self.ops
            .into_iter()
            .map(|op| match OpKind::try_from(op.kind) {
                Ok(OpKind::Put) => Ok(BatchOp::Put {
                    key: op.key,
                    value: op.value,
                }),
                Ok(OpKind::Del) => Ok(BatchOp::Del { key: op.key }),
                Err(_) => Err(BackendError::Corruption(format!(
                    "unknown op kind {}",
                    op.kind
                ))),
            })
            .collect()
    }
}

/// Serialize one batch into a log frame.
#[allow(clippy::cast_possible_truncation)] // frames are far below 4 GiB
fn encode_frame(ops: &[BatchOp]) -> Vec<u8> {
    let payload = BatchRecord::from_ops(ops).encode_to_vec();
    let total_len = LEN_SIZE + payload.len() + CHECKSUM_SIZE;

    let mut frame = Vec::with_capacity(total_len);
    frame.extend_from_slice(&(total_len as u32).to_le_bytes());
    frame.extend_from_slice(&payload);
    let checksum = crc32fast::hash(&frame);
    frame.extend_from_slice(&checksum.to_le_bytes());
    frame
}

/// Parse the frame at the start of `bytes`.
///
/// Returns the batch and the number of bytes consumed.
fn decode_frame(bytes: &[u8]) -> Result<(Vec<BatchOp>, usize), BackendError> {
    if bytes.len() < LEN_SIZE + CHECKSUM_SIZE {
        return Err(BackendError::Corruption("truncated frame header".to_owned()));
    }
    let total_len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    if total_len < LEN_SIZE + CHECKSUM_SIZE || total_len > bytes.len() {
        return Err(BackendError::Corruption(format!(
            "frame length {total_len} exceeds remaining {} bytes",
            bytes.len()
        )));
    }

    let body_end = total_len - CHECKSUM_SIZE;
    let stored = u32::from_le_bytes([
        bytes[body_end],
        bytes[body_end + 1],
        bytes[body_end + 2],
        bytes[body_end + 3],
    ]);
    let computed = crc32fast::hash(&bytes[..body_end]);
    if stored != computed {
        return Err(BackendError::Corruption(format!(
            "checksum mismatch: expected 0x{stored:08x}, got 0x{computed:08x}"
        )));
    }

    let record = BatchRecord::decode(&bytes[LEN_SIZE..body_end])
        .map_err(|e| BackendError::Corruption(format!("undecodable batch: {e}")))?;
    Ok((record.into_ops()?, total_len))
}

async fn write_frame(file: &mut File, frame: &[u8], sync: bool) -> std::io::Result<()> {
    file.write_all(frame).await?;
    file.flush().await?;
    if sync {
        file.sync_data().await?;
    }
    Ok(())
}

async fn truncate(file: &mut File, len: u64) -> std::io::Result<()> {
    file.set_len(len).await?;
    file.sync_data().await
}

struct LogFile {
    file: Option<File>,
    /// Length of the log up to the end of the last complete frame.
    committed: u64,
}

impl LogFile {
    /// Append one frame. On failure the file is left at its committed length.
    async fn append(&mut self, frame: &[u8], sync: bool) -> Result<(), BackendError> {
        let file = self.file.as_mut().ok_or(BackendError::Closed)?;
        if let Err(e) = write_frame(file, frame, sync).await {
            self.rollback().await?;
            return Err(e.into());
        }
        self.committed += frame.len() as u64;
        Ok(())
    }

    /// Cut the file back to the last complete frame.
    ///
    /// If that fails the file is dropped and every later batch fails with
    /// [`BackendError::Closed`].
    async fn rollback(&mut self) -> Result<(), BackendError> {
        let committed = self.committed;
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };
        if let Err(e) = truncate(file, committed).await {
            warn!(committed, error = %e, "log rollback failed, refusing further writes");
            self.file = None;
            return Err(e.into());
        }
        Ok(())
    }
}

/// A [`MemoryBackend`] made durable by an append-only log file.
#[derive(Clone)]
pub struct LogBackend {
    memory: MemoryBackend,
    log: Arc<Mutex<LogFile>>,
    path: PathBuf,
}

impl LogBackend {
    /// Open or create the log at `path` and replay it.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref().to_path_buf();
        let memory = MemoryBackend::new();

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut offset = 0;
        let mut batches = 0usize;
        while offset < bytes.len() {
            match decode_frame(&bytes[offset..]) {
                Ok((ops, consumed)) => {
                    memory.apply(ops)?;
                    offset += consumed;
                    batches += 1;
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        offset,
                        discarded = bytes.len() - offset,
                        error = %e,
                        "discarding unreadable log tail"
                    );
                    break;
                }
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        let committed = offset as u64;
        if offset < bytes.len() {
            file.set_len(committed).await?;
            file.sync_all().await?;
        }

        info!(path = %path.display(), batches, "opened log backend");
        Ok(Self {
            memory,
            log: Arc::new(Mutex::new(LogFile {
                file: Some(file),
                committed,
            })),
            path,
        })
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for LogBackend {
    fn scan(&self, query: &RangeQuery) -> BoxStream<'static, Result<Vec<u8>, BackendError>> {
        self.memory.scan(query)
    }

    async fn batch(&self, ops: Vec<BatchOp>, options: WriteOptions) -> Result<(), BackendError> {
        let frame = encode_frame(&ops);

        // Held until the map is updated so log order matches apply order.
        let mut log = self.log.lock().await;
        log.append(&frame, options.sync).await?;
        debug!(ops = ops.len(), bytes = frame.len(), "appended batch");

        self.memory.apply(ops)?;
        drop(log);
        Ok(())
    }

    async fn approximate_size(&self, lower: &[u8], upper: &[u8]) -> Result<u64, BackendError> {
        self.memory.approximate_size(lower, upper).await
    }

    async fn close(&self) -> Result<(), BackendError> {
        let mut log = self.log.lock().await;
        if let Some(mut file) = log.file.take() {
            file.flush().await?;
            file.sync_all().await?;
            info!(path = %self.path.display(), "closed log backend");
        }
        drop(log);
        self.memory.close().await
    }
}
