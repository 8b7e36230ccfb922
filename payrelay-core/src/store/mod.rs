//! The shared work queue and accounting index.
//!
//! Both live in one Redis instance: the queue is a list of JSON-encoded
//! [`PaymentRequest`]s, the accounting index a sorted set of JSON-encoded
//! [`PaymentRecord`]s scored by `requested_at`. [`PaymentStore`] is the
//! contract the worker pool and the summary aggregator program against;
//! [`redis::RedisStore`] is the production backend.

pub mod redis;

use crate::entities::payment::{PaymentRecord, PaymentRequest};
use async_trait::async_trait;
use thiserror::Error;

/// List key holding pending payments, FIFO.
pub const WORK_QUEUE_KEY: &str = "payment_queue";
/// Sorted-set key holding completed payment records, scored by request time.
pub const ACCOUNTING_KEY: &str = "payments_by_date";

/// Inclusive score window over the accounting index, fractional unix seconds.
/// An unset bound is open-ended.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ScoreRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, score: f64) -> bool {
        self.min.is_none_or(|min| score >= min) && self.max.is_none_or(|max| score <= max)
    }

    pub(crate) fn min_arg(&self) -> String {
        self.min.map_or_else(|| "-inf".to_string(), |v| v.to_string())
    }

    pub(crate) fn max_arg(&self) -> String {
        self.max.map_or_else(|| "+inf".to_string(), |v| v.to_string())
    }
}

/// Failures talking to the store or decoding its payloads.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("payload encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl StoreError {
    /// True when the store rejected a write for lack of memory, which the
    /// ingress maps to 503 rather than 500.
    pub fn is_capacity_exhausted(&self) -> bool {
        matches!(self, StoreError::Redis(e) if e.code() == Some("OOM"))
    }
}

/// Durable queue + accounting operations.
///
/// The worker pool is the sole caller of [`record`](PaymentStore::record);
/// summary reads and purges share the index read-only or destructively.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Append a pending payment to the tail of the work queue.
    async fn enqueue(&self, payment: &PaymentRequest) -> Result<(), StoreError>;

    /// Destructively pop the head of the work queue. `None` when empty.
    ///
    /// The pop happens before the payload is decoded, so a malformed entry
    /// is consumed (and reported) rather than wedging the queue head.
    async fn dequeue(&self) -> Result<Option<PaymentRequest>, StoreError>;

    /// Append one record to the accounting index.
    async fn record(&self, record: &PaymentRecord) -> Result<(), StoreError>;

    /// All records whose score falls inside `range`, skipping members that
    /// no longer decode.
    async fn scan(&self, range: ScoreRange) -> Result<Vec<PaymentRecord>, StoreError>;

    /// Drop the accounting index and the work queue. Administrative only.
    async fn purge(&self) -> Result<(), StoreError>;
}
