//! Shared fakes for unit tests: an in-memory store mirroring the queue +
//! index layout, and a scriptable processor gateway.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::entities::ProcessorKind;
use crate::entities::payment::{PaymentRecord, PaymentRequest};
use crate::gateway::{ProcessorApi, ProcessorOutcome};
use crate::store::{PaymentStore, ScoreRange, StoreError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use time::OffsetDateTime;

/// In-memory [`PaymentStore`] with the same destructive-pop semantics as the
/// real queue: entries are raw strings, decoded only on dequeue.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    queue: VecDeque<String>,
    records: Vec<PaymentRecord>,
}

impl MemoryStore {
    /// Push an arbitrary payload, bypassing serialization. Lets tests plant
    /// malformed queue entries.
    pub fn push_raw(&self, payload: impl Into<String>) {
        self.inner.lock().unwrap().queue.push_back(payload.into());
    }

    pub fn records(&self) -> Vec<PaymentRecord> {
        self.inner.lock().unwrap().records.clone()
    }

    pub fn queue_len(&self) -> usize {
        self.inner.lock().unwrap().queue.len()
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn enqueue(&self, payment: &PaymentRequest) -> Result<(), StoreError> {
        let payload = serde_json::to_string(payment)?;
        self.push_raw(payload);
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<PaymentRequest>, StoreError> {
        let raw = self.inner.lock().unwrap().queue.pop_front();
        match raw {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn record(&self, record: &PaymentRecord) -> Result<(), StoreError> {
        self.inner.lock().unwrap().records.push(record.clone());
        Ok(())
    }

    async fn scan(&self, range: ScoreRange) -> Result<Vec<PaymentRecord>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|r| range.contains(r.requested_at))
            .cloned()
            .collect())
    }

    async fn purge(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.queue.clear();
        inner.records.clear();
        Ok(())
    }
}

/// [`ProcessorApi`] fake with a fixed outcome per processor, call recording,
/// and an optional artificial latency for concurrency tests.
pub struct FakeGateway {
    default_outcome: ProcessorOutcome,
    fallback_outcome: ProcessorOutcome,
    delay: Option<Duration>,
    calls: Mutex<Vec<ProcessorKind>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeGateway {
    pub fn new(default_outcome: ProcessorOutcome, fallback_outcome: ProcessorOutcome) -> Self {
        Self {
            default_outcome,
            fallback_outcome,
            delay: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<ProcessorKind> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, kind: ProcessorKind) -> usize {
        self.calls().iter().filter(|k| **k == kind).count()
    }

    /// Highest number of calls that were ever in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessorApi for FakeGateway {
    async fn submit_payment(
        &self,
        kind: ProcessorKind,
        _payment: &PaymentRequest,
    ) -> ProcessorOutcome {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.calls.lock().unwrap().push(kind);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match kind {
            ProcessorKind::Default => self.default_outcome,
            ProcessorKind::Fallback => self.fallback_outcome,
        }
    }
}

/// Quick test payment stamped with the current time.
pub fn payment(correlation_id: &str, amount: &str) -> PaymentRequest {
    PaymentRequest {
        correlation_id: correlation_id.to_string(),
        amount: amount.parse().unwrap(),
        requested_at: OffsetDateTime::now_utc(),
        retry_count: 0,
    }
}
