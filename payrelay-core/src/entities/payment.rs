//! Payment work items and their durable accounting records.

use super::ProcessorLabel;
use crate::utils::timestamp::unix_seconds;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Ingress body for `POST /payments`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSubmission {
    /// Opaque caller-supplied identifier; not checked for global uniqueness.
    #[serde(rename = "correlationId")]
    pub correlation_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// A unit of queued work, serialized as JSON onto the work queue.
///
/// Consumed exactly once per dequeue attempt: the pop is destructive and
/// there is no acknowledgement or requeue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    #[serde(rename = "correlationId")]
    pub correlation_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Stamped at ingress, UTC. Carried through unmodified to the processors
    /// and into the accounting score.
    #[serde(with = "time::serde::rfc3339")]
    pub requested_at: OffsetDateTime,
    /// Latent extension point for a future bounded-requeue policy.
    /// Always 0 today; nothing increments or reads it.
    #[serde(default)]
    pub retry_count: u32,
}

impl PaymentRequest {
    /// Admit a submission, stamping the ingress timestamp.
    pub fn accepted(submission: PaymentSubmission, requested_at: OffsetDateTime) -> Self {
        Self {
            correlation_id: submission.correlation_id,
            amount: submission.amount,
            requested_at,
            retry_count: 0,
        }
    }
}

/// The durable accounting entry, one per dequeued payment.
///
/// Immutable once written. `requested_at` is fractional unix seconds and
/// doubles as the sorted-set score, so range scans stay correct no matter
/// what order concurrent workers finish in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(rename = "correlationId")]
    pub correlation_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub processor: ProcessorLabel,
    pub requested_at: f64,
}

impl PaymentRecord {
    pub fn new(payment: &PaymentRequest, processor: ProcessorLabel) -> Self {
        Self {
            correlation_id: payment.correlation_id.clone(),
            amount: payment.amount,
            processor,
            requested_at: unix_seconds(payment.requested_at),
        }
    }
}
