//! Point-in-time aggregation over the accounting index.

use crate::entities::ProcessorLabel;
use crate::entities::payment::PaymentRecord;
use crate::store::{PaymentStore, ScoreRange};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use std::time::Duration;

/// Fee the default processor charges per transaction amount.
pub const DEFAULT_FEE_RATE: Decimal = dec!(0.05);
/// Fee the fallback processor charges; the costlier path.
pub const FALLBACK_FEE_RATE: Decimal = dec!(0.15);

/// How long a summary read may hold up the caller before it degrades to an
/// empty window.
pub const READ_TIMEOUT: Duration = Duration::from_millis(200);

/// Aggregate over one processor's bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorStats {
    pub total_requests: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee_rate: Decimal,
}

impl ProcessorStats {
    fn from_bucket(total_requests: u64, gross: Decimal, fee_rate: Decimal) -> Self {
        Self {
            total_requests,
            total_amount: round_to_cents(gross),
            total_fee: round_to_cents(gross * fee_rate),
            fee_rate,
        }
    }
}

/// Response body of `GET /payments-summary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentsSummary {
    pub default: ProcessorStats,
    pub fallback: ProcessorStats,
}

/// Round half-up to the smallest currency unit.
fn round_to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Fold records into the two reported buckets.
///
/// `error`-labeled records were never charged by either processor and are
/// excluded. Summation runs at full precision; rounding is applied once, at
/// the output boundary, never accumulated.
pub fn fold_records(records: &[PaymentRecord]) -> PaymentsSummary {
    let mut default_count = 0u64;
    let mut default_gross = Decimal::ZERO;
    let mut fallback_count = 0u64;
    let mut fallback_gross = Decimal::ZERO;

    for record in records {
        match record.processor {
            ProcessorLabel::Default => {
                default_count += 1;
                default_gross += record.amount;
            }
            ProcessorLabel::Fallback => {
                fallback_count += 1;
                fallback_gross += record.amount;
            }
            ProcessorLabel::Error => {}
        }
    }

    PaymentsSummary {
        default: ProcessorStats::from_bucket(default_count, default_gross, DEFAULT_FEE_RATE),
        fallback: ProcessorStats::from_bucket(fallback_count, fallback_gross, FALLBACK_FEE_RATE),
    }
}

/// Read-side view over the accounting store.
#[derive(Clone)]
pub struct SummaryAggregator<S> {
    store: S,
    read_timeout: Duration,
}

impl<S: PaymentStore> SummaryAggregator<S> {
    pub fn new(store: S) -> Self {
        Self::with_read_timeout(store, READ_TIMEOUT)
    }

    pub fn with_read_timeout(store: S, read_timeout: Duration) -> Self {
        Self {
            store,
            read_timeout,
        }
    }

    /// Best-effort report over whatever the index can serve right now: a
    /// slow or failing scan degrades to an empty window instead of erroring.
    pub async fn summarize(&self, range: ScoreRange) -> PaymentsSummary {
        let records = match tokio::time::timeout(self.read_timeout, self.store.scan(range)).await {
            Ok(Ok(records)) => records,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "accounting scan failed, reporting empty window");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("accounting scan timed out, reporting empty window");
                Vec::new()
            }
        };
        fold_records(&records)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::entities::payment::PaymentRequest;
    use crate::store::StoreError;
    use crate::test_utils::MemoryStore;
    use async_trait::async_trait;
    use time::macros::datetime;

    fn record(correlation_id: &str, amount: &str, processor: ProcessorLabel) -> PaymentRecord {
        PaymentRecord {
            correlation_id: correlation_id.to_string(),
            amount: amount.parse().unwrap(),
            processor,
            requested_at: 1_000.0,
        }
    }

    #[test]
    fn folds_one_accepted_payment() {
        let summary = fold_records(&[record("a1", "100.00", ProcessorLabel::Default)]);

        assert_eq!(summary.default.total_requests, 1);
        assert_eq!(summary.default.total_amount, dec!(100.00));
        assert_eq!(summary.default.total_fee, dec!(5.00));
        assert_eq!(summary.default.fee_rate, dec!(0.05));
        assert_eq!(summary.fallback.total_requests, 0);
        assert_eq!(summary.fallback.total_amount, Decimal::ZERO);
    }

    #[test]
    fn folds_failover_traffic_into_the_fallback_bucket() {
        let records: Vec<_> = (0..3)
            .map(|i| record(&format!("p{i}"), "50.00", ProcessorLabel::Fallback))
            .collect();
        let summary = fold_records(&records);

        assert_eq!(summary.fallback.total_requests, 3);
        assert_eq!(summary.fallback.total_amount, dec!(150.00));
        assert_eq!(summary.fallback.total_fee, dec!(22.50));
        assert_eq!(summary.default.total_requests, 0);
    }

    #[test]
    fn error_records_are_excluded_from_both_buckets() {
        let summary = fold_records(&[
            record("a1", "10.00", ProcessorLabel::Default),
            record("a2", "99.99", ProcessorLabel::Error),
            record("a3", "99.99", ProcessorLabel::Error),
        ]);

        assert_eq!(summary.default.total_requests, 1);
        assert_eq!(summary.fallback.total_requests, 0);
        assert_eq!(summary.default.total_amount, dec!(10.00));
    }

    #[test]
    fn rounding_happens_once_at_the_boundary() {
        // Three thirds of a cent only round correctly if the sum is exact.
        let records: Vec<_> = (0..3)
            .map(|i| record(&format!("p{i}"), "33.335", ProcessorLabel::Default))
            .collect();
        let summary = fold_records(&records);

        // 100.005 rounds half-up to 100.01; per-record rounding would have
        // produced 100.02.
        assert_eq!(summary.default.total_amount, dec!(100.01));
    }

    #[test]
    fn fold_is_idempotent() {
        let records = vec![
            record("a1", "12.34", ProcessorLabel::Default),
            record("a2", "56.78", ProcessorLabel::Fallback),
        ];
        assert_eq!(fold_records(&records), fold_records(&records));
    }

    #[tokio::test]
    async fn open_window_equals_infinite_window() {
        let store = MemoryStore::default();
        for (i, processor) in [ProcessorLabel::Default, ProcessorLabel::Fallback]
            .into_iter()
            .enumerate()
        {
            let payment = PaymentRequest {
                correlation_id: format!("p{i}"),
                amount: "10.00".parse().unwrap(),
                requested_at: datetime!(2025-07-01 12:00:00 UTC),
                retry_count: 0,
            };
            store
                .record(&PaymentRecord::new(&payment, processor))
                .await
                .unwrap();
        }

        let aggregator = SummaryAggregator::new(store);
        let open = aggregator.summarize(ScoreRange::default()).await;
        let infinite = aggregator
            .summarize(ScoreRange::new(Some(f64::MIN), Some(f64::MAX)))
            .await;

        assert_eq!(open, infinite);
        assert_eq!(open.default.total_requests, 1);
        assert_eq!(open.fallback.total_requests, 1);
    }

    #[tokio::test]
    async fn window_bounds_filter_by_request_time() {
        let store = MemoryStore::default();
        for (id, at) in [("early", 100.0), ("mid", 200.0), ("late", 300.0)] {
            store
                .record(&PaymentRecord {
                    correlation_id: id.to_string(),
                    amount: "10.00".parse().unwrap(),
                    processor: ProcessorLabel::Default,
                    requested_at: at,
                })
                .await
                .unwrap();
        }

        let aggregator = SummaryAggregator::new(store);
        let summary = aggregator
            .summarize(ScoreRange::new(Some(150.0), Some(250.0)))
            .await;

        assert_eq!(summary.default.total_requests, 1);
        assert_eq!(summary.default.total_amount, dec!(10.00));
    }

    struct FailingStore;

    #[async_trait]
    impl PaymentStore for FailingStore {
        async fn enqueue(&self, _: &PaymentRequest) -> Result<(), StoreError> {
            Err(broken())
        }
        async fn dequeue(&self) -> Result<Option<PaymentRequest>, StoreError> {
            Err(broken())
        }
        async fn record(&self, _: &PaymentRecord) -> Result<(), StoreError> {
            Err(broken())
        }
        async fn scan(&self, _: ScoreRange) -> Result<Vec<PaymentRecord>, StoreError> {
            Err(broken())
        }
        async fn purge(&self) -> Result<(), StoreError> {
            Err(broken())
        }
    }

    fn broken() -> StoreError {
        StoreError::Encoding(serde_json::from_str::<PaymentRecord>("{").unwrap_err())
    }

    #[tokio::test]
    async fn failing_store_degrades_to_an_empty_report() {
        let aggregator = SummaryAggregator::new(FailingStore);
        let summary = aggregator.summarize(ScoreRange::default()).await;

        assert_eq!(summary.default.total_requests, 0);
        assert_eq!(summary.fallback.total_requests, 0);
        assert_eq!(summary.default.total_amount, Decimal::ZERO);
    }

    struct StalledStore;

    #[async_trait]
    impl PaymentStore for StalledStore {
        async fn enqueue(&self, _: &PaymentRequest) -> Result<(), StoreError> {
            Ok(())
        }
        async fn dequeue(&self) -> Result<Option<PaymentRequest>, StoreError> {
            Ok(None)
        }
        async fn record(&self, _: &PaymentRecord) -> Result<(), StoreError> {
            Ok(())
        }
        async fn scan(&self, _: ScoreRange) -> Result<Vec<PaymentRecord>, StoreError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
        async fn purge(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_store_times_out_to_an_empty_report() {
        let aggregator = SummaryAggregator::new(StalledStore);
        let summary = aggregator.summarize(ScoreRange::default()).await;

        assert_eq!(summary.default.total_requests, 0);
        assert_eq!(summary.fallback.total_requests, 0);
    }

    #[test]
    fn summary_serializes_with_camel_case_fields() {
        let summary = fold_records(&[record("a1", "100.00", ProcessorLabel::Default)]);
        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(value["default"]["totalRequests"], 1);
        assert_eq!(value["default"]["totalAmount"], 100.0);
        assert_eq!(value["default"]["totalFee"], 5.0);
        assert_eq!(value["default"]["feeRate"], 0.05);
        assert_eq!(value["fallback"]["totalRequests"], 0);
    }
}
