//! Outbound client for the two external payment processors.
//!
//! The gateway is responsible for:
//! - Building the minimal `POST {base}/payments` body
//! - Normalizing the response into a [`ProcessorOutcome`]
//! - Exposing the `GET {base}/payments/service-health` liveness probe
//!
//! It never persists, queues, or retries; those decisions belong to the
//! router and the worker pool.

use crate::entities::ProcessorKind;
use crate::entities::payment::PaymentRequest;
use crate::utils::timestamp::format_millis_utc;
use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Result of one processor call, normalized from transport-level detail.
///
/// Transient: consumed immediately by the router, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorOutcome {
    /// 2xx: the processor accepted and charged the payment.
    Success,
    /// 422: the processor is explicitly refusing work right now. Not an
    /// error; it just drives failover.
    Unavailable,
    /// Timeout, network failure, or any other status.
    Failed,
}

/// Base URLs of the two processors.
#[derive(Debug, Clone)]
pub struct ProcessorEndpoints {
    pub default: Url,
    pub fallback: Url,
}

impl ProcessorEndpoints {
    fn base(&self, kind: ProcessorKind) -> &Url {
        match kind {
            ProcessorKind::Default => &self.default,
            ProcessorKind::Fallback => &self.fallback,
        }
    }

    fn payments_url(&self, kind: ProcessorKind) -> String {
        format!("{}/payments", self.base(kind).as_str().trim_end_matches('/'))
    }

    fn liveness_url(&self, kind: ProcessorKind) -> String {
        format!(
            "{}/payments/service-health",
            self.base(kind).as_str().trim_end_matches('/')
        )
    }
}

/// Per-call timeouts. Tunable; the payment timeout is sized to survive a
/// deliberately slow fallback path, the liveness timeout is tight.
#[derive(Debug, Clone, Copy)]
pub struct GatewayTimeouts {
    pub payment: Duration,
    pub liveness: Duration,
}

impl Default for GatewayTimeouts {
    fn default() -> Self {
        Self {
            payment: Duration::from_secs(6),
            liveness: Duration::from_millis(1500),
        }
    }
}

/// Wire body for `POST {base}/payments`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutboundPayment<'a> {
    correlation_id: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    requested_at: String,
}

/// Submits one payment to a named processor.
///
/// The single seam between routing logic and the network; tests script it.
#[async_trait]
pub trait ProcessorApi: Send + Sync {
    async fn submit_payment(
        &self,
        kind: ProcessorKind,
        payment: &PaymentRequest,
    ) -> ProcessorOutcome;
}

#[async_trait]
impl<G: ProcessorApi + ?Sized> ProcessorApi for Arc<G> {
    async fn submit_payment(
        &self,
        kind: ProcessorKind,
        payment: &PaymentRequest,
    ) -> ProcessorOutcome {
        (**self).submit_payment(kind, payment).await
    }
}

/// Production [`ProcessorApi`] over an injected HTTP client.
#[derive(Clone)]
pub struct ProcessorGateway {
    http: reqwest::Client,
    endpoints: ProcessorEndpoints,
    timeouts: GatewayTimeouts,
}

impl ProcessorGateway {
    pub fn new(
        http: reqwest::Client,
        endpoints: ProcessorEndpoints,
        timeouts: GatewayTimeouts,
    ) -> Self {
        Self {
            http,
            endpoints,
            timeouts,
        }
    }

    /// `GET {base}/payments/service-health`, 200 meaning alive.
    ///
    /// Routing does not consult this; it is exposed for operational checks
    /// against processors that publish the endpoint.
    pub async fn probe_liveness(&self, kind: ProcessorKind) -> bool {
        let url = self.endpoints.liveness_url(kind);
        match self
            .http
            .get(url)
            .timeout(self.timeouts.liveness)
            .send()
            .await
        {
            Ok(response) => response.status() == StatusCode::OK,
            Err(_) => false,
        }
    }
}

#[async_trait]
impl ProcessorApi for ProcessorGateway {
    async fn submit_payment(
        &self,
        kind: ProcessorKind,
        payment: &PaymentRequest,
    ) -> ProcessorOutcome {
        let body = OutboundPayment {
            correlation_id: &payment.correlation_id,
            amount: payment.amount,
            requested_at: format_millis_utc(payment.requested_at),
        };

        let response = self
            .http
            .post(self.endpoints.payments_url(kind))
            .timeout(self.timeouts.payment)
            .json(&body)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => ProcessorOutcome::Success,
            Ok(response) if response.status() == StatusCode::UNPROCESSABLE_ENTITY => {
                tracing::debug!(
                    processor = %kind,
                    correlation_id = %payment.correlation_id,
                    "processor declined the payment"
                );
                ProcessorOutcome::Unavailable
            }
            Ok(response) => {
                tracing::debug!(
                    processor = %kind,
                    correlation_id = %payment.correlation_id,
                    status = %response.status(),
                    "processor call failed"
                );
                ProcessorOutcome::Failed
            }
            Err(e) => {
                tracing::debug!(
                    processor = %kind,
                    correlation_id = %payment.correlation_id,
                    error = %e,
                    "processor call failed"
                );
                ProcessorOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use time::macros::datetime;

    fn endpoints() -> ProcessorEndpoints {
        ProcessorEndpoints {
            default: "http://payment-processor-default:8080".parse().unwrap(),
            fallback: "http://payment-processor-fallback:8080/".parse().unwrap(),
        }
    }

    #[test]
    fn builds_urls_regardless_of_trailing_slash() {
        let endpoints = endpoints();
        assert_eq!(
            endpoints.payments_url(ProcessorKind::Default),
            "http://payment-processor-default:8080/payments"
        );
        assert_eq!(
            endpoints.payments_url(ProcessorKind::Fallback),
            "http://payment-processor-fallback:8080/payments"
        );
        assert_eq!(
            endpoints.liveness_url(ProcessorKind::Default),
            "http://payment-processor-default:8080/payments/service-health"
        );
    }

    #[test]
    fn outbound_body_is_minimal_and_camel_cased() {
        let payment = PaymentRequest {
            correlation_id: "a1".to_string(),
            amount: "19.90".parse().unwrap(),
            requested_at: datetime!(2025-07-01 12:00:00.250 UTC),
            retry_count: 3,
        };
        let body = OutboundPayment {
            correlation_id: &payment.correlation_id,
            amount: payment.amount,
            requested_at: format_millis_utc(payment.requested_at),
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["correlationId"], "a1");
        assert_eq!(value["amount"], 19.9);
        assert_eq!(value["requestedAt"], "2025-07-01T12:00:00.250Z");
        assert_eq!(value.as_object().unwrap().len(), 3);
    }
}
