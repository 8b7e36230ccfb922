//! Two-step failover routing across the processors.

use crate::entities::payment::PaymentRequest;
use crate::entities::{ProcessorKind, ProcessorLabel};
use crate::gateway::{ProcessorApi, ProcessorOutcome};

/// Decides which processor ends up owning a payment.
///
/// Strict two-step failover, not a retry loop: the default processor is
/// attempted once, and the fallback once more only if that attempt did not
/// succeed. No health signal is consulted and nothing backs off; routing is
/// purely reactive to the live call outcomes. A payment neither processor
/// accepts is terminal and labeled `error`.
pub struct FallbackRouter<G> {
    gateway: G,
}

impl<G: ProcessorApi> FallbackRouter<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Attempt the payment; returns the terminal label. When the label is
    /// `default` or `fallback`, exactly one successful processor call was
    /// made on behalf of this payment.
    pub async fn route(&self, payment: &PaymentRequest) -> ProcessorLabel {
        match self
            .gateway
            .submit_payment(ProcessorKind::Default, payment)
            .await
        {
            ProcessorOutcome::Success => return ProcessorLabel::Default,
            outcome => {
                tracing::debug!(
                    correlation_id = %payment.correlation_id,
                    outcome = ?outcome,
                    "default processor did not accept, trying fallback"
                );
            }
        }

        match self
            .gateway
            .submit_payment(ProcessorKind::Fallback, payment)
            .await
        {
            ProcessorOutcome::Success => ProcessorLabel::Fallback,
            outcome => {
                tracing::warn!(
                    correlation_id = %payment.correlation_id,
                    outcome = ?outcome,
                    "both processors turned the payment down"
                );
                ProcessorLabel::Error
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::gateway::ProcessorOutcome;
    use crate::test_utils::{FakeGateway, payment};
    use std::sync::Arc;

    #[tokio::test]
    async fn healthy_default_takes_every_payment() {
        let gateway = Arc::new(FakeGateway::new(
            ProcessorOutcome::Success,
            ProcessorOutcome::Success,
        ));
        let router = FallbackRouter::new(gateway.clone());

        let label = router.route(&payment("a1", "100.00")).await;

        assert_eq!(label, ProcessorLabel::Default);
        assert_eq!(gateway.calls(), vec![ProcessorKind::Default]);
        assert_eq!(gateway.calls_to(ProcessorKind::Fallback), 0);
    }

    #[tokio::test]
    async fn declining_default_fails_over_to_fallback() {
        let gateway = Arc::new(FakeGateway::new(
            ProcessorOutcome::Unavailable,
            ProcessorOutcome::Success,
        ));
        let router = FallbackRouter::new(gateway.clone());

        let label = router.route(&payment("a1", "50.00")).await;

        assert_eq!(label, ProcessorLabel::Fallback);
        assert_eq!(
            gateway.calls(),
            vec![ProcessorKind::Default, ProcessorKind::Fallback]
        );
    }

    #[tokio::test]
    async fn failing_default_also_fails_over() {
        let gateway = Arc::new(FakeGateway::new(
            ProcessorOutcome::Failed,
            ProcessorOutcome::Success,
        ));
        let router = FallbackRouter::new(gateway.clone());

        let label = router.route(&payment("a1", "50.00")).await;

        assert_eq!(label, ProcessorLabel::Fallback);
    }

    #[tokio::test]
    async fn double_failure_is_terminal() {
        let gateway = Arc::new(FakeGateway::new(
            ProcessorOutcome::Failed,
            ProcessorOutcome::Unavailable,
        ));
        let router = FallbackRouter::new(gateway.clone());

        let label = router.route(&payment("a1", "50.00")).await;

        assert_eq!(label, ProcessorLabel::Error);
        // Each processor was attempted exactly once; no retry loop.
        assert_eq!(gateway.calls_to(ProcessorKind::Default), 1);
        assert_eq!(gateway.calls_to(ProcessorKind::Fallback), 1);
    }
}
