//! `POST /payments` — accept a payment request and queue it.

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use payrelay_core::entities::payment::{PaymentRequest, PaymentSubmission};
use payrelay_core::store::PaymentStore;
use rust_decimal::Decimal;
use time::OffsetDateTime;

/// Stamps `requested_at` and pushes the payment onto the work queue. The
/// caller gets 201 as soon as the item is durable; dispatch happens in the
/// worker pool.
pub async fn create_payment(
    State(state): State<AppState>,
    payload: Result<Json<PaymentSubmission>, JsonRejection>,
) -> Response {
    let Ok(Json(submission)) = payload else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if submission.amount <= Decimal::ZERO {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let payment = PaymentRequest::accepted(submission, OffsetDateTime::now_utc());
    match state.store.enqueue(&payment).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) if e.is_capacity_exhausted() => {
            tracing::warn!(error = %e, "work queue refused the payment, store out of memory");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to enqueue payment");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
