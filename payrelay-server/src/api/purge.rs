//! `POST /purge` — wipe the accounting index and the work queue.
//!
//! Administrative convenience for test environments; not production-safe.

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use payrelay_core::store::PaymentStore;

pub async fn purge(State(state): State<AppState>) -> Response {
    match state.store.purge().await {
        Ok(()) => (StatusCode::OK, "store purged").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to purge store");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
