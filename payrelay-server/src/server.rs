//! Axum server setup and router configuration.

use crate::api;
use crate::state::AppState;
use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/payments", post(api::create_payment::create_payment))
        .route(
            "/payments-summary",
            get(api::payments_summary::payments_summary),
        )
        .route("/purge", post(api::purge::purge))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Liveness only; no dependency is checked.
async fn health_check() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// Run the server until the shutdown future completes, then drain.
pub async fn run_server(
    router: Router,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
