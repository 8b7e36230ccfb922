//! Payment relay server.
//!
//! Accepts payment requests over HTTP, queues them in Redis, and dispatches
//! them across two redundant external payment processors, keeping a
//! time-ordered accounting record for summary reporting.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use anyhow::Context;
use clap::Parser;
use config::Args;
use payrelay_core::gateway::{GatewayTimeouts, ProcessorEndpoints, ProcessorGateway};
use payrelay_core::router::FallbackRouter;
use payrelay_core::store::redis::RedisStore;
use payrelay_core::workers::WorkerPool;
use server::{build_router, run_server};
use state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting payrelay-server v{}", env!("CARGO_PKG_VERSION"));

    // The store backs both the work queue and the accounting index; fail
    // fast if it is unreachable.
    let store = RedisStore::connect(&args.redis_url)
        .await
        .context("failed to connect to the payment store")?;
    tracing::info!("Payment store connection established");

    // One explicitly constructed outbound client, injected into the gateway;
    // its connections are reused across all workers and released when the
    // process exits.
    let http = reqwest::Client::builder()
        .pool_max_idle_per_host(30)
        .pool_idle_timeout(Duration::from_secs(300))
        .connect_timeout(Duration::from_millis(500))
        .build()
        .context("failed to build the outbound HTTP client")?;

    let endpoints = ProcessorEndpoints {
        default: args.processor_default_url.clone(),
        fallback: args.processor_fallback_url.clone(),
    };
    let gateway = ProcessorGateway::new(http, endpoints, GatewayTimeouts::default());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let pool = WorkerPool::new(
        store.clone(),
        FallbackRouter::new(gateway),
        args.workers,
        args.max_concurrent_calls,
        shutdown_rx,
    );
    let workers = pool.spawn();
    tracing::info!(
        workers = args.workers,
        max_concurrent_calls = args.max_concurrent_calls,
        "Worker pool started"
    );

    let app = build_router(AppState::new(store));

    // The same signal both drains the HTTP server and stops the workers.
    let shutdown_tx = Arc::new(shutdown_tx);
    let signal_tx = Arc::clone(&shutdown_tx);
    let shutdown = async move {
        shutdown::shutdown_signal().await;
        let _ = signal_tx.send(true);
    };

    let result = run_server(app, args.listen, shutdown).await;

    // Idempotent when the signal already fired; also covers an early server
    // error, so the workers never outlive the listener.
    let _ = shutdown_tx.send(true);
    tracing::info!("Waiting for workers to finish in-flight payments...");
    for handle in workers {
        let _ = handle.await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
