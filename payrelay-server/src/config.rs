//! Command-line and environment configuration.

use clap::Parser;
use std::net::SocketAddr;
use url::Url;

/// Payment relay - queues incoming payments and dispatches them across two
/// redundant payment processors.
#[derive(Parser, Debug, Clone)]
#[command(name = "payrelay-server")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address to listen on.
    #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:9999")]
    pub listen: SocketAddr,

    /// Redis instance holding the work queue and the accounting index.
    #[arg(long, env = "REDIS_URL", default_value = "redis://localhost:6379/0")]
    pub redis_url: String,

    /// Base URL of the default payment processor.
    #[arg(
        long,
        env = "PROCESSOR_DEFAULT_URL",
        default_value = "http://payment-processor-default:8080"
    )]
    pub processor_default_url: Url,

    /// Base URL of the fallback payment processor.
    #[arg(
        long,
        env = "PROCESSOR_FALLBACK_URL",
        default_value = "http://payment-processor-fallback:8080"
    )]
    pub processor_fallback_url: Url,

    /// Number of queue-draining worker loops.
    #[arg(long, env = "WORKERS", default_value_t = 3)]
    pub workers: usize,

    /// Cap on concurrent outbound processor calls across all workers.
    #[arg(long, env = "MAX_CONCURRENT_CALLS", default_value_t = 10)]
    pub max_concurrent_calls: usize,
}
