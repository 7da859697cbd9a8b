//! Coinrush server binary.

use std::sync::Arc;

use clap::Parser;
use coinrush_core::allowance::{DEFAULT_ALLOWANCE_LIMIT_ETH, DEFAULT_ALLOWANCE_PERIOD_SECONDS};
use coinrush_core::{AllowanceDefaults, Clock, SystemClock};
use coinrush_server::AppState;
use coinrush_store::{AccountRepository, MemoryAccountStore};
use tracing_subscriber::EnvFilter;

/// Wallet-linked arcade account service
#[derive(Debug, Parser)]
#[command(name = "coinrush-server")]
struct Args {
    /// Address to bind the HTTP listener to
    #[arg(long, default_value = "127.0.0.1:8787")]
    bind: String,

    /// Per-window allowance limit in ETH for new accounts
    #[arg(long, default_value_t = DEFAULT_ALLOWANCE_LIMIT_ETH)]
    allowance_limit_eth: f64,

    /// Allowance window length in seconds for new accounts
    #[arg(long, default_value_t = DEFAULT_ALLOWANCE_PERIOD_SECONDS)]
    allowance_period_seconds: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let defaults = AllowanceDefaults {
        limit_eth: args.allowance_limit_eth,
        period_seconds: args.allowance_period_seconds,
    };

    let repo: Arc<dyn AccountRepository> = Arc::new(MemoryAccountStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AppState::new(repo, clock, defaults);

    coinrush_server::serve(&args.bind, state).await
}
