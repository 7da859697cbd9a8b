//! Router construction and the serve loop.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post, put};
use axum::Router;
use coinrush_core::{AllowanceDefaults, Clock};
use coinrush_service::{AccountProvisioner, AllowanceManager, ScoreLedger};
use coinrush_store::AccountRepository;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::handlers;

/// Shared handler state: the three services over one repository handle
#[derive(Clone)]
pub struct AppState {
    /// Account creation/update entry point
    pub provisioner: Arc<AccountProvisioner>,
    /// Allowance window manager
    pub allowance: Arc<AllowanceManager>,
    /// Score ledger
    pub ledger: Arc<ScoreLedger>,
}

impl AppState {
    /// Wire the services over an injected repository and clock
    pub fn new(
        repo: Arc<dyn AccountRepository>,
        clock: Arc<dyn Clock>,
        defaults: AllowanceDefaults,
    ) -> Self {
        Self {
            provisioner: Arc::new(AccountProvisioner::new(
                repo.clone(),
                clock.clone(),
                defaults,
            )),
            allowance: Arc::new(AllowanceManager::new(repo.clone(), clock.clone(), defaults)),
            ledger: Arc::new(ScoreLedger::new(repo, clock)),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/account/setup", post(handlers::setup_account))
        .route("/api/account", get(handlers::get_account))
        .route("/api/account/username", put(handlers::update_username))
        .route("/api/account/record-spend", post(handlers::record_spend))
        .route(
            "/api/highscore",
            post(handlers::submit_score).get(handlers::leaderboard),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Bind `bind_address` and serve requests until shutdown
pub async fn serve(bind_address: &str, state: AppState) -> Result<()> {
    let addr: SocketAddr = bind_address.parse()?;
    info!("Starting coinrush server on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}
