//! Apunta API Server
//!
//! Main entry point for the shared-expense ledger service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apunta_api::{AppState, create_router};
use apunta_core::currency::RateReconciler;
use apunta_core::storage::DocumentStore;
use apunta_rates::OpenExchangeRatesClient;
use apunta_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apunta=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Open the document store
    let store = DocumentStore::local_fs(&config.storage.root, &config.storage.document)?;
    let document = store.load_or_new(config.ledger.base_currency.clone()).await?;
    info!(
        path = %config.document_path().display(),
        base = %document.base_currency,
        months = document.months.len(),
        "Document loaded"
    );

    // Create the rate source
    let client = OpenExchangeRatesClient::from_config(&config.rates);
    if !client.has_app_id() {
        warn!("No Open Exchange Rates app id configured, rate fetches will fail");
    }
    let reconciler = RateReconciler::new(Arc::new(client))
        .with_concurrency(config.ledger.fetch_concurrency);
    info!(
        base_url = %config.rates.base_url,
        concurrency = reconciler.concurrency(),
        "Rate source configured"
    );

    // Create application state and router
    let state = AppState::new(document, store, reconciler);
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
