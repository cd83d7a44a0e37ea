//! Rewards Wallet API Server
//!
//! Main entry point for the wallet backend service.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wallet_api::{AppState, create_router};
use wallet_core::identity::{EmailLookup, NullEmailLookup};
use wallet_core::wallet::{AccountStore, WalletService};
use wallet_shared::AppConfig;
use wallet_store::{HttpEmailLookup, MemoryStore, PgStore, connect};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallet=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Pick the store backend
    let store: Arc<dyn AccountStore> = match &config.database {
        Some(db) => {
            let pool = connect(&db.url, db.max_connections).await?;
            let store = PgStore::new(pool);
            store.migrate().await?;
            info!("Connected to database");
            Arc::new(store)
        }
        None => {
            warn!("no database configured, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    // Pick the identity lookup
    let identity: Arc<dyn EmailLookup> = match &config.identity {
        Some(identity) => {
            info!(base_url = %identity.base_url, "Identity provider configured");
            Arc::new(HttpEmailLookup::new(
                identity.base_url.clone(),
                Duration::from_secs(identity.timeout_secs),
            )?)
        }
        None => Arc::new(NullEmailLookup),
    };

    // Create the wallet service
    let wallet = WalletService::new(store, identity, config.wallet.commission_rate);
    info!(commission_rate = %config.wallet.commission_rate, "Wallet service configured");

    // Create application state
    let state = AppState {
        wallet: Arc::new(wallet),
    };

    // Create router
    let app = create_router(state, &config.server.allowed_origins);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
