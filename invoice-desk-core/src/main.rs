use std::sync::Arc;

use dotenv::dotenv;
use invoice_desk_core::actions::{InvoiceActions, InvoiceQueries};
use invoice_desk_core::auth::{CredentialsProvider, PgUserDirectory, SessionKeys};
use invoice_desk_core::config::Config;
use invoice_desk_core::db::{create_pool, run_migrations};
use invoice_desk_core::effects::ViewCache;
use invoice_desk_core::models::Invoice;
use invoice_desk_core::routes::{create_router, AppState};
use invoice_desk_core::store::{InvoiceStore, PgInvoiceStore};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(LevelFilter::INFO.into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    info!("Starting Invoice Desk server...");

    let config = Config::from_env()?;

    // Initialize database connection pool
    let db_pool = create_pool(&config.database_url, config.database_max_connections).await?;
    run_migrations(&db_pool).await?;

    let store: Arc<dyn InvoiceStore> = Arc::new(PgInvoiceStore::new(db_pool.clone()));
    let listing: ViewCache<Vec<Invoice>> = ViewCache::new();
    let sessions = SessionKeys::new(&config.jwt_secret, config.session_ttl_hours)
        .with_secure_cookie(config.session_cookie_secure);

    let invoices = InvoiceActions::new(store.clone(), Arc::new(listing.clone()))
        .with_error_detail(config.expose_error_detail);

    // Create application state
    let app_state = AppState {
        store: store.clone(),
        invoices: Arc::new(invoices),
        queries: InvoiceQueries::new(store, listing),
        identity: Arc::new(CredentialsProvider::new(
            PgUserDirectory::new(db_pool),
            sessions.clone(),
        )),
        sessions,
    };

    // Create router
    let app = create_router(app_state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", address, e))?;

    info!("Server listening on {}", address);

    // Start the server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Invoice Desk server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down gracefully...");
}
