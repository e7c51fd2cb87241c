use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_api::{
    config::Config,
    db::{self, KeyValueStore, MemoryStore},
    routes::{create_router, AppState},
    services::PgCatalog,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to the catalog database")?;
    db::run_migrations(&pool).await?;

    let storage: Arc<dyn KeyValueStore> = match &config.redis_url {
        Some(url) => Arc::new(
            db::create_redis_store(url)
                .await
                .context("Failed to connect to Redis")?,
        ),
        None => {
            tracing::warn!("REDIS_URL not set, reading history is kept in process memory");
            Arc::new(MemoryStore::new())
        }
    };

    let catalog = Arc::new(PgCatalog::new(pool, config.catalog_retry_policy()));
    let address = config.bind_address();

    tracing::info!(storage = storage.name(), "Initializing application state");
    let state = Arc::new(AppState::new(catalog, storage, config));
    let app = create_router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Server running on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
