mod auth;
mod config;
mod error;
mod middleware;
mod routes;
mod state;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use vitae_core::identity::jwt::JwtIdentity;
use vitae_core::store::memory::MemoryStore;
use vitae_core::store::postgres::PostgresStore;
use vitae_core::store::DocumentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience)
    let _ = dotenvy::dotenv();

    // Load configuration; refuses to start without the admin secret.
    let config = config::AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    tracing::info!("Starting Vitae intake API server");

    // Pick the document-store backend
    let store: Arc<dyn DocumentStore> = match config.store_backend {
        config::StoreBackend::Postgres => {
            let database_url = config.database_url.clone().ok_or_else(|| {
                anyhow::anyhow!("DATABASE_URL is required for the postgres store backend")
            })?;

            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .min_connections(config.db_min_connections)
                .connect(&database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {e}"))?;

            tracing::info!("Connected to PostgreSQL");

            sqlx::migrate!("../../migrations")
                .run(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;

            tracing::info!("Database migrations applied");

            Arc::new(PostgresStore::new(pool))
        }
        config::StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    // The verifier shares the store for its users directory
    let identity = Arc::new(JwtIdentity::new(&config.jwt_secret, store.clone()));

    // Build application state
    let state = state::AppState::new(store, identity, config.clone());

    // Build router with middleware
    let app = routes::build_router(state)
        .layer(middleware::trace_layer())
        .layer(middleware::cors_layer())
        .layer(middleware::body_limit_layer(config.max_body_bytes));

    // Start server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("Received Ctrl+C, shutting down..."); }
        _ = terminate => { tracing::info!("Received SIGTERM, shutting down..."); }
    }
}
