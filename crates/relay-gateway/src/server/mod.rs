//! Gateway server setup
//!
//! Provides the router, state construction and the serving loop.

mod handler;
mod state;

pub use handler::{gateway_handler, SocketParams};
pub use state::GatewayState;

use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use relay_common::{AppConfig, AppError, AppResult, CorsConfig};
use relay_core::{MessageIdGenerator, MessageStore};
use relay_db::{MemoryMessageStore, PgMessageStore, PoolConfig};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/socket", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the CORS layer from configured origins
///
/// No configured origins accepts any origin without credentials.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST]);

    if config.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins).allow_credentials(true)
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    let cors = cors_layer(&state.config().cors);

    create_router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize the store and create `GatewayState`
///
/// Uses PostgreSQL when a database is configured, otherwise the in-memory store.
pub async fn create_gateway_state(config: AppConfig) -> AppResult<GatewayState> {
    let ids = Arc::new(MessageIdGenerator::new(config.relay.worker_id));

    let store: Arc<dyn MessageStore> = match &config.database {
        Some(database) => {
            tracing::info!("Connecting to PostgreSQL...");
            let pool = relay_db::create_pool(&PoolConfig::from(database))
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            relay_db::ensure_schema(&pool)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            tracing::info!("PostgreSQL connection established");

            Arc::new(PgMessageStore::new(pool, ids))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; messages and profiles are kept in memory only");
            Arc::new(MemoryMessageStore::new(ids))
        }
    };

    Ok(GatewayState::new(store, config))
}

/// Serve until `shutdown` resolves
pub async fn serve_until<F>(app: Router, listener: TcpListener, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Server(format!("Server error: {e}")))
}

/// Run the gateway server until Ctrl-C
pub async fn run_server(app: Router, listener: TcpListener) -> AppResult<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Gateway listening on ws://{}/socket", addr);
    }

    serve_until(app, listener, shutdown_signal()).await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> AppResult<()> {
    let addr = config.gateway.address();

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind to {addr}: {e}")))?;

    let state = create_gateway_state(config).await?;

    run_server(create_app(state), listener).await
}
