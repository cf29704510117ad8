//! HTTP API
//!
//! Read-only JSON endpoints over the data and models directories, plus a
//! live market snapshot. CORS is fully open.

pub mod forecast;
pub mod handlers;
pub mod live;

#[cfg(test)]
mod tests;

use crate::client::MarketDataProvider;
use crate::config::Config;
use crate::data::DataStore;
use crate::error::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Immutable per-server state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub data: DataStore,
    pub market: Arc<dyn MarketDataProvider>,
}

impl AppState {
    pub fn new(config: Config, market: Arc<dyn MarketDataProvider>) -> Self {
        let data = DataStore::new(config.paths.clone());
        Self {
            config: Arc::new(config),
            data,
            market,
        }
    }
}

/// Create API router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/company-predictions", get(handlers::company_predictions))
        .route("/api/quantum-metrics", get(handlers::quantum_metrics))
        .route("/api/live-metrics", get(handlers::live_metrics))
        .route("/api/model-accuracies", get(handlers::model_accuracies))
        .route("/api/ftse100", get(handlers::ftse100))
        .route("/api/predictions", get(handlers::predictions))
        .route("/api/predictions-last-update", get(handlers::predictions_last_update))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start API server
pub async fn start_server(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = create_router(state);

    tracing::info!("API server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
