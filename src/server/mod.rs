use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{StudioError, StudioResult};
use crate::store::graph::GraphStore;
use crate::translate::IntentTranslator;

pub mod handlers;

#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<IntentTranslator>,
    pub graph: Arc<dyn GraphStore>,
}

impl AppState {
    pub fn new(translator: IntentTranslator, graph: Arc<dyn GraphStore>) -> Self {
        Self {
            translator: Arc::new(translator),
            graph,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/strategies", get(handlers::strategies))
        .route("/translate", post(handlers::translate))
        .route("/classify", post(handlers::classify))
        .route("/extract", post(handlers::extract))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn run_http_server(config: &ServerConfig, state: AppState) -> StudioResult<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|err| StudioError::Internal(format!("invalid server address: {err}")))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| StudioError::Internal(format!("failed to bind server: {err}")))?;

    info!(%addr, "http server listening");
    axum::serve(listener, build_router(state))
        .await
        .map_err(|err| StudioError::Internal(format!("server error: {err}")))?;

    Ok(())
}
