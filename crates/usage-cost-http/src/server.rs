//! HTTP server wiring: shared state, router, and the serve loop.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use usage_cost_core::error::{Result, UsageCostError};

use crate::auth::{FunctionKeyAuth, function_key_middleware};
use crate::handlers;

/// Default listen address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen port
pub const DEFAULT_PORT: u16 = 7071;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Function key required on calculation routes, if any
    pub function_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            function_key: None,
        }
    }
}

/// Shared application state
pub struct AppState {
    /// Function-key check for calculation routes
    pub auth: FunctionKeyAuth,
    /// Server start time for uptime reporting
    pub start_time: Instant,
}

impl AppState {
    /// Create new app state
    pub fn new(auth: FunctionKeyAuth) -> Self {
        Self {
            auth,
            start_time: Instant::now(),
        }
    }
}

/// Build the router.
///
/// `POST /` and `POST /api` price a usage batch and sit behind the function-key
/// check; `GET /health` is always open.
pub fn create_router(state: Arc<AppState>) -> Router {
    let calculate = Router::new()
        .route("/", post(handlers::calculate_usage_costs))
        .route("/api", post(handlers::calculate_usage_costs))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            function_key_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(calculate)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP front end for the cost calculator
pub struct HttpServer {
    state: Arc<AppState>,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a server from its configuration
    pub fn new(config: ServerConfig) -> Self {
        let auth = FunctionKeyAuth::new(config.function_key.clone());
        Self {
            state: Arc::new(AppState::new(auth)),
            config,
        }
    }

    /// The router this server serves
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Bind and serve until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| UsageCostError::Server(format!("failed to bind {addr}: {e}")))?;

        info!(
            %addr,
            function_key = self.config.function_key.is_some(),
            "Starting usage-cost HTTP server"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| UsageCostError::Server(e.to_string()))?;

        info!("usage-cost HTTP server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
