//! cirelay web server.
//!
//! Provides an Axum-based HTTP server with:
//! - `POST /webhook` for GitHub deliveries
//! - `GET /health` for liveness probes

pub mod api;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use cirelay_core::config::AppConfig;
use cirelay_core::dispatch::WebhookDispatcher;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub config: AppConfig,
    pub dispatcher: WebhookDispatcher,
}

/// The web server.
pub struct WebServer {
    state: Arc<AppState>,
}

impl WebServer {
    /// Create a new web server with the given dependencies.
    pub fn new(config: AppConfig, dispatcher: WebhookDispatcher) -> Self {
        Self {
            state: Arc::new(AppState { config, dispatcher }),
        }
    }

    /// Build the router with all routes and middleware attached.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(api::health::routes())
            .merge(api::webhooks::routes())
            .layer(DefaultBodyLimit::max(self.state.config.server.body_limit_bytes))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the web server on `addr` and run until `shutdown` resolves.
    pub async fn start<F>(self, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        info!(addr = %addr, "starting web server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("web server stopped");
        Ok(())
    }
}
