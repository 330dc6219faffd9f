//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Swap the view registry when a new config arrives
//! - Stop on the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::DashboardConfig;
use crate::http::handlers;
use crate::http::request::request_id_middleware;
use crate::lapis::{LapisClient, LapisResult};
use crate::lifecycle::ShutdownSignal;
use crate::routing::Registry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ArcSwap<Registry>>,
    pub lapis: LapisClient,
}

/// HTTP server for the dashboard route API.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: DashboardConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: DashboardConfig) -> LapisResult<Self> {
        let registry = Registry::from_config(&config.organisms);
        let lapis = LapisClient::new(Duration::from_secs(config.lapis.timeout_secs))?;

        let state = AppState {
            registry: Arc::new(ArcSwap::from_pointee(registry)),
            lapis,
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            state,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DashboardConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/organisms", get(handlers::list_organisms))
            .route("/api/route", get(handlers::resolve_route))
            .route("/api/aggregated", get(handlers::aggregated))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configs received on `config_updates` replace the registry. Returns
    /// once `shutdown` fires and in-flight requests have finished.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<DashboardConfig>,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let reload = tokio::spawn(apply_config_updates(
            self.state.registry.clone(),
            config_updates,
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        reload.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn apply_config_updates(
    registry: Arc<ArcSwap<Registry>>,
    mut updates: mpsc::UnboundedReceiver<DashboardConfig>,
) {
    while let Some(config) = updates.recv().await {
        let next = Registry::from_config(&config.organisms);
        tracing::info!(
            organisms = config.organisms.len(),
            views = next.views().count(),
            "View registry reloaded"
        );
        registry.store(Arc::new(next));
    }
}
