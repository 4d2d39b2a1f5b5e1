//! Application startup and lifecycle management.

use crate::config::{PosConfig, StoreBackend, StoreConfig};
use crate::handlers::{cart, health, invoices};
use crate::services::{init_metrics, PosEngine};
use crate::store::{MemoryStore, RealtimeDbStore, RecordStore};
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::request_id_middleware;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<PosEngine>>,
    pub store: Arc<dyn RecordStore>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application, connecting to the configured store.
    pub async fn build(config: PosConfig) -> Result<Self, AppError> {
        let store = connect_store(&config.store)?;
        Self::build_with_store(config, store).await
    }

    /// Build the application on top of an existing store.
    pub async fn build_with_store(
        config: PosConfig,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self, AppError> {
        init_metrics();

        let engine = PosEngine::start(store.clone()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to start register session");
            AppError::from(e)
        })?;

        let addr = (config.common.host.as_str(), config.common.port);
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, host = %config.common.host, port = config.common.port, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, "pos-service listener bound");

        Ok(Self {
            port,
            listener,
            state: AppState {
                engine: Arc::new(Mutex::new(engine)),
                store,
            },
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Handle to the register engine, shared with the HTTP handlers.
    pub fn engine(&self) -> Arc<Mutex<PosEngine>> {
        self.state.engine.clone()
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        tracing::info!(
            service = "pos-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, router).await.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics_handler))
        .route("/cart", get(cart::get_cart))
        .route("/cart/draft", get(cart::get_draft).put(cart::put_draft))
        .route("/cart/draft/clear", post(cart::clear_draft))
        .route("/cart/draft/add", post(cart::add_draft_line))
        .route("/cart/lines", post(cart::add_line))
        .route(
            "/cart/lines/:line_id",
            put(cart::edit_line).delete(cart::delete_line),
        )
        .route("/checkout", post(cart::checkout))
        .route("/invoices", get(invoices::list_invoices))
        .route("/invoices/:invoice_no", get(invoices::view_invoice))
        .route("/invoices/view/reprint", post(invoices::request_reprint))
        .route("/invoices/view/close", post(invoices::close_view))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

fn connect_store(config: &StoreConfig) -> Result<Arc<dyn RecordStore>, AppError> {
    tracing::info!(backend = config.backend.as_str(), "Connecting record store");

    match config.backend {
        StoreBackend::Realtime => {
            let store = RealtimeDbStore::new(
                config.url.clone(),
                config.auth_token.clone(),
                config.timeout,
            )
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory record store, invoices will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
