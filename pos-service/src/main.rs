//! pos-service entry point.

use pos_service::config::PosConfig;
use pos_service::services::init_metrics;
use pos_service::startup::Application;

use service_core::observability::init_tracing;
use service_core::shutdown::shutdown_signal;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load configuration
    let config = PosConfig::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    // Initialize tracing
    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        otlp_endpoint = ?config.otlp_endpoint,
        "Starting pos-service"
    );

    // Initialize metrics
    init_metrics();

    // Log configuration (the store auth token is never printed)
    tracing::info!(
        service_name = %config.service_name,
        http_host = %config.common.host,
        http_port = %config.common.port,
        store_backend = config.store.backend.as_str(),
        store_url = %config.store.url,
        store_timeout_secs = config.store.timeout.as_secs(),
        store_auth = config.store.auth_token.is_some(),
        "Configuration loaded"
    );

    // Build and run application
    let app = Application::build(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application");
        std::io::Error::other(format!("Application build error: {}", e))
    })?;

    // Run with graceful shutdown
    tokio::select! {
        result = app.run_until_stopped() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Application error");
                return Err(e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("Graceful shutdown initiated");
        }
    }

    tracing::info!("Service shutdown complete");
    Ok(())
}
