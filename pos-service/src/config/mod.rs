//! Configuration module for pos-service.

use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PosConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Firebase Realtime Database over REST.
    Realtime,
    /// Process-local tree; contents are lost on restart.
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Realtime => "realtime",
            StoreBackend::Memory => "memory",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "realtime" => Some(StoreBackend::Realtime),
            "memory" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub auth_token: Option<Secret<String>>,
    pub timeout: Duration,
}

impl PosConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let backend = match env::var("STORE_BACKEND") {
            Ok(raw) => StoreBackend::from_string(&raw).ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!(
                    "STORE_BACKEND must be 'realtime' or 'memory', got '{}'",
                    raw
                ))
            })?,
            Err(_) => StoreBackend::Realtime,
        };

        let url = env::var("STORE_URL").unwrap_or_default();
        if backend == StoreBackend::Realtime && url.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "STORE_URL is required for the realtime store backend"
            )));
        }

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "pos-service".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            store: StoreConfig {
                backend,
                url,
                auth_token: env::var("STORE_AUTH_TOKEN")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .map(Secret::new),
                timeout: Duration::from_secs(
                    env::var("STORE_TIMEOUT_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(30),
                ),
            },
        })
    }

    /// In-memory configuration on an ephemeral port, for tests and demos.
    pub fn in_memory() -> Self {
        Self {
            common: core_config::Config {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            service_name: "pos-service".to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            store: StoreConfig {
                backend: StoreBackend::Memory,
                url: String::new(),
                auth_token: None,
                timeout: Duration::from_secs(30),
            },
        }
    }
}
