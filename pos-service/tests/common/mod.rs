#![allow(dead_code)]

use chrono::Utc;
use pos_service::config::PosConfig;
use pos_service::models::{Cart, DraftLine, InvoiceHeader};
use pos_service::services::PosEngine;
use pos_service::startup::Application;
use pos_service::store::{paths, MemoryStore, RecordStore};
use rust_decimal::Decimal;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_store(Arc::new(MemoryStore::new())).await
    }

    pub async fn spawn_with_store(store: Arc<MemoryStore>) -> Self {
        let app = Application::build_with_store(PosConfig::in_memory(), store.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to answer the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// Engine over a fresh in-memory store.
pub async fn engine_with_store() -> (PosEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = PosEngine::start(store.clone() as Arc<dyn RecordStore>)
        .await
        .expect("Failed to start engine");
    (engine, store)
}

pub fn draft(name: &str, rate: &str, qty: &str, discount: &str) -> DraftLine {
    DraftLine::new(name, rate, qty, discount)
}

/// Store a committed-looking header for `invoice_no` with no details.
pub async fn seed_header(store: &MemoryStore, invoice_no: u64, paid: i64) {
    let header = InvoiceHeader::for_cart(&Cart::new(invoice_no), Decimal::from(paid), Utc::now())
        .expect("header fits");
    store
        .seed(
            &paths::header_path(invoice_no),
            header.to_document().expect("header encodes"),
        )
        .await;
}
