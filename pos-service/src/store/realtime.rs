use super::{into_collection, Document, RecordStore, StoreError};
use crate::services::metrics::STORE_CALL_DURATION;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// Firebase Realtime Database REST adapter.
///
/// Every path maps to `{base_url}/{path}.json`: `GET` reads, `PUT` overwrites
/// and `PATCH` merges fields.
pub struct RealtimeDbStore {
    base_url: String,
    auth_token: Option<Secret<String>>,
    client: Client,
}

impl RealtimeDbStore {
    pub fn new(
        base_url: impl Into<String>,
        auth_token: Option<Secret<String>>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Connection(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.client.request(method, self.url(path));
        match &self.auth_token {
            Some(token) => request.query(&[("auth", token.expose_secret().as_str())]),
            None => request,
        }
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response, StoreError> {
        let timer = STORE_CALL_DURATION
            .with_label_values(&[operation])
            .start_timer();

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Connection(format!("{} failed: {}", operation, e)))?;

        timer.observe_duration();

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        Ok(response)
    }

    async fn read_value(&self, operation: &str, path: &str) -> Result<Value, StoreError> {
        let response = self.send(operation, self.request(Method::GET, path)).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::Decode(format!("Invalid JSON at {}: {}", path, e)))
    }
}

#[async_trait]
impl RecordStore for RealtimeDbStore {
    #[instrument(skip(self))]
    async fn read_all(&self, collection: &str) -> Result<Option<Document>, StoreError> {
        let value = self.read_value("read_all", collection).await?;
        let children = into_collection(value)?;
        debug!(
            children = children.as_ref().map_or(0, |c| c.len()),
            "Collection read"
        );
        Ok(children)
    }

    #[instrument(skip(self))]
    async fn read_one(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let value = self.read_value("read_one", path).await?;
        Ok(if value.is_null() { None } else { Some(value) })
    }

    #[instrument(skip(self, document))]
    async fn write_full(&self, path: &str, document: &Value) -> Result<(), StoreError> {
        self.send("write_full", self.request(Method::PUT, path).json(document))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, fields))]
    async fn write_fields(&self, path: &str, fields: &Document) -> Result<(), StoreError> {
        self.send("write_fields", self.request(Method::PATCH, path).json(fields))
            .await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let request = self
            .request(Method::GET, super::paths::HEADER_COLLECTION)
            .query(&[("shallow", "true")]);
        self.send("health_check", request).await?;
        Ok(())
    }
}
