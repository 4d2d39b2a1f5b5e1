//! Remote record store contract and its adapters.
//!
//! The store is a hierarchical key-value document tree. The engine only relies
//! on point reads, full overwrites and partial field merges; there is no
//! transaction or compare-and-set primitive.

mod memory;
pub mod paths;
mod realtime;

pub use memory::MemoryStore;
pub use realtime::RealtimeDbStore;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// A JSON object stored at one path.
pub type Document = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read every child of `collection`, keyed by child name. `None` when the
    /// collection does not exist or is empty.
    async fn read_all(&self, collection: &str) -> Result<Option<Document>, StoreError>;

    /// Read the value at `path`, `None` when absent.
    async fn read_one(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Overwrite `path` with `document`, creating it when absent.
    async fn write_full(&self, path: &str, document: &Value) -> Result<(), StoreError>;

    /// Merge the named `fields` into the document at `path`.
    async fn write_fields(&self, path: &str, fields: &Document) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Normalise a collection snapshot into a keyed map.
///
/// The realtime database returns collections whose keys are mostly sequential
/// integers as JSON arrays, with `null` in the unused slots.
pub(crate) fn into_collection(value: Value) -> Result<Option<Document>, StoreError> {
    let map = match value {
        Value::Null => return Ok(None),
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        other => {
            return Err(StoreError::Decode(format!(
                "expected a collection, found {}",
                other
            )))
        }
    };

    Ok(if map.is_empty() { None } else { Some(map) })
}
