use super::{into_collection, Document, RecordStore, StoreError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// In-process document tree with the same path semantics as the realtime
/// database. Backs the `memory` store backend and the test suites.
pub struct MemoryStore {
    root: RwLock<Value>,
    full_writes: AtomicU64,
    field_writes: AtomicU64,
    write_ordinal: AtomicU64,
    // 1-based ordinal of the write that should fail; 0 disables injection.
    fail_on_write: AtomicU64,
    read_ordinal: AtomicU64,
    // Same, for reads.
    fail_on_read: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Value::Object(Map::new())),
            full_writes: AtomicU64::new(0),
            field_writes: AtomicU64::new(0),
            write_ordinal: AtomicU64::new(0),
            fail_on_write: AtomicU64::new(0),
            read_ordinal: AtomicU64::new(0),
            fail_on_read: AtomicU64::new(0),
        }
    }

    /// Place a document without counting it as a write.
    pub async fn seed(&self, path: &str, document: Value) {
        let mut root = self.root.write().await;
        *slot(&mut root, path) = document;
    }

    /// Snapshot of the value at `path`.
    pub async fn snapshot(&self, path: &str) -> Option<Value> {
        let root = self.root.read().await;
        lookup(&root, path).filter(|v| !v.is_null()).cloned()
    }

    pub fn full_write_count(&self) -> u64 {
        self.full_writes.load(Ordering::SeqCst)
    }

    pub fn field_write_count(&self) -> u64 {
        self.field_writes.load(Ordering::SeqCst)
    }

    /// Make the `n`-th write from now on fail with a connection error.
    pub fn fail_nth_write(&self, n: u64) {
        let done = self.write_ordinal.load(Ordering::SeqCst);
        self.fail_on_write.store(done + n, Ordering::SeqCst);
    }

    /// Make the `n`-th read from now on fail with a connection error.
    pub fn fail_nth_read(&self, n: u64) {
        let done = self.read_ordinal.load(Ordering::SeqCst);
        self.fail_on_read.store(done + n, Ordering::SeqCst);
    }

    pub fn clear_failure(&self) {
        self.fail_on_write.store(0, Ordering::SeqCst);
        self.fail_on_read.store(0, Ordering::SeqCst);
    }

    fn admit_read(&self, path: &str) -> Result<(), StoreError> {
        let ordinal = self.read_ordinal.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_read.load(Ordering::SeqCst) == ordinal {
            return Err(StoreError::Connection(format!(
                "injected failure reading {}",
                path
            )));
        }
        Ok(())
    }

    fn admit_write(&self, path: &str) -> Result<(), StoreError> {
        let ordinal = self.write_ordinal.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_write.load(Ordering::SeqCst) == ordinal {
            return Err(StoreError::Connection(format!(
                "injected failure writing {}",
                path
            )));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path).try_fold(root, |node, segment| node.get(segment))
}

fn slot<'a>(root: &'a mut Value, path: &str) -> &'a mut Value {
    // Indexing a null value with a key turns it into an object.
    segments(path).fold(root, |node, segment| {
        if !node.is_object() {
            *node = Value::Null;
        }
        &mut node[segment]
    })
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn read_all(&self, collection: &str) -> Result<Option<Document>, StoreError> {
        self.admit_read(collection)?;
        let root = self.root.read().await;
        match lookup(&root, collection) {
            Some(value) => into_collection(value.clone()),
            None => Ok(None),
        }
    }

    async fn read_one(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.admit_read(path)?;
        Ok(self.snapshot(path).await)
    }

    async fn write_full(&self, path: &str, document: &Value) -> Result<(), StoreError> {
        self.admit_write(path)?;
        let mut root = self.root.write().await;
        *slot(&mut root, path) = document.clone();
        self.full_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn write_fields(&self, path: &str, fields: &Document) -> Result<(), StoreError> {
        self.admit_write(path)?;
        let mut root = self.root.write().await;
        let target = slot(&mut root, path);
        if !target.is_object() {
            *target = Value::Object(Map::new());
        }
        if let Value::Object(map) = target {
            for (key, value) in fields {
                map.insert(key.clone(), value.clone());
            }
        }
        self.field_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
