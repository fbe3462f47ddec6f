use async_trait::async_trait;
use cafe_types::ports::key_value_store::{KeyValueStore, StoreError};
use cafe_types::ports::remote_store::{CreatedDocument, Document, RemoteError, RemoteStore};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone)]
pub struct MemoryStore {
    pub map: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            map: Arc::new(DashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.map.get(key).map(|r| r.value().clone()))
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.map.insert(key.to_string(), value);
        Ok(())
    }
}

/// In-process stand-in for the cloud document store.
///
/// `fail_with` makes every subsequent call return the given error until
/// cleared, which lets callers drive the unreachable and permission-denied
/// paths deterministically.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<DashMap<String, Vec<Document>>>,
    failure: Arc<RwLock<Option<RemoteError>>>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_with(&self, error: Option<RemoteError>) {
        *self.failure.write().await = error;
    }

    /// Number of calls made against the store, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .get(collection)
            .map(|docs| docs.value().clone())
            .unwrap_or_default()
    }

    async fn check(&self) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.read().await.as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteStore for InMemoryDocumentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, RemoteError> {
        self.check().await?;
        Ok(self.documents(collection))
    }

    async fn upsert(
        &self,
        collection: &str,
        id: &str,
        fields: serde_json::Value,
    ) -> Result<(), RemoteError> {
        self.check().await?;
        let mut docs = self.collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.fields = fields,
            None => docs.push(Document {
                id: id.to_string(),
                fields,
            }),
        }
        Ok(())
    }

    async fn create(
        &self,
        collection: &str,
        fields: serde_json::Value,
    ) -> Result<CreatedDocument, RemoteError> {
        self.check().await?;
        let id = Uuid::new_v4().simple().to_string();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                fields,
            });
        Ok(CreatedDocument {
            id,
            created_at: Utc::now(),
        })
    }
}
