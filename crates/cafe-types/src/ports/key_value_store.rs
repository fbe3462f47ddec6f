use async_trait::async_trait;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store error: {0}")]
    Backend(String),
}

/// String-keyed, string-valued persistent map used as the local fallback.
///
/// Values are whole-collection JSON blobs; callers own the encoding.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn put(&self, key: &str, value: String) -> Result<(), StoreError>;
}
