use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The store rejected our credentials or rules; not worth retrying.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("remote unavailable: {0}")]
    Unavailable(String),

    #[error("malformed remote response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: serde_json::Value,
}

/// Identifier and server timestamp assigned to a newly created document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedDocument {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Cloud document store holding the menu and orders collections.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, RemoteError>;

    async fn upsert(
        &self,
        collection: &str,
        id: &str,
        fields: serde_json::Value,
    ) -> Result<(), RemoteError>;

    async fn create(
        &self,
        collection: &str,
        fields: serde_json::Value,
    ) -> Result<CreatedDocument, RemoteError>;
}
