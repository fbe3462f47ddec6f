#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a local store feature: `memory` or `sqlite`.");

use async_trait::async_trait;
use cafe_types::ports::key_value_store::{KeyValueStore, StoreError};

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub const DEFAULT_SQLITE_URL: &str = "sqlite://cafe.db";

/// Local fallback store selected by the enabled features.
pub enum LocalStore {
    #[cfg(feature = "memory")]
    Memory(memory::MemoryStore),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteStore),
}

pub async fn build_local_store(url: Option<&str>) -> anyhow::Result<LocalStore> {
    LocalStore::build(url).await
}

impl LocalStore {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    pub async fn build(_: Option<&str>) -> anyhow::Result<Self> {
        Ok(Self::Memory(memory::MemoryStore::new()))
    }

    #[cfg(all(feature = "sqlite", not(feature = "memory")))]
    pub async fn build(database_url: Option<&str>) -> anyhow::Result<Self> {
        let url = database_url.unwrap_or(DEFAULT_SQLITE_URL);
        Ok(Self::Sqlite(sqlite::SqliteStore::new(url).await?))
    }

    // With both backends compiled in, an explicit url selects SQLite.
    #[cfg(all(feature = "sqlite", feature = "memory"))]
    pub async fn build(database_url: Option<&str>) -> anyhow::Result<Self> {
        match database_url {
            Some(url) => Ok(Self::Sqlite(sqlite::SqliteStore::new(url).await?)),
            None => Ok(Self::Memory(memory::MemoryStore::new())),
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            #[cfg(feature = "memory")]
            Self::Memory(_) => "memory",
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => "sqlite",
        }
    }
}

#[async_trait]
impl KeyValueStore for LocalStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            #[cfg(feature = "memory")]
            Self::Memory(store) => store.get(key).await,
            #[cfg(feature = "sqlite")]
            Self::Sqlite(store) => store.get(key).await,
        }
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        match self {
            #[cfg(feature = "memory")]
            Self::Memory(store) => store.put(key, value).await,
            #[cfg(feature = "sqlite")]
            Self::Sqlite(store) => store.put(key, value).await,
        }
    }
}
