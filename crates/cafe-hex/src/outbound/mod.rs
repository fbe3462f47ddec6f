//! Outbound adapters: completion service and cloud document store wiring.

pub mod document_store;
pub mod gemini;

use std::sync::Arc;

use async_trait::async_trait;
use cafe_types::ports::completion::{CompletionError, CompletionService};
use cafe_types::ports::remote_store::RemoteStore;

use crate::config::{CompletionConfig, RemoteConfig};

/// Stand-in used when no completion key is configured. Every request fails
/// with [`CompletionError::NotConfigured`], so the adapters degrade the same
/// way they do on a network error.
pub struct UnconfiguredCompletion;

#[async_trait]
impl CompletionService for UnconfiguredCompletion {
    async fn generate_json(
        &self,
        _: &str,
        _: serde_json::Value,
    ) -> Result<serde_json::Value, CompletionError> {
        Err(CompletionError::NotConfigured)
    }

    async fn chat(&self, _: &str, _: &str) -> Result<String, CompletionError> {
        Err(CompletionError::NotConfigured)
    }
}

pub fn build_completion(
    config: Option<&CompletionConfig>,
) -> anyhow::Result<Arc<dyn CompletionService>> {
    match config {
        Some(cfg) => Ok(Arc::new(gemini::GeminiClient::new(cfg)?)),
        None => {
            tracing::info!("completion service not configured, barista features will apologise");
            Ok(Arc::new(UnconfiguredCompletion))
        }
    }
}

pub fn build_remote(config: Option<&RemoteConfig>) -> anyhow::Result<Option<Arc<dyn RemoteStore>>> {
    match config {
        Some(cfg) => {
            let store: Arc<dyn RemoteStore> =
                Arc::new(document_store::HttpDocumentStore::new(&cfg.base_url, &cfg.api_key)?);
            Ok(Some(store))
        }
        None => {
            tracing::info!("remote store not configured, operating in local mode");
            Ok(None)
        }
    }
}
