use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use cafe_types::ports::remote_store::{CreatedDocument, Document, RemoteError, RemoteStore};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

const API_KEY_HEADER: &str = "x-api-key";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// REST client for the cloud document store.
///
/// Collections live under `{base}/collections/{name}/documents`.
#[derive(Clone)]
pub struct HttpDocumentStore {
    base: Url,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

impl HttpDocumentStore {
    pub fn new(base_url: &str, api_key: &SecretString) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        api_key: &SecretString,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let mut base = Url::parse(base_url).context("invalid remote store url")?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key.expose_secret())
            .context("invalid remote store api key")?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self { base, client })
    }

    fn url(&self, path: &str) -> Result<Url, RemoteError> {
        self.base
            .join(path)
            .map_err(|e| RemoteError::Malformed(format!("bad document path {path}: {e}")))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify(status, body))
    }
}

fn classify(status: StatusCode, body: String) -> RemoteError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::PermissionDenied(body),
        _ => RemoteError::Unavailable(format!("status {status}: {body}")),
    }
}

fn transport(e: reqwest::Error) -> RemoteError {
    RemoteError::Unavailable(e.to_string())
}

#[async_trait]
impl RemoteStore for HttpDocumentStore {
    #[instrument(skip(self))]
    async fn list(&self, collection: &str) -> Result<Vec<Document>, RemoteError> {
        let res = self
            .client
            .get(self.url(&format!("collections/{collection}/documents"))?)
            .send()
            .await
            .map_err(transport)?;
        let body: ListResponse = Self::check(res)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Malformed(e.to_string()))?;
        Ok(body.documents)
    }

    #[instrument(skip(self, fields))]
    async fn upsert(
        &self,
        collection: &str,
        id: &str,
        fields: serde_json::Value,
    ) -> Result<(), RemoteError> {
        let res = self
            .client
            .put(self.url(&format!("collections/{collection}/documents/{id}"))?)
            .json(&fields)
            .send()
            .await
            .map_err(transport)?;
        Self::check(res).await?;
        Ok(())
    }

    #[instrument(skip(self, fields))]
    async fn create(
        &self,
        collection: &str,
        fields: serde_json::Value,
    ) -> Result<CreatedDocument, RemoteError> {
        let res = self
            .client
            .post(self.url(&format!("collections/{collection}/documents"))?)
            .json(&fields)
            .send()
            .await
            .map_err(transport)?;
        Self::check(res)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Malformed(e.to_string()))
    }
}
