//! Typed HTTP client for the storefront API.

use std::time::Duration;

use anyhow::Context;
use cafe_types::domain::cart::CartView;
use cafe_types::domain::chat::ChatTurn;
use cafe_types::domain::menu::{Category, MenuItem};
use cafe_types::domain::order::{CheckoutReceipt, ConnectionStatus, Order};
use cafe_types::domain::recommendation::Recommendation;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct CafeClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

#[derive(Clone)]
pub struct CafeClient {
    base: Url,
    client: reqwest::Client,
}

impl CafeClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<CafeClientBuilder> {
        let base = Url::parse(base_url).context("invalid base url")?;
        Ok(CafeClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: None,
            client: None,
        })
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        self.base.join(path).context("failed to join url")
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let res = self
            .client
            .get(self.url(path)?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn status(&self) -> anyhow::Result<ConnectionStatus> {
        let body: StatusResponse = self.get_json("status").await?;
        Ok(body.status)
    }

    /// Lists the catalog, optionally restricted to one category.
    pub async fn menu(&self, category: Option<Category>) -> anyhow::Result<Vec<MenuItem>> {
        let mut req = self.client.get(self.url("menu")?);
        if let Some(category) = category {
            req = req.query(&[("category", category.label())]);
        }
        let res = req.send().await?.error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn featured(&self) -> anyhow::Result<Vec<MenuItem>> {
        self.get_json("menu/featured").await
    }

    pub async fn moods(&self) -> anyhow::Result<Vec<String>> {
        self.get_json("moods").await
    }

    pub async fn cart(&self) -> anyhow::Result<CartView> {
        self.get_json("cart").await
    }

    pub async fn add_item(&self, item_id: &str) -> anyhow::Result<CartView> {
        let res = self
            .client
            .post(self.url("cart/items")?)
            .json(&AddItemRequest {
                item_id: item_id.to_string(),
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn update_quantity(&self, item_id: &str, delta: i32) -> anyhow::Result<CartView> {
        let res = self
            .client
            .patch(self.url(&format!("cart/items/{item_id}"))?)
            .json(&UpdateQuantityRequest { delta })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn remove_item(&self, item_id: &str) -> anyhow::Result<CartView> {
        let res = self
            .client
            .delete(self.url(&format!("cart/items/{item_id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn checkout(&self) -> anyhow::Result<CheckoutReceipt> {
        let res = self
            .client
            .post(self.url("checkout")?)
            .send()
            .await?
            .error_for_status()?;
        let receipt: CheckoutReceipt = res.json().await?;
        tracing::debug!(id = %receipt.id, status = ?receipt.status, "checkout accepted");
        Ok(receipt)
    }

    /// Orders recorded in the server's local log.
    pub async fn orders(&self) -> anyhow::Result<Vec<Order>> {
        self.get_json("orders").await
    }

    pub async fn recommend(&self, mood: &str) -> anyhow::Result<Option<Recommendation>> {
        let res = self
            .client
            .post(self.url("recommendations")?)
            .json(&RecommendRequest {
                mood: mood.to_string(),
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn chat(&self, message: &str) -> anyhow::Result<ChatTurn> {
        let res = self
            .client
            .post(self.url("chat")?)
            .json(&ChatRequest {
                message: message.to_string(),
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn chat_history(&self) -> anyhow::Result<Vec<ChatTurn>> {
        self.get_json("chat").await
    }
}

impl CafeClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<CafeClient> {
        if let Some(client) = self.client {
            return Ok(CafeClient {
                base: self.base,
                client,
            });
        }

        let mut builder = reqwest::Client::builder();
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(CafeClient {
            base: self.base,
            client,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AddItemRequest {
    pub item_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateQuantityRequest {
    pub delta: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RecommendRequest {
    pub mood: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct StatusResponse {
    status: ConnectionStatus,
}
