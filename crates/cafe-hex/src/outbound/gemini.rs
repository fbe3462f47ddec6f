//! Gemini `generateContent` client backing the recommendation and chat
//! adapters.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use cafe_types::ports::completion::{CompletionError, CompletionService};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::CompletionConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl GenerateResponse {
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default()
    }
}

fn user_turn(text: &str) -> Content<'_> {
    Content {
        role: Some("user"),
        parts: vec![Part { text }],
    }
}

impl GeminiClient {
    pub fn new(config: &CompletionConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(config.api_key.expose_secret())
            .context("invalid completion api key")?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            model: config.model.clone(),
        })
    }

    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|env| env.error.message)
                .unwrap_or(body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))?;
        Ok(body.text())
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate_json(
        &self,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<serde_json::Value, CompletionError> {
        let request = GenerateRequest {
            contents: vec![user_turn(prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            }),
        };
        let text = self.generate(&request).await?;
        Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
            debug!(error = %e, "structured reply was not JSON");
            serde_json::Value::Object(Default::default())
        }))
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn chat(&self, persona: &str, message: &str) -> Result<String, CompletionError> {
        let request = GenerateRequest {
            contents: vec![user_turn(message)],
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part { text: persona }],
            }),
            generation_config: None,
        };
        self.generate(&request).await
    }
}
