use secrecy::{ExposeSecret, SecretString};
use std::env;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Case-insensitive prefixes of template credentials, e.g. `your-api-key`.
const PLACEHOLDER_PREFIXES: &[&str] = &[
    "your-",
    "your_",
    "put-your",
    "add-your",
    "insert",
    "replace",
    "changeme",
];

/// Case-insensitive whole values of template credentials.
const PLACEHOLDER_VALUES: &[&str] = &["todo", "tbd", "none", "null", "secret", "api_key"];

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: SecretString,
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
}

/// Process configuration, resolved once at start-up and passed down.
///
/// `remote` and `completion` are `None` whenever their credential is
/// missing or still a placeholder, which puts the storefront in local mode
/// and the AI adapters in apology mode respectively.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: String,
    pub database_url: Option<String>,
    pub remote: Option<RemoteConfig>,
    pub completion: Option<CompletionConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let server_port = lookup("SERVER_PORT").unwrap_or_else(|| "3000".into());
        let database_url = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty());

        let remote = match (lookup("REMOTE_STORE_URL"), credential(&lookup, "REMOTE_STORE_API_KEY")) {
            (Some(base_url), Some(api_key)) if !base_url.trim().is_empty() => {
                Some(RemoteConfig { base_url, api_key })
            }
            _ => None,
        };

        let completion = credential(&lookup, "GEMINI_API_KEY")
            .or_else(|| credential(&lookup, "API_KEY"))
            .map(|api_key| CompletionConfig {
                api_key,
                model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
                base_url: lookup("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.into()),
            });

        Ok(Self {
            server_port,
            database_url,
            remote,
            completion,
        })
    }

    pub fn remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    pub fn completion_configured(&self) -> bool {
        self.completion.is_some()
    }
}

fn credential(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<SecretString> {
    let value = lookup(key)?;
    let secret = SecretString::from(value.trim().to_string());
    if secret.expose_secret().is_empty() {
        tracing::debug!("{key} is empty, treating as not configured");
        return None;
    }
    if is_placeholder(secret.expose_secret()) {
        tracing::warn!("{key} looks like a template value, treating as not configured");
        return None;
    }
    Some(secret)
}

pub fn is_placeholder(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    lower.is_empty()
        || lower.contains("placeholder")
        || lower.chars().all(|c| matches!(c, 'x' | '*' | '.' | '-'))
        || PLACEHOLDER_VALUES.contains(&lower.as_str())
        || PLACEHOLDER_PREFIXES.iter().any(|p| lower.starts_with(p))
}
