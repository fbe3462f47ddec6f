use std::sync::Arc;

use cafe_types::domain::menu::MenuItem;
use cafe_types::domain::recommendation::Recommendation;
use cafe_types::ports::completion::CompletionService;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

#[derive(Deserialize)]
struct Reply {
    name: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    tip: String,
}

/// Asks the completion service for one drink matching a mood.
pub struct RecommendationAdapter {
    completion: Arc<dyn CompletionService>,
}

impl RecommendationAdapter {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    /// Returns `None` when there is nothing to recommend: blank mood, empty
    /// catalog, service failure, or a reply without a `name`. A name that
    /// matches no catalog entry resolves to the first entry.
    #[instrument(skip(self, catalog), fields(catalog_len = catalog.len()))]
    pub async fn recommend(&self, mood: &str, catalog: &[MenuItem]) -> Option<Recommendation> {
        let mood = mood.trim();
        if mood.is_empty() || catalog.is_empty() {
            return None;
        }

        let payload = match self
            .completion
            .generate_json(&prompt(mood, catalog), response_schema())
            .await
        {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "recommendation request failed");
                return None;
            }
        };

        match serde_json::from_value::<Reply>(payload) {
            Ok(reply) => resolve(reply, catalog),
            Err(e) => {
                debug!(error = %e, "reply carried no recommendation");
                None
            }
        }
    }
}

fn resolve(reply: Reply, catalog: &[MenuItem]) -> Option<Recommendation> {
    let exact = catalog.iter().find(|item| item.name == reply.name);
    let item = exact.or_else(|| catalog.first())?.clone();
    if exact.is_none() {
        debug!(name = %reply.name, fallback = %item.name, "model named an unknown item");
    }
    Some(Recommendation {
        name: reply.name,
        reason: reply.reason,
        tip: reply.tip,
        item,
        exact_match: exact.is_some(),
    })
}

pub fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "reason": { "type": "STRING" },
            "tip": { "type": "STRING" }
        },
        "required": ["name", "reason", "tip"]
    })
}

fn prompt(mood: &str, catalog: &[MenuItem]) -> String {
    let menu: Vec<_> = catalog
        .iter()
        .map(|m| json!({ "name": m.name, "tags": m.tags }))
        .collect();
    format!(
        "Based on the following menu items, recommend one perfect coffee for a customer who is feeling: \"{mood}\".\n\
         Menu Items: {}\n\
         Provide your response as a JSON object with 'name' (exactly as it appears in the menu), \
         'reason' (why it fits their mood), and 'tip' (a barista tip for this drink).",
        serde_json::Value::Array(menu)
    )
}
