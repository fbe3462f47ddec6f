use std::sync::Arc;

use cafe_types::domain::chat::ChatTurn;
use cafe_types::domain::menu::MenuItem;
use cafe_types::ports::completion::CompletionService;
use tracing::{instrument, warn};

pub const GREETING: &str = "Hello! Welcome to the coffee shop. I'm your digital barista. \
Ask me anything about our coffee, brewing methods, or for a recommendation based on your mood!";

pub const SERVICE_APOLOGY: &str =
    "I'm sorry, I'm having trouble connecting to the roast master. Please try again later!";

pub const EMPTY_REPLY_APOLOGY: &str =
    "I'm sorry, I'm a bit busy with a latte right now. Can you try again?";

/// Append-only conversation, seeded with the greeting. Lives for the
/// session and is never truncated.
#[derive(Debug, Clone)]
pub struct ChatSession {
    history: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            history: vec![ChatTurn::model(GREETING)],
        }
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    fn push(&mut self, turn: ChatTurn) {
        self.history.push(turn);
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ChatAdapter {
    completion: Arc<dyn CompletionService>,
}

impl ChatAdapter {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    /// Records `message` and the barista's answer. Returns the model turn,
    /// or `None` for a blank message (nothing is recorded).
    ///
    /// Exactly one model turn is appended per call; a failed or empty
    /// completion becomes a fixed apology.
    #[instrument(skip_all, fields(history_len = session.len()))]
    pub async fn send(
        &self,
        session: &mut ChatSession,
        message: &str,
        catalog: &[MenuItem],
    ) -> Option<ChatTurn> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }
        session.push(ChatTurn::user(message));

        let text = match self.completion.chat(&persona(catalog), message).await {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY_APOLOGY.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "barista chat failed");
                SERVICE_APOLOGY.to_string()
            }
        };

        let reply = ChatTurn::model(text);
        session.push(reply.clone());
        Some(reply)
    }
}

/// System instruction carrying the whole catalog as grounding.
pub fn persona(catalog: &[MenuItem]) -> String {
    let menu = serde_json::to_string(catalog).unwrap_or_else(|_| "[]".into());
    format!(
        "You are the friendly and knowledgeable head barista at our coffee shop. \
         Your tone is warm, professional, and slightly poetic about coffee. \
         You know everything about the menu: {menu}. \
         If asked for recommendations, use the items from our menu. \
         Keep responses concise but engaging."
    )
}
