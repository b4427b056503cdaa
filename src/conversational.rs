//! Conversational interaction handler
//!
//! Persona chat over the same narrative adapter, so it inherits the
//! deadline and retry policy. Stateless: the caller supplies the history
//! on every turn.

use crate::error::UserFacingError;
use crate::models::Source;
use crate::narrative::{prompt, NarrativeAdapter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Most recent turns forwarded to the service
const MAX_HISTORY_TURNS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Response for conversational interactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    pub sources: Vec<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_used: Option<String>,
}

pub struct ChatResponder {
    narrator: Arc<NarrativeAdapter>,
}

impl ChatResponder {
    pub fn new(narrator: Arc<NarrativeAdapter>) -> Self {
        Self { narrator }
    }

    /// Answer one message. System turns are dropped from the history.
    pub async fn reply(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> std::result::Result<ChatReply, UserFacingError> {
        let context: Vec<(String, String)> = history
            .iter()
            .filter(|t| !t.role.eq_ignore_ascii_case("system"))
            .filter(|t| !t.content.trim().is_empty())
            .map(|t| (t.role.clone(), t.content.clone()))
            .collect();
        let context = &context[context.len().saturating_sub(MAX_HISTORY_TURNS)..];

        let chat_prompt = prompt::chat_prompt(context, message.trim());

        match self.narrator.generate_raw(chat_prompt).await {
            Ok(narrative) => {
                info!(
                    persona = self.narrator.persona().key,
                    history = context.len(),
                    "Conversational response generated"
                );

                Ok(ChatReply {
                    text: narrative.text,
                    sources: narrative.sources,
                    context_used: if context.is_empty() {
                        None
                    } else {
                        Some(format!("{} previous messages included", context.len()))
                    },
                })
            }
            Err(e) => {
                warn!("Conversational generation failed: {}", e);
                Err(UserFacingError::UpstreamUnavailable)
            }
        }
    }
}
