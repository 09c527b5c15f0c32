//! Conversational assistant: a seeded greeting, a rolling history, and a
//! trailing-window prompt sent to the generation service.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, RwLock};

use voicelab_core::api::ChatApi;
use voicelab_core::chat::ChatMessage;
use voicelab_core::{Result, VoiceLabError};

/// First message in every conversation.
pub const ASSISTANT_GREETING: &str = "Hello! I'm your AI Caregiver Assistant. \
     Ask me about Alzheimer's signs, brain health tips, or how to interpret your results.";

/// Appended in place of a reply when generation fails.
pub const CONNECTIVITY_FALLBACK: &str =
    "I'm having trouble connecting right now. Please try again.";

const SYSTEM_PROMPT: &str = "You are a compassionate, knowledgeable AI assistant for an \
     Alzheimer's Voice Screening application. Your goal is to provide supportive, \
     scientifically accurate (but accessible) information about brain health, Alzheimer's \
     early signs, and how voice analysis technology generally works. Always remind users \
     you are an AI, not a doctor. Be concise.";

const EMPTY_MESSAGE: &str = "Message is empty.";

/// How many trailing history messages are flattened into each prompt.
const CONTEXT_WINDOW: usize = 4;

/// Holds the conversation and serializes sends to the generation service.
pub struct ChatController {
    api: Arc<dyn ChatApi>,
    messages: RwLock<Vec<ChatMessage>>,
    in_flight: Mutex<()>,
    pending: AtomicUsize,
}

impl ChatController {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            messages: RwLock::new(vec![ChatMessage::system(ASSISTANT_GREETING)]),
            in_flight: Mutex::new(()),
            pending: AtomicUsize::new(0),
        }
    }

    /// Sends one user message and returns the assistant's reply.
    ///
    /// The user message is appended immediately; sends overlapping an active
    /// request queue behind it and resolve in order. Generation failures are
    /// absorbed into a fixed fallback reply, never surfaced as errors.
    pub async fn send_message(&self, text: &str) -> Result<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(VoiceLabError::validation(EMPTY_MESSAGE));
        }

        // The context window is captured before the user message is appended:
        // it holds the trailing messages preceding this send.
        let prompt = {
            let mut messages = self.messages.write().await;
            let prompt = build_prompt(&messages, trimmed);
            messages.push(ChatMessage::user(trimmed));
            prompt
        };

        self.pending.fetch_add(1, Ordering::SeqCst);
        let _guard = self.in_flight.lock().await;

        let reply = match self.api.generate(&prompt, Some(SYSTEM_PROMPT)).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "assistant reply failed, substituting fallback");
                CONNECTIVITY_FALLBACK.to_string()
            }
        };

        self.messages.write().await.push(ChatMessage::assistant(&reply));
        self.pending.fetch_sub(1, Ordering::SeqCst);
        Ok(reply)
    }

    /// Snapshot of the conversation, greeting included.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    /// Whether at least one send is awaiting its reply.
    pub fn is_thinking(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }
}

/// Flattens the trailing window of `history` plus the new user text into a
/// single prompt, ending with an open assistant turn.
fn build_prompt(history: &[ChatMessage], text: &str) -> String {
    let start = history.len().saturating_sub(CONTEXT_WINDOW);
    let conversation = history[start..]
        .iter()
        .map(|message| format!("{}: {}", message.prompt_label(), message.text))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{conversation}\nUser: {text}\nAssistant:")
}
