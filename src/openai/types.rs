//! Wire types for the upstream transcription and chat-completion APIs

use serde::{Deserialize, Serialize};

/// Model sent with every transcription request
pub const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// System message that opens every relayed chat
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Sampling temperature for relayed chats
pub const CHAT_TEMPERATURE: f64 = 0.5;

/// Chat message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Body of `POST /chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
}

impl ChatCompletionRequest {
    /// Build the fixed two-message conversation for a prompt template and input text
    ///
    /// The user message is `prompt_content + " " + input_text`, verbatim.
    pub fn from_prompt(model: &str, prompt_content: &str, input_text: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: Role::User,
                    content: format!("{} {}", prompt_content, input_text),
                },
            ],
            temperature: CHAT_TEMPERATURE,
        }
    }
}

/// Response of `POST /chat/completions`
///
/// Only the fields the relay reads are modelled; everything else is ignored.
/// `choices` is required: a body without it is malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice with surrounding whitespace removed
    pub fn first_message(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .map(|content| content.trim().to_string())
    }
}

/// Response of `POST /audio/transcriptions` in the default `json` format
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
}
