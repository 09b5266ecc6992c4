use crate::config::Config;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Heading of the preamble, placed before the system prompt.
pub const SYSTEM_HEADER: &str = "[---] SYSTEM MESSAGE [---]\n";
/// Placed between the system prompt and the character definition.
pub const DEFINITION_SEPARATOR: &str = "\n[---] ROLEPLAY DEFINITION [---]\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    System,
    Assistant,
    User,
}

impl From<SenderType> for String {
    fn from(val: SenderType) -> Self {
        val.as_str().into()
    }
}

impl SenderType {
    pub fn as_str(&self) -> &'static str {
        match &self {
            SenderType::System => "system",
            SenderType::User => "user",
            SenderType::Assistant => "assistant",
        }
    }

    /// Capitalized role name, e.g. `User`.
    pub fn title(&self) -> &'static str {
        match &self {
            SenderType::System => "System",
            SenderType::User => "User",
            SenderType::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub text: String,
    pub sender: SenderType,
}

impl ChatMessage {
    pub fn new(sender: SenderType, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionMetrics {
    pub prompt_tokens: u32,
    pub prompt_eval_latency_ms: f32,
    pub completion_tokens: u32,
    pub completion_latency_ms: f32,
}

#[derive(Debug)]
pub struct CompletionResponse {
    pub text: String,
    pub finish_reason: Option<String>,
    pub metrics: CompletionMetrics,
}

/// Ways a completion request can fail. None of them end the chat.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Response error: {0}")]
    Request(reqwest::Error),
    #[error("Error reading response: {0}")]
    Read(reqwest::Error),
    #[error("Error decoding response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Unexpected response format")]
    UnexpectedFormat,
    #[error("No content received")]
    NoContent,
}

/// Builds the system message content from the current configuration.
pub fn preamble(config: &Config) -> String {
    format!(
        "{SYSTEM_HEADER}{}{DEFINITION_SEPARATOR}{}",
        config.system, config.definition
    )
}

/// Messages sent to the backend: the preamble followed by the transcript.
pub fn request_messages(messages: &[ChatMessage], config: &Config) -> Vec<ChatMessage> {
    let mut request = Vec::with_capacity(messages.len() + 1);
    request.push(ChatMessage::new(SenderType::System, preamble(config)));
    request.extend(messages.iter().cloned());
    request
}

#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        config: &Config,
    ) -> Result<CompletionResponse, CompletionError>;
}
