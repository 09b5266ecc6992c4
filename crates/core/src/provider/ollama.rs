//! Client for the Ollama `/api/chat` endpoint.
use crate::completion::{
    ChatMessage, CompletionError, CompletionMetrics, CompletionModel, CompletionResponse,
    SenderType, request_messages,
};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

#[derive(Serialize, Debug)]
struct OllamaChatRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    stream: bool,
    messages: Vec<OllamaMessage<'a>>,
}

#[derive(Serialize, Debug)]
struct OllamaMessage<'a> {
    role: SenderType,
    content: &'a str,
}

// Only `message.content` is required for a reply. The other fields are read
// leniently and ignored when they have an unexpected type.
#[derive(Deserialize, Debug)]
struct OllamaChatResponse {
    message: Option<Value>,
    error: Option<Value>,
    done_reason: Option<Value>,
    prompt_eval_count: Option<Value>,
    prompt_eval_duration: Option<Value>,
    eval_count: Option<Value>,
    eval_duration: Option<Value>,
}

/// Non-streaming chat completion against an Ollama compatible server.
///
/// The endpoint and model are read from the [`Config`] on every call. No
/// timeout is set on the client, a request waits until the server answers or
/// the connection fails.
#[derive(Debug, Clone, Default)]
pub struct OllamaModel {
    client: Client,
}

impl OllamaModel {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

fn count(value: Option<Value>) -> u32 {
    value
        .as_ref()
        .and_then(Value::as_f64)
        .map(|n| n as u32)
        .unwrap_or_default()
}

fn nanos_to_ms(nanos: Option<Value>) -> f32 {
    nanos
        .as_ref()
        .and_then(Value::as_f64)
        .map(|n| (n / 1_000_000.0) as f32)
        .unwrap_or_default()
}

fn error_text(error: Value) -> String {
    match error {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn parse_response(body: &str) -> Result<CompletionResponse, CompletionError> {
    let response: OllamaChatResponse = serde_json::from_str(body)?;

    let message = match (response.message, response.error) {
        (Some(Value::Object(message)), _) => message,
        (Some(_), _) => return Err(CompletionError::UnexpectedFormat),
        (None, Some(error)) => return Err(CompletionError::Backend(error_text(error))),
        (None, None) => return Err(CompletionError::UnexpectedFormat),
    };
    let text = match message.get("content") {
        Some(Value::String(text)) => text.clone(),
        _ => return Err(CompletionError::NoContent),
    };

    Ok(CompletionResponse {
        text,
        finish_reason: response
            .done_reason
            .and_then(|reason| reason.as_str().map(str::to_string)),
        metrics: CompletionMetrics {
            prompt_tokens: count(response.prompt_eval_count),
            prompt_eval_latency_ms: nanos_to_ms(response.prompt_eval_duration),
            completion_tokens: count(response.eval_count),
            completion_latency_ms: nanos_to_ms(response.eval_duration),
        },
    })
}

#[async_trait]
impl CompletionModel for OllamaModel {
    #[instrument(skip_all, fields(url = %config.url, model = %config.model))]
    async fn complete(
        &self,
        messages: &[ChatMessage],
        config: &Config,
    ) -> Result<CompletionResponse, CompletionError> {
        let messages = request_messages(messages, config);
        let request = OllamaChatRequest {
            prompt: "",
            model: &config.model,
            stream: false,
            messages: messages
                .iter()
                .map(|m| OllamaMessage {
                    role: m.sender,
                    content: &m.text,
                })
                .collect(),
        };

        debug!(messages = request.messages.len(), "Sending chat request");
        let response = self
            .client
            .post(&config.url)
            .json(&request)
            .send()
            .await
            .map_err(CompletionError::Request)?;

        let status = response.status();
        let body = response.text().await.map_err(CompletionError::Read)?;
        debug!(%status, body_len = body.len(), "Received chat response");

        parse_response(&body)
    }
}
