//! A session is the conversation between a human and the character played by
//! the model.
use crate::{
    completion::{ChatMessage, CompletionMetrics, CompletionModel, SenderType, request_messages},
    config::Config,
    transcript::Transcript,
};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Outcome of one chat turn.
#[derive(Debug, Clone)]
pub struct Turn {
    /// Reply recorded as the assistant message. Holds the error description
    /// when the request failed.
    pub text: String,
    pub is_error: bool,
    pub finish_reason: Option<String>,
    pub metrics: CompletionMetrics,
    pub elapsed: Duration,
}

/// A session with the transcript of the current run.
pub struct Session {
    model: Box<dyn CompletionModel>,
    transcript: Transcript,
}

impl Session {
    /// Create a new session opened by the assistant's `greeting`.
    pub fn new(model: Box<dyn CompletionModel>, greeting: &str) -> Self {
        Self {
            model,
            transcript: Transcript::seeded(greeting),
        }
    }

    /// Send `text` as the user's message and record the reply.
    ///
    /// A failed request does not return an error: its description becomes the
    /// assistant's message so the conversation can go on.
    #[instrument(skip_all, fields(turn = self.transcript.len() / 2 + 1))]
    pub async fn send(&mut self, text: &str, config: &Config) -> Turn {
        self.transcript.append(SenderType::User, text);

        let start = Instant::now();
        let result = self.model.complete(self.transcript.messages(), config).await;
        let elapsed = start.elapsed();

        let turn = match result {
            Ok(response) => {
                info!(elapsed_ms = elapsed.as_millis() as u64, "Received reply");
                Turn {
                    text: response.text,
                    is_error: false,
                    finish_reason: response.finish_reason,
                    metrics: response.metrics,
                    elapsed,
                }
            }
            Err(err) => {
                warn!(error = %err, "Completion failed");
                Turn {
                    text: err.to_string(),
                    is_error: true,
                    finish_reason: None,
                    metrics: CompletionMetrics::default(),
                    elapsed,
                }
            }
        };

        self.transcript.append(SenderType::Assistant, turn.text.as_str());
        turn
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Messages the next request would carry, preamble included.
    pub fn request_messages(&self, config: &Config) -> Vec<ChatMessage> {
        request_messages(self.transcript.messages(), config)
    }
}
