//! Conversation history of a single chat run.
use crate::completion::{ChatMessage, SenderType};

/// Append-only, ordered list of chat messages.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Creates a transcript opened by the assistant's `greeting`.
    pub fn seeded(greeting: &str) -> Self {
        let mut transcript = Self::default();
        transcript.append(SenderType::Assistant, greeting);
        transcript
    }

    pub fn append(&mut self, sender: SenderType, text: impl Into<String>) {
        self.messages.push(ChatMessage::new(sender, text));
    }

    /// All messages in conversational order.
    pub fn all(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    /// Messages from one sender, in conversational order.
    pub fn filter(&self, sender: SenderType) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(move |m| m.sender == sender)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
