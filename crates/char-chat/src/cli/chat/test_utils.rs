#![cfg(test)]

//! Test utilities for chat modules

#![allow(dead_code)]

use crate::cli::prompt::LinePrompter;
use crate::svc::chat::Chat;
use anyhow::Result;
use char_chat_core::config::{Config, save_config};
use std::collections::VecDeque;
use std::path::PathBuf;
use tempfile::Builder;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a config pointing at `url` and saves it to a fresh temp directory.
pub fn create_test_config(url: &str) -> (Config, PathBuf) {
    let config = Config {
        url: url.to_string(),
        model: "test-model".to_string(),
        system: "Stay in character.".to_string(),
        definition: "You are Gemma.".to_string(),
        greeting: "Hello traveller!".to_string(),
    };

    let temp_dir = Builder::new()
        .prefix("char-chat-test")
        .rand_bytes(8)
        .tempdir()
        .unwrap();
    let config_path = temp_dir.path().join("config.json");
    save_config(&config, &config_path).unwrap();
    // Keep the temp directory alive for the rest of the test run
    let _ = Box::leak(Box::new(temp_dir));

    (config, config_path)
}

/// Chat against `url` backed by a saved test config.
pub fn create_test_chat(url: &str) -> (Chat, PathBuf) {
    let (config, path) = create_test_config(url);
    (Chat::new(config, path.clone()), path)
}

/// Starts a backend answering every `POST /api/chat` with `response`.
pub async fn mock_backend(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

/// Prompter that replays canned answers and records what it was asked.
///
/// An empty answer, or running out of answers, selects the default.
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub labels: Vec<String>,
    pub defaults: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            labels: Vec::new(),
            defaults: Vec::new(),
        }
    }
}

impl LinePrompter for ScriptedPrompter {
    fn prompt_value(&mut self, label: &str, default: &str) -> Result<String> {
        self.labels.push(label.to_string());
        self.defaults.push(default.to_string());
        match self.answers.pop_front() {
            Some(answer) if !answer.trim().is_empty() => Ok(answer.trim().to_string()),
            _ => Ok(default.to_string()),
        }
    }
}
