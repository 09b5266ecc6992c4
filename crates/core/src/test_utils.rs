//! Test utilities for char-chat-core crate

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tempfile::Builder;

/// Creates a temporary config file with the given content.
/// Uses tempfile::Builder to ensure unique directories for parallel tests.
///
/// # Panics
/// Panics if temp directory creation or file writing fails.
pub fn create_temp_config(content: &str) -> PathBuf {
    let temp_dir = Builder::new()
        .prefix("char-chat-test")
        .rand_bytes(8)
        .tempdir()
        .unwrap();
    let config_path = temp_dir.path().join("config.json");
    File::create(&config_path)
        .unwrap()
        .write_all(content.as_bytes())
        .unwrap();
    // Keep the temp directory alive by leaking it (this is just for tests)
    let _ = Box::leak(Box::new(temp_dir));
    config_path
}

/// Config pointing at `url` with short, predictable prompts.
pub fn dummy_config(url: &str) -> crate::config::Config {
    crate::config::Config {
        url: url.to_string(),
        model: "test-model".to_string(),
        system: "Stay in character.".to_string(),
        definition: "You are Gemma.".to_string(),
        greeting: "Hello traveller!".to_string(),
    }
}
