//! char-chat cli definition and entrypoint.
pub mod chat;
mod prompt;
pub mod ux;

use std::path::PathBuf;

use anyhow::{Context, Result};
use char_chat_core::config::{Config, get_config};
use clap::Parser;
use rustyline::DefaultEditor;
use tracing::warn;

use crate::cli::prompt::LinePrompter;
use crate::log::setup_logging;

/// char-chat - roleplay chat with a local language model.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Show response times and request data after every reply, and write debug logs.
    #[arg(short, long, visible_alias = "debug")]
    verbose: bool,

    /// Config file to use instead of the per-user one.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Asks for the settings worth customizing on first run.
fn customize_config(prompter: &mut dyn LinePrompter, config: Config) -> Result<Config> {
    println!("Welcome! Let's set up your character.");
    let model = prompter.prompt_value("Set Model", &config.model)?;
    let definition = prompter.prompt_value("Set Character Definition", &config.definition)?;
    let greeting = prompter.prompt_value("Set Greeting", &config.greeting)?;
    Ok(Config {
        model,
        definition,
        greeting,
        ..config
    })
}

fn bootstrap_config(config: Config) -> Config {
    let customized = DefaultEditor::new()
        .map_err(anyhow::Error::from)
        .and_then(|mut rl| customize_config(&mut rl, config.clone()));
    match customized {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Unable to prompt for settings, using defaults");
            config
        }
    }
}

/// Runs the main CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        setup_logging().context("Failed to set up logging")?;
    }

    let (config, config_path) =
        get_config(cli.config.clone(), bootstrap_config).context("Failed to load configuration")?;

    chat::execute(config, config_path, cli.verbose).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::chat::test_utils::ScriptedPrompter;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["char-chat", "--debug", "-c", "/tmp/chat.json"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/chat.json")));

        let cli = Cli::try_parse_from(["char-chat"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_customize_config_uses_answers_and_defaults() {
        let mut prompter = ScriptedPrompter::new(&["llama3", "", "Hi!"]);

        let config = customize_config(&mut prompter, Config::default()).unwrap();

        assert_eq!(config.model, "llama3");
        assert_eq!(config.definition, Config::default().definition);
        assert_eq!(config.greeting, "Hi!");
        assert_eq!(config.system, Config::default().system);
        assert_eq!(
            prompter.labels,
            vec!["Set Model", "Set Character Definition", "Set Greeting"]
        );
    }
}
