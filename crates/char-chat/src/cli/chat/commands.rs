use crate::cli::prompt::LinePrompter;
use crate::cli::ux::{ChatMessageType, style_chat_text};
use crate::svc::chat::Chat;
use anyhow::Result;
use char_chat_core::completion::SenderType;
use char_chat_core::config::{Config, ConfigError, ConfigField};
use char_chat_core::transcript::Transcript;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// -------------
// REPL commands
// -------------
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct CliCommand {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Hash, PartialEq, Eq)]
pub enum Command {
    /// View or edit the configuration.
    ///
    /// With no arguments, shows the current configuration.
    /// With an option and no value, asks for the new value.
    Config {
        /// Option to edit: url, model, system, definition or greeting
        #[arg(value_parser = parse_config_field)]
        option: Option<ConfigField>,
        /// New value for the option
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Show the app version
    #[command(alias = "version")]
    Ver,
    /// Show chat history.
    ///
    /// With no arguments, shows every message.
    #[command(alias = "history")]
    Hist {
        /// Only show messages from this sender
        #[arg(value_enum)]
        filter: Option<HistFilter>,
    },
    /// Exit the chat session
    #[command(alias = "q", alias = "quit")]
    Exit,
}

#[derive(ValueEnum, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum HistFilter {
    User,
    Assistant,
}

impl From<HistFilter> for SenderType {
    fn from(val: HistFilter) -> Self {
        match val {
            HistFilter::User => SenderType::User,
            HistFilter::Assistant => SenderType::Assistant,
        }
    }
}

fn parse_config_field(value: &str) -> Result<ConfigField, String> {
    value.parse().map_err(|e: ConfigError| e.to_string())
}

impl Command {
    /// Executes a REPL command.
    ///
    /// Returns `Ok(false)` if the REPL should exit.
    pub fn execute(
        self,
        chat: &mut Chat,
        prompter: &mut dyn LinePrompter,
        out: &mut dyn Write,
    ) -> Result<bool> {
        match self {
            Command::Config { option, value } => match option {
                Some(field) => execute_config_edit(chat, prompter, out, field, value),
                None => {
                    write!(out, "{}", format_config(chat.config()))?;
                    Ok(true)
                }
            },
            Command::Ver => {
                writeln!(out, "\n[APP VERSION]: {APP_VERSION}")?;
                Ok(true)
            }
            Command::Hist { filter } => {
                write!(out, "{}", format_history(chat.transcript(), filter))?;
                Ok(true)
            }
            Command::Exit => {
                writeln!(out, "Bye!")?;
                Ok(false)
            }
        }
    }
}

fn execute_config_edit(
    chat: &mut Chat,
    prompter: &mut dyn LinePrompter,
    out: &mut dyn Write,
    field: ConfigField,
    value: Vec<String>,
) -> Result<bool> {
    let new_value = if value.is_empty() {
        let current = chat.config().get(field).to_string();
        prompter.prompt_value(&format!("Enter new {}", field.label()), &current)?
    } else {
        value.join(" ")
    };

    match chat.update_config(field, new_value) {
        Ok(()) => writeln!(out, "Config updated successfully.")?,
        Err(e) => {
            let error_msg = format!(
                "Error saving config file {}: {e}",
                chat.config_path().display()
            );
            writeln!(
                out,
                "{}",
                style_chat_text(&error_msg, ChatMessageType::Error)
            )?;
        }
    }
    Ok(true)
}

/// Classified line of REPL input.
#[derive(Debug)]
pub enum Input {
    Empty,
    Command(Command),
    Chat(String),
    Invalid(clap::Error),
}

/// Decides whether `line` is a command or a chat message.
///
/// Lines starting with `/`, and the bare words `exit` and `quit`, are commands.
pub fn parse_input(line: &str) -> Input {
    let trimmed_line = line.trim();
    if trimmed_line.is_empty() {
        return Input::Empty;
    }

    let is_command =
        trimmed_line.starts_with('/') || trimmed_line == "exit" || trimmed_line == "quit";
    if !is_command {
        return Input::Chat(trimmed_line.to_string());
    }

    match CliCommand::try_parse_from(parse_command_line(trimmed_line)) {
        Ok(cli_command) => Input::Command(cli_command.command),
        Err(e) => Input::Invalid(e),
    }
}

/// Splits a command line into arguments for clap.
///
/// `/config` keeps everything after the option verbatim as a single value.
/// Other commands are split with shell rules, falling back to whitespace
/// for unbalanced quotes.
pub fn parse_command_line(line: &str) -> Vec<String> {
    let trimmed_line = line.trim();

    if trimmed_line.split_whitespace().next() == Some("/config") {
        let mut args = Vec::new();
        let mut rest = trimmed_line;
        for _ in 0..2 {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            args.push(rest[..end].to_string());
            rest = &rest[end..];
        }
        let rest = rest.trim();
        if !rest.is_empty() {
            args.push(rest.to_string());
        }
        return args;
    }

    shlex::split(trimmed_line).unwrap_or_else(|| {
        trimmed_line
            .split_whitespace()
            .map(|s| s.to_string())
            .collect()
    })
}

fn format_config(config: &Config) -> String {
    let mut out = String::from("\n[Current Configuration]:\n");
    for field in ConfigField::ALL {
        out.push_str(&format!("{}: {}\n", field.label(), config.get(field)));
    }
    let names: Vec<_> = ConfigField::ALL.iter().map(|f| f.as_str()).collect();
    out.push_str(&format!(
        "\nYou can edit any of these options by typing /config {{option}} where option can be one of: {}.\n",
        names.join(", ")
    ));
    out
}

/// Formats the transcript, optionally limited to one sender.
fn format_history(transcript: &Transcript, filter: Option<HistFilter>) -> String {
    let mut out = String::new();
    match filter {
        Some(filter) => {
            let sender = SenderType::from(filter);
            out.push_str(&format!("\n[{} Messages]:\n", sender.title()));
            for message in transcript.filter(sender) {
                out.push_str(&message.text);
                out.push('\n');
            }
        }
        None => {
            out.push_str("\n[All Messages]:\n");
            for message in transcript.all() {
                out.push_str(&format!("[{}]: {}\n", message.sender.title(), message.text));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::chat::test_utils::{
        ScriptedPrompter, create_test_chat, create_test_config, mock_backend,
    };
    use char_chat_core::config::load_config;
    use serde_json::json;
    use wiremock::ResponseTemplate;

    fn execute(command: Command, chat: &mut Chat) -> (bool, String) {
        let mut prompter = ScriptedPrompter::new(&[]);
        let mut out = Vec::new();
        let keep_going = command.execute(chat, &mut prompter, &mut out).unwrap();
        (keep_going, String::from_utf8(out).unwrap())
    }

    fn parse(line: &str) -> Command {
        match parse_input(line) {
            Input::Command(command) => command,
            other => panic!("Expected a command for '{line}', got {other:?}"),
        }
    }

    #[test]
    fn test_parse_input_kinds() {
        assert!(matches!(parse_input("   "), Input::Empty));
        assert!(matches!(parse_input(" hello there "), Input::Chat(text) if text == "hello there"));
        assert!(matches!(parse_input("exit please"), Input::Chat(_)));
        assert!(matches!(parse_input("/nope"), Input::Invalid(_)));
        assert!(matches!(parse_input("/hist everyone"), Input::Invalid(_)));
        assert!(matches!(parse_input("/config colour red"), Input::Invalid(_)));
    }

    #[test]
    fn test_parse_exit_variants() {
        for line in ["exit", "quit", "/exit", "/quit", "/q"] {
            assert_eq!(parse(line), Command::Exit, "Failed for input: '{line}'");
        }
    }

    #[test]
    fn test_parse_hist_and_ver() {
        assert_eq!(parse("/hist"), Command::Hist { filter: None });
        assert_eq!(
            parse("/hist user"),
            Command::Hist {
                filter: Some(HistFilter::User)
            }
        );
        assert_eq!(
            parse("/hist assistant"),
            Command::Hist {
                filter: Some(HistFilter::Assistant)
            }
        );
        assert_eq!(parse("/ver"), Command::Ver);
    }

    #[test]
    fn test_parse_config_command_edge_cases() {
        let test_cases = vec![
            ("/config", None, vec![]),
            ("/config model", Some(ConfigField::Model), vec![]),
            (
                "/config model newvalue",
                Some(ConfigField::Model),
                vec!["newvalue"],
            ),
            (
                "/config definition You're a cat, aren't you?",
                Some(ConfigField::Definition),
                vec!["You're a cat, aren't you?"],
            ),
            (
                "/config  greeting   \"Hi\"   there ",
                Some(ConfigField::Greeting),
                vec!["\"Hi\"   there"],
            ),
            (
                "/config system -be terse-",
                Some(ConfigField::System),
                vec!["-be terse-"],
            ),
        ];

        for (input, expected_option, expected_value) in test_cases {
            match parse(input) {
                Command::Config { option, value } => {
                    assert_eq!(option, expected_option, "Failed for input: '{input}'");
                    assert_eq!(value, expected_value, "Failed for input: '{input}'");
                }
                other => panic!("Expected Config command for input: '{input}', got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_command_line_fallback_for_unbalanced_quotes() {
        assert_eq!(
            parse_command_line("/hist user's"),
            vec!["/hist".to_string(), "user's".to_string()]
        );
    }

    #[test]
    fn test_config_command_shows_settings() {
        let (mut chat, _) = create_test_chat("http://localhost:1/api/chat");

        let (keep_going, output) = execute(
            Command::Config {
                option: None,
                value: vec![],
            },
            &mut chat,
        );

        assert!(keep_going);
        assert!(output.contains("[Current Configuration]:"));
        assert!(output.contains("Model: test-model"));
        assert!(output.contains("Definition: You are Gemma."));
        assert!(output.contains("url, model, system, definition, greeting"));
    }

    #[test]
    fn test_config_command_sets_value() {
        let (mut chat, path) = create_test_chat("http://localhost:1/api/chat");

        let (keep_going, output) = execute(parse("/config model newvalue"), &mut chat);

        assert!(keep_going);
        assert!(output.contains("Config updated successfully."));
        assert_eq!(chat.config().model, "newvalue");
        assert_eq!(load_config(&path).unwrap().model, "newvalue");
    }

    #[test]
    fn test_config_command_prompts_for_value() {
        let (mut chat, path) = create_test_chat("http://localhost:1/api/chat");
        let mut prompter = ScriptedPrompter::new(&["Welcome back!"]);
        let mut out = Vec::new();

        parse("/config greeting")
            .execute(&mut chat, &mut prompter, &mut out)
            .unwrap();

        assert_eq!(prompter.labels, vec!["Enter new Greeting"]);
        assert_eq!(prompter.defaults, vec!["Hello traveller!"]);
        assert_eq!(load_config(&path).unwrap().greeting, "Welcome back!");
    }

    #[test]
    fn test_config_command_empty_answer_keeps_value() {
        let (mut chat, path) = create_test_chat("http://localhost:1/api/chat");
        let mut prompter = ScriptedPrompter::new(&[""]);
        let mut out = Vec::new();

        parse("/config url")
            .execute(&mut chat, &mut prompter, &mut out)
            .unwrap();

        assert_eq!(chat.config().url, "http://localhost:1/api/chat");
        assert_eq!(load_config(&path).unwrap().url, "http://localhost:1/api/chat");
    }

    #[test]
    fn test_config_command_reports_save_failure() {
        let (config, path) = create_test_config("http://localhost:1/api/chat");
        let missing = path.with_file_name("missing-dir").join("config.json");
        let mut chat = Chat::new(config, missing.clone());

        let (keep_going, output) = execute(parse("/config model llama3"), &mut chat);

        assert!(keep_going);
        assert!(output.contains("Error saving config file"));
        assert!(output.contains(&missing.display().to_string()));
        assert_eq!(chat.config().model, "llama3");
    }

    #[test]
    fn test_ver_command() {
        let (mut chat, _) = create_test_chat("http://localhost:1/api/chat");
        let (keep_going, output) = execute(Command::Ver, &mut chat);
        assert!(keep_going);
        assert_eq!(output, format!("\n[APP VERSION]: {APP_VERSION}\n"));
    }

    #[tokio::test]
    async fn test_hist_command_filters() {
        let server = mock_backend(
            ResponseTemplate::new(200).set_body_json(json!({"message": {"content": "hi there"}})),
        )
        .await;
        let (mut chat, _) = create_test_chat(&format!("{}/api/chat", server.uri()));
        chat.send_message("hello").await;
        chat.send_message("how are you?").await;

        let (_, all) = execute(Command::Hist { filter: None }, &mut chat);
        assert_eq!(
            all,
            "\n[All Messages]:\n[Assistant]: Hello traveller!\n[User]: hello\n[Assistant]: hi there\n[User]: how are you?\n[Assistant]: hi there\n"
        );

        let (_, users) = execute(parse("/hist user"), &mut chat);
        assert_eq!(users, "\n[User Messages]:\nhello\nhow are you?\n");

        let (_, assistant) = execute(parse("/hist assistant"), &mut chat);
        assert_eq!(
            assistant,
            "\n[Assistant Messages]:\nHello traveller!\nhi there\nhi there\n"
        );
    }

    #[test]
    fn test_exit_command() {
        let (mut chat, _) = create_test_chat("http://localhost:1/api/chat");
        let (keep_going, output) = execute(Command::Exit, &mut chat);
        assert!(!keep_going);
        assert_eq!(output, "Bye!\n");
    }
}
