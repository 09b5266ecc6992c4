use crate::cli::chat::commands::{CliCommand, HistFilter, Input, parse_input};
use crate::cli::chat::compl::Repl;
use crate::cli::prompt::LinePrompter;
use crate::cli::ux::{
    ChatMessageType, GenerationSpinner, format_banner, format_distress_warning,
    format_footer_metrics, format_reply, format_request_dump, style_chat_text,
};
use crate::svc::chat::Chat;
use crate::svc::safety::needs_warning;
use anyhow::Result;
use char_chat_core::completion::{ChatMessage, SenderType};
use char_chat_core::config::{Config, ConfigField};
use clap::{CommandFactory, ValueEnum};
use rustyline::error::ReadlineError;
use rustyline::{CompletionType, Editor};
use std::io::{self, Write};
use tracing::{debug, instrument};

fn create_helper() -> Repl {
    let command_names = CliCommand::command()
        .get_subcommands()
        .flat_map(|c| c.get_name_and_visible_aliases())
        .map(|s| format!("/{s}"))
        .collect::<Vec<_>>();
    let option_names = ConfigField::ALL
        .iter()
        .map(|f| f.as_str().to_string())
        .collect();
    let filter_names = HistFilter::value_variants()
        .iter()
        .filter_map(|f| f.to_possible_value())
        .map(|v| v.get_name().to_string())
        .collect();

    Repl {
        command_names,
        option_names,
        filter_names,
    }
}

fn format_prompt(config: &Config) -> String {
    let prompt_meta = format!("[model: {}]", config.model);
    format!(
        "\n{}\n{}",
        style_chat_text(&prompt_meta, ChatMessageType::PromptMeta),
        style_chat_text("You: ", ChatMessageType::Prompt)
    )
}

/// Runs the interactive REPL for the chat session.
pub async fn run(chat: &mut Chat, verbose: bool) -> Result<()> {
    let mut out = io::stdout();
    write!(out, "{}", format_banner())?;
    if let Some(greeting) = chat.transcript().last() {
        write!(out, "{}", format_reply(&greeting.text, false))?;
    }

    let config = rustyline::Config::builder()
        .history_ignore_dups(true)?
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();
    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(create_helper()));

    loop {
        let prompt = format_prompt(chat.config());
        match rl.readline(&prompt) {
            Ok(line) => {
                rl.add_history_entry(&line)?;
                if !process_line(chat, &line, &mut rl, &mut out, verbose).await? {
                    return Ok(());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Type /quit to exit.");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nBye!");
                return Ok(());
            }
            Err(err) => {
                return Err(err.into());
            }
        }
    }
}

/// Handles one line of input.
///
/// Returns `Ok(false)` once the user asked to leave.
pub(crate) async fn process_line(
    chat: &mut Chat,
    line: &str,
    prompter: &mut dyn LinePrompter,
    out: &mut dyn Write,
    verbose: bool,
) -> Result<bool> {
    match parse_input(line) {
        Input::Empty => Ok(true),
        Input::Command(command) => {
            debug!(?command, "Executing command");
            command.execute(chat, prompter, out)
        }
        Input::Invalid(e) => {
            write!(out, "{}", e.render())?;
            Ok(true)
        }
        Input::Chat(text) => {
            process_message(chat, &text, out, verbose).await?;
            Ok(true)
        }
    }
}

#[instrument(skip(chat, out))]
async fn process_message(
    chat: &mut Chat,
    text: &str,
    out: &mut dyn Write,
    verbose: bool,
) -> Result<()> {
    if verbose {
        let mut pending = chat.request_messages();
        pending.push(ChatMessage::new(SenderType::User, text));
        write!(out, "\n{}", format_request_dump(&pending))?;
        out.flush()?;
    }

    let spinner = GenerationSpinner::new("Generating...".to_string());
    let turn = chat.send_message(text).await;
    spinner.clear();

    write!(out, "{}", format_reply(&turn.text, turn.is_error))?;
    if needs_warning(&turn.text) {
        write!(out, "{}", format_distress_warning())?;
    }

    if verbose {
        let footer = format_footer_metrics(
            &turn.metrics,
            turn.finish_reason.as_deref(),
            turn.elapsed,
        );
        writeln!(
            out,
            "\n{}",
            style_chat_text(&footer, ChatMessageType::Footer)
        )?;
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::chat::test_utils::{ScriptedPrompter, create_test_chat, mock_backend};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn feed(chat: &mut Chat, line: &str, verbose: bool) -> (bool, String) {
        let mut prompter = ScriptedPrompter::new(&[]);
        let mut out = Vec::new();
        let keep_going = process_line(chat, line, &mut prompter, &mut out, verbose)
            .await
            .unwrap();
        (keep_going, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_chat_line_prints_reply() {
        let server = mock_backend(
            ResponseTemplate::new(200).set_body_json(json!({"message": {"content": "hi there"}})),
        )
        .await;
        let (mut chat, _) = create_test_chat(&format!("{}/api/chat", server.uri()));

        let (keep_going, output) = feed(&mut chat, "hello", false).await;

        assert!(keep_going);
        assert!(output.contains("Chatbot: hi there"));
        assert!(!output.contains("Request Data:"));
        let tail: Vec<_> = chat.transcript().messages()[1..].to_vec();
        assert_eq!(
            tail,
            vec![
                ChatMessage::new(SenderType::User, "hello"),
                ChatMessage::new(SenderType::Assistant, "hi there")
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_response_keeps_loop_running() {
        let server =
            mock_backend(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
                .await;
        let (mut chat, _) = create_test_chat(&format!("{}/api/chat", server.uri()));

        let (keep_going, output) = feed(&mut chat, "hello", false).await;
        assert!(keep_going);
        assert!(output.contains("Unexpected response format"));

        let (keep_going, _) = feed(&mut chat, "still there?", false).await;
        assert!(keep_going);

        let senders: Vec<_> = chat.transcript().all().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![
                SenderType::Assistant,
                SenderType::User,
                SenderType::Assistant,
                SenderType::User,
                SenderType::Assistant
            ]
        );
    }

    #[tokio::test]
    async fn test_verbose_prints_metrics_and_request() {
        let server = mock_backend(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "hi there"},
            "done_reason": "stop",
            "eval_count": 12,
            "eval_duration": 250_000_000u64
        })))
        .await;
        let (mut chat, _) = create_test_chat(&format!("{}/api/chat", server.uri()));

        let (_, output) = feed(&mut chat, "hello", true).await;

        assert!(output.contains("◼ Completed (stop)."));
        assert!(output.contains("12 completion tokens"));
        assert!(output.contains("Request Data:"));
        assert!(output.contains("[2] assistant: Hello traveller!"));
        assert!(output.contains("[3] user: hello"));
        assert!(!output.contains("[4]"));
        // Dump precedes the reply
        let dump_at = output.find("Request Data:").unwrap();
        let reply_at = output.find("Chatbot: hi there").unwrap();
        let footer_at = output.find("◼ Completed").unwrap();
        assert!(dump_at < reply_at);
        assert!(reply_at < footer_at);
    }

    #[tokio::test]
    async fn test_sensitive_reply_prints_warning() {
        let server = mock_backend(ResponseTemplate::new(200).set_body_json(
            json!({"message": {"content": "Talking about Suicide is serious."}}),
        ))
        .await;
        let (mut chat, _) = create_test_chat(&format!("{}/api/chat", server.uri()));

        let (_, output) = feed(&mut chat, "hello", false).await;

        assert!(output.contains("please seek immediate help"));
    }

    #[tokio::test]
    async fn test_config_edit_applies_to_next_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"model": "newvalue"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message": {"content": "ok"}})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let (mut chat, _) = create_test_chat(&format!("{}/api/chat", server.uri()));

        let (keep_going, output) = feed(&mut chat, "/config model newvalue", false).await;
        assert!(keep_going);
        assert!(output.contains("Config updated successfully."));

        let (_, output) = feed(&mut chat, "hello", false).await;
        assert!(output.contains("Chatbot: ok"));
    }

    #[tokio::test]
    async fn test_commands_and_empty_lines() {
        let (mut chat, _) = create_test_chat("http://127.0.0.1:1/api/chat");

        assert_eq!(feed(&mut chat, "   ", false).await, (true, String::new()));

        let (keep_going, output) = feed(&mut chat, "/unknown", false).await;
        assert!(keep_going);
        assert!(!output.is_empty());

        let (keep_going, output) = feed(&mut chat, "/help", false).await;
        assert!(keep_going);
        assert!(!output.is_empty());

        assert_eq!(feed(&mut chat, "quit", false).await, (false, "Bye!\n".to_string()));
        assert_eq!(chat.transcript().len(), 1);
    }

    #[test]
    fn test_create_helper_lists_commands() {
        let helper = create_helper();
        assert_eq!(helper.command_names, vec!["/config", "/ver", "/hist", "/exit"]);
        assert_eq!(helper.filter_names, vec!["user", "assistant"]);
        assert_eq!(helper.option_names.len(), 5);
    }

    #[test]
    fn test_format_prompt_shows_model() {
        let (chat, _) = create_test_chat("http://127.0.0.1:1/api/chat");
        let prompt = format_prompt(chat.config());
        assert!(prompt.contains("[model: test-model]"));
        assert!(prompt.contains("You: "));
    }
}
