use char_chat_core::completion::{ChatMessage, CompletionMetrics};
use console::{Style, StyledObject};
use std::time::Duration;

pub const REPLY_SEPARATOR: &str = "[-----------------------------------]";

const REMINDER: &str = "[ REMINDER: All content generated in this chat session is Artificial, and not real! Do not take it as real advice. ]";
const DISTRESS_WARNING: &str = "[WARNING]: The response contains sensitive content. If you or someone you know is in distress, please seek immediate help.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMessageType {
    Prompt,
    PromptMeta,
    Notice,
    Footer,
    Warning,
    Error,
}

pub fn style_chat_text(text: &str, style: ChatMessageType) -> StyledObject<&str> {
    let style_obj = match style {
        ChatMessageType::Prompt => Style::new().blue().bold(),
        ChatMessageType::PromptMeta => Style::new().blue(),
        ChatMessageType::Notice => Style::new().cyan(),
        ChatMessageType::Footer => Style::new().white().dim(),
        ChatMessageType::Warning => Style::new().yellow().bold(),
        ChatMessageType::Error => Style::new().red().bold(),
    };
    style_obj.apply_to(text)
}

/// Reminder shown once when the chat starts.
pub fn format_banner() -> String {
    format!("\n{}\n", style_chat_text(REMINDER, ChatMessageType::Notice))
}

pub fn format_distress_warning() -> String {
    format!(
        "\n{}\n",
        style_chat_text(DISTRESS_WARNING, ChatMessageType::Warning)
    )
}

/// Frames a reply from the character between separator lines.
pub fn format_reply(text: &str, is_error: bool) -> String {
    let line = format!("Chatbot: {text}");
    let body = if is_error {
        style_chat_text(&line, ChatMessageType::Error).to_string()
    } else {
        line
    };
    format!("\n{REPLY_SEPARATOR}\n\n{body}\n{REPLY_SEPARATOR}\n")
}

pub fn format_footer_metrics(
    metrics: &CompletionMetrics,
    finish_reason: Option<&str>,
    elapsed: Duration,
) -> String {
    let mut footer_complete = String::from("◼ Completed");
    if let Some(reason) = finish_reason {
        footer_complete.push_str(&format!(" ({reason})"));
    }
    footer_complete.push('.');

    let mut details = vec![format!("{:.2}s response time", elapsed.as_secs_f32())];

    if metrics.prompt_eval_latency_ms > 0.0 {
        details.push(format!(
            "{:.2}s prompt eval",
            metrics.prompt_eval_latency_ms / 1000.0
        ));
    }

    // Tokens/s rate
    if metrics.completion_tokens > 0 && metrics.completion_latency_ms > 0.0 {
        let tokens_per_sec =
            metrics.completion_tokens as f32 * 1000.0 / metrics.completion_latency_ms;
        details.push(format!("{tokens_per_sec:.2} tokens/s"));
    }

    if metrics.completion_tokens > 0 {
        details.push(format!("{} completion tokens", metrics.completion_tokens));
    }
    if metrics.prompt_tokens > 0 {
        details.push(format!("{} prompt tokens", metrics.prompt_tokens));
    }

    format!("{} {}", footer_complete, details.join(". "))
}

/// Numbered listing of the messages sent to the backend.
pub fn format_request_dump(messages: &[ChatMessage]) -> String {
    let mut out = String::from("Request Data:\n");
    for (i, message) in messages.iter().enumerate() {
        out.push_str(&format!(
            "\n[{}] {}: {}",
            i + 1,
            message.sender.as_str(),
            message.text
        ));
    }
    out.push('\n');
    out
}
