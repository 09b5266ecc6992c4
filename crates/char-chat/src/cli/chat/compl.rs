use crate::cli::ux::{ChatMessageType, style_chat_text};
use rustyline::completion::{Candidate, Completer};
use rustyline::error::ReadlineError;
use rustyline::hint::Hinter;
use rustyline::{Helper, Highlighter, Validator};

/// Completion candidate for the REPL.
#[derive(Debug)]
pub struct CompletionCandidate {
    text: String,
    display_string: String,
}

impl CompletionCandidate {
    pub fn new(text: &str) -> Self {
        let display_string = style_chat_text(text, ChatMessageType::Footer).to_string();
        Self {
            text: text.to_owned(),
            display_string,
        }
    }
}

impl Candidate for CompletionCandidate {
    fn display(&self) -> &str {
        &self.display_string
    }

    fn replacement(&self) -> &str {
        &self.text
    }
}

/// REPL runtime state for command line editing.
#[derive(Helper, Validator, Highlighter)]
pub struct Repl {
    /// Command names with their leading `/`.
    pub command_names: Vec<String>,
    pub option_names: Vec<String>,
    pub filter_names: Vec<String>,
}

impl Completer for Repl {
    type Candidate = CompletionCandidate;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> Result<(usize, Vec<Self::Candidate>), ReadlineError> {
        if !line.starts_with('/') {
            return Ok((0, Vec::new()));
        }

        let line_to_pos = &line[..pos];
        let Some(space_pos) = line_to_pos.rfind(' ') else {
            let candidates = self
                .command_names
                .iter()
                .filter(|name| name.starts_with(line_to_pos))
                .map(|name| CompletionCandidate::new(name))
                .collect();
            return Ok((0, candidates));
        };

        // Only the first argument of a command is completed
        let names = match line_to_pos[..space_pos].trim() {
            "/config" => &self.option_names,
            "/hist" | "/history" => &self.filter_names,
            _ => return Ok((0, Vec::new())),
        };
        Ok((space_pos + 1, arg_compl(&line_to_pos[space_pos + 1..], names)))
    }
}

impl Hinter for Repl {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if line.is_empty() || pos < line.len() {
            return None;
        }
        if line.starts_with('/') {
            // Suggest command completions
            self.command_names
                .iter()
                .find(|&cmd_name| cmd_name.starts_with(line))
                .map(|cmd_name| cmd_name[line.len()..].into())
        } else {
            None
        }
    }
}

fn arg_compl(prefix: &str, names: &[String]) -> Vec<CompletionCandidate> {
    names
        .iter()
        .filter(|name| name.starts_with(prefix))
        .map(|name| CompletionCandidate::new(name))
        .collect()
}
