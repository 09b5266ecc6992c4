//! Interactive prompts for a single setting value.
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::History;
use rustyline::{Editor, Helper};

/// Asks the user for a value, falling back to a default.
pub trait LinePrompter {
    /// Returns the entered value, or `default` when the input is empty.
    fn prompt_value(&mut self, label: &str, default: &str) -> Result<String>;
}

/// Header printed before reading a value.
pub fn format_value_prompt(label: &str, default: &str) -> String {
    format!("{label}: (Press Enter for default)\nDefault: {default}")
}

fn value_or_default(input: &str, default: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        default.to_string()
    } else {
        input.to_string()
    }
}

impl<H: Helper, I: History> LinePrompter for Editor<H, I> {
    fn prompt_value(&mut self, label: &str, default: &str) -> Result<String> {
        println!("{}", format_value_prompt(label, default));
        match self.readline("Your Input: ") {
            Ok(line) => Ok(value_or_default(&line, default)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(default.to_string()),
            Err(err) => Err(err.into()),
        }
    }
}
