use crate::svc::chat::Chat;
use anyhow::Result;
use char_chat_core::config::Config;
use std::path::PathBuf;

mod commands;
mod compl;
mod repl;
pub(crate) mod test_utils;

/// Starts an interactive chat with the configured character.
pub async fn execute(config: Config, config_path: PathBuf, verbose: bool) -> Result<()> {
    let mut chat = Chat::new(config, config_path);
    repl::run(&mut chat, verbose).await
}
