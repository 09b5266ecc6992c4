use once_cell::sync::Lazy;
use std::path::PathBuf;

/// Overrides the directory holding `config.json` and the log file.
pub const CONFIG_DIR_ENV: &str = "CHAR_CHAT_CONFIG_DIR";

pub const DEFAULT_URL: &str = "http://localhost:11434/api/chat";
pub const DEFAULT_MODEL: &str = "gemma2:2b";
pub const DEFAULT_DEFINITION: &str = "Your name is Gemma, a world-class Artificial Intelligence.";

static DEFAULT_CONFIG_DIR: Lazy<Option<PathBuf>> = Lazy::new(|| {
    if cfg!(windows) {
        // %APPDATA% on windows
        dirs::config_dir().map(|p| p.join("CharacterChat"))
    } else {
        dirs::home_dir().map(|p| p.join(".char-chat"))
    }
});

/// Directory holding the per-user config file.
///
/// Returns `None` when the home directory cannot be resolved and no override
/// is set.
pub fn get_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        Some(PathBuf::from(dir))
    } else {
        DEFAULT_CONFIG_DIR.clone()
    }
}

pub fn get_data_dir() -> std::io::Result<PathBuf> {
    let path = get_config_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Unable to resolve the home directory",
        )
    })?;
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

pub fn get_default_system_prompt() -> String {
    include_str!("../data/system_prompt.txt").to_string()
}

pub fn get_default_greeting() -> String {
    include_str!("../data/greeting.md").to_string()
}
