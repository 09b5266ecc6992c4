use std::{
    fmt,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::assets::{
    DEFAULT_DEFINITION, DEFAULT_MODEL, DEFAULT_URL, get_config_dir, get_default_greeting,
    get_default_system_prompt,
};

pub const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File system error: {0}")]
    IO(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JSONError(#[from] serde_json::Error),
    #[error("Unable to resolve the home directory")]
    HomeDir,
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Chat settings persisted in the per-user config file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Chat endpoint of the inference backend.
    pub url: String,
    pub model: String,
    /// Rules the model follows, sent ahead of the character definition.
    pub system: String,
    /// Character the model plays.
    pub definition: String,
    /// First assistant message of every session.
    pub greeting: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system: get_default_system_prompt(),
            definition: DEFAULT_DEFINITION.to_string(),
            greeting: get_default_greeting(),
        }
    }
}

impl Config {
    pub fn get(&self, field: ConfigField) -> &str {
        match field {
            ConfigField::Url => &self.url,
            ConfigField::Model => &self.model,
            ConfigField::System => &self.system,
            ConfigField::Definition => &self.definition,
            ConfigField::Greeting => &self.greeting,
        }
    }

    pub fn set(&mut self, field: ConfigField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ConfigField::Url => self.url = value,
            ConfigField::Model => self.model = value,
            ConfigField::System => self.system = value,
            ConfigField::Definition => self.definition = value,
            ConfigField::Greeting => self.greeting = value,
        }
    }
}

/// A single editable setting of [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    Url,
    Model,
    System,
    Definition,
    Greeting,
}

impl ConfigField {
    pub const ALL: [ConfigField; 5] = [
        ConfigField::Url,
        ConfigField::Model,
        ConfigField::System,
        ConfigField::Definition,
        ConfigField::Greeting,
    ];

    pub fn as_str(&self) -> &'static str {
        match &self {
            ConfigField::Url => "url",
            ConfigField::Model => "model",
            ConfigField::System => "system",
            ConfigField::Definition => "definition",
            ConfigField::Greeting => "greeting",
        }
    }

    /// Human readable name used in prompts and listings.
    pub fn label(&self) -> &'static str {
        match &self {
            ConfigField::Url => "URL",
            ConfigField::Model => "Model",
            ConfigField::System => "System",
            ConfigField::Definition => "Definition",
            ConfigField::Greeting => "Greeting",
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<_> = ConfigField::ALL.iter().map(|f| f.as_str()).collect();
                ConfigError::Config(format!(
                    "Invalid configuration option '{s}'. Available options: {}.",
                    names.join(", ")
                ))
            })
    }
}

/// Default location of the config file for the current user.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    get_config_dir()
        .map(|dir| dir.join(CONFIG_FILE))
        .ok_or(ConfigError::HomeDir)
}

/// Ensures the config file exists, creating its parent directory if needed.
///
/// When the file is missing, `bootstrap` receives the default [`Config`] and
/// returns the one to write, e.g. after asking the user for overrides.
/// Returns whether the file already existed and its path.
#[instrument(skip(config_path, bootstrap))]
pub fn create_or_get_config_file<F>(
    config_path: Option<PathBuf>,
    bootstrap: F,
) -> Result<(bool, PathBuf), ConfigError>
where
    F: FnOnce(Config) -> Config,
{
    let actual_path = match config_path {
        Some(path) => path,
        None => default_config_path()?,
    };

    let parent_dir = actual_path.parent().ok_or_else(|| {
        ConfigError::IO(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Config path has no parent directory",
        ))
    })?;

    if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
        fs::create_dir_all(parent_dir)?;
    }

    if actual_path.exists() {
        Ok((true, actual_path))
    } else {
        let config = bootstrap(Config::default());
        save_config(&config, &actual_path)?;
        debug!(path = %actual_path.display(), "Created config file");
        Ok((false, actual_path))
    }
}

/// Reads and parses the config file at `config_path`.
#[instrument]
pub fn load_config(config_path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(config_path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Creates the config file on first run and loads it.
pub fn get_config<F>(
    config_path: Option<PathBuf>,
    bootstrap: F,
) -> Result<(Config, PathBuf), ConfigError>
where
    F: FnOnce(Config) -> Config,
{
    let (_, config_file) = create_or_get_config_file(config_path, bootstrap)?;
    let config = load_config(&config_file)?;
    Ok((config, config_file))
}

/// Rewrites the whole config file with `config`.
#[instrument(skip(config))]
pub fn save_config(config: &Config, config_path: &Path) -> Result<(), ConfigError> {
    let data = serde_json::to_string_pretty(config)?;
    File::create(config_path)?.write_all(data.as_bytes())?;
    Ok(())
}
