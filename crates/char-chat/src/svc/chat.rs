use char_chat_core::OllamaModel;
use char_chat_core::completion::{ChatMessage, CompletionModel};
use char_chat_core::config::{Config, ConfigError, ConfigField, save_config};
use char_chat_core::session::{Session, Turn};
use char_chat_core::transcript::Transcript;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Chat conversation between human and the configured character
pub struct Chat {
    session: Session,
    config: Config,
    config_path: PathBuf,
}

impl Chat {
    /// Chat against the Ollama backend named in `config`.
    pub fn new(config: Config, config_path: PathBuf) -> Self {
        Self::with_model(Box::new(OllamaModel::new()), config, config_path)
    }

    pub fn with_model(
        model: Box<dyn CompletionModel>,
        config: Config,
        config_path: PathBuf,
    ) -> Self {
        let session = Session::new(model, &config.greeting);
        Self {
            session,
            config,
            config_path,
        }
    }

    /// Sends a user message and waits for the character's reply.
    pub async fn send_message(&mut self, text: &str) -> Turn {
        self.session.send(text, &self.config).await
    }

    pub fn transcript(&self) -> &Transcript {
        self.session.transcript()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Updates one setting and rewrites the config file.
    ///
    /// The new value is used from the next message on even if saving fails.
    #[instrument(skip(self, value))]
    pub fn update_config(&mut self, field: ConfigField, value: String) -> Result<(), ConfigError> {
        self.config.set(field, value);
        save_config(&self.config, &self.config_path)?;
        info!(path = %self.config_path.display(), "Saved config");
        Ok(())
    }

    /// Messages the next request would carry, preamble included.
    pub fn request_messages(&self) -> Vec<ChatMessage> {
        self.session.request_messages(&self.config)
    }
}
