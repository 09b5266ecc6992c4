mod assets;
mod provider;

pub mod completion;
pub mod config;
pub mod session;
pub mod transcript;

#[cfg(test)]
mod test_utils;

pub use crate::assets::{CONFIG_DIR_ENV, get_data_dir};
pub use crate::provider::ollama::OllamaModel;
