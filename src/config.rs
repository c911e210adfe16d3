//! User configuration, persisted as TOML in `$XDG_CONFIG_HOME/sft-pro/config.toml`.
//!
//! Every key is optional in the file; missing keys take their defaults and a
//! missing file is the same as an empty one.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::DEFAULT_TEXT_LIMIT;
use crate::llm::{DEFAULT_OLLAMA_URL, OllamaConfig};

/// Errors from config operations.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(sft::config::read),
        help("Ensure the config file is readable, or remove it to fall back to defaults.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(sft::config::parse),
        help("Check the TOML syntax. `sft-pro config show` prints a valid example.")
    )]
    Parse { path: String, message: String },

    #[error("failed to serialize config: {message}")]
    #[diagnostic(code(sft::config::serialize))]
    Serialize { message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(sft::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config already exists: {path}")]
    #[diagnostic(
        code(sft::config::exists),
        help("Pass --force to overwrite it.")
    )]
    AlreadyExists { path: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SftConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    /// Maximum number of characters of document text put into a prompt.
    #[serde(default = "default_text_limit")]
    pub text_limit: usize,
    /// Whole-request timeout for generation. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Model used when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    /// Overrides the manifests directory scanned for installed models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifests_dir: Option<PathBuf>,
}

fn default_ollama_url() -> String {
    DEFAULT_OLLAMA_URL.into()
}
fn default_text_limit() -> usize {
    DEFAULT_TEXT_LIMIT
}

impl Default for SftConfig {
    fn default() -> Self {
        Self {
            ollama_url: default_ollama_url(),
            text_limit: default_text_limit(),
            timeout_secs: None,
            default_model: None,
            manifests_dir: None,
        }
    }
}

impl SftConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content, path)
    }

    /// Load from a TOML file, or return defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn from_toml(content: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Render as pretty TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Client settings derived from this config.
    pub fn ollama_config(&self) -> OllamaConfig {
        OllamaConfig {
            base_url: self.ollama_url.clone(),
            timeout_secs: self.timeout_secs,
            ..Default::default()
        }
    }
}
