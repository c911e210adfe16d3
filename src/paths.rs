//! Path resolution for sft-pro and the local Ollama install.
//!
//! `SftPaths` follows the XDG Base Directory Specification for our own config
//! and mirrors Ollama's lookup for its model store (`OLLAMA_MODELS`, falling
//! back to `~/.ollama/models`).

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Manifest subtree for models pulled from the default registry namespace.
const LIBRARY_MANIFESTS: &str = "manifests/registry.ollama.ai/library";

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(sft::paths::no_home),
        help("Set the HOME environment variable or ensure a valid user profile exists.")
    )]
    NoHome,
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Directories sft-pro reads from.
#[derive(Debug, Clone)]
pub struct SftPaths {
    /// `$XDG_CONFIG_HOME/sft-pro/`
    pub config_dir: PathBuf,
    /// `$OLLAMA_MODELS`, or `~/.ollama/models`
    pub ollama_models_dir: PathBuf,
}

impl SftPaths {
    /// Resolve directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("sft-pro");

        let ollama_models_dir = std::env::var("OLLAMA_MODELS")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".ollama").join("models"));

        Ok(Self {
            config_dir,
            ollama_models_dir,
        })
    }

    /// Path to the config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Directory whose subdirectories are model families and whose
    /// grandchildren are tags.
    pub fn manifests_dir(&self) -> PathBuf {
        self.ollama_models_dir.join(LIBRARY_MANIFESTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_paths_use_expected_layout() {
        // Read-only: mutating env vars is unsafe in edition 2024.
        let paths = SftPaths::resolve().unwrap();
        assert!(
            paths.config_dir.ends_with("sft-pro"),
            "config_dir should end in 'sft-pro': {}",
            paths.config_dir.display()
        );
        assert!(paths.config_file().starts_with(&paths.config_dir));
        assert!(paths.manifests_dir().starts_with(&paths.ollama_models_dir));
    }

    #[test]
    fn manifests_dir_derives_from_models_dir() {
        let paths = SftPaths {
            config_dir: PathBuf::from("/cfg/sft-pro"),
            ollama_models_dir: PathBuf::from("/home/u/.ollama/models"),
        };
        assert_eq!(
            paths.manifests_dir(),
            PathBuf::from("/home/u/.ollama/models/manifests/registry.ollama.ai/library")
        );
        assert_eq!(
            paths.config_file(),
            PathBuf::from("/cfg/sft-pro/config.toml")
        );
    }
}
