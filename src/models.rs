//! Discovery of locally installed Ollama models.
//!
//! Ollama keeps one manifest per pulled model under
//! `manifests/registry.ollama.ai/library/<family>/<tag>`. The scanner turns
//! that tree into `family:tag` identifiers without asking the server, so a
//! stale or half-downloaded manifest is listed like any other.

use std::path::{Path, PathBuf};

use crate::paths::SftPaths;

/// Lists `family:tag` identifiers from a manifests directory.
#[derive(Debug, Clone)]
pub struct ModelScanner {
    manifests_dir: PathBuf,
}

impl ModelScanner {
    pub fn new(manifests_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifests_dir: manifests_dir.into(),
        }
    }

    /// Scanner over the default manifests directory.
    pub fn from_paths(paths: &SftPaths) -> Self {
        Self::new(paths.manifests_dir())
    }

    pub fn manifests_dir(&self) -> &Path {
        &self.manifests_dir
    }

    /// Installed models in filesystem enumeration order.
    ///
    /// A missing or unreadable manifests directory yields an empty list.
    pub fn list_models(&self) -> Vec<String> {
        let families = match std::fs::read_dir(&self.manifests_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(
                    dir = %self.manifests_dir.display(),
                    "no manifests directory: {e}"
                );
                return Vec::new();
            }
        };

        let mut models = Vec::new();
        for family in families.filter_map(|e| e.ok()) {
            if !family.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                continue;
            }
            let family_name = family.file_name().to_string_lossy().into_owned();
            let Ok(tags) = std::fs::read_dir(family.path()) else {
                continue;
            };
            for tag in tags.filter_map(|e| e.ok()) {
                models.push(format!(
                    "{family_name}:{}",
                    tag.file_name().to_string_lossy()
                ));
            }
        }

        tracing::debug!(count = models.len(), "scanned installed models");
        models
    }
}

/// Installed models from the default location, or none when the home
/// directory cannot be resolved.
pub fn list_installed_models() -> Vec<String> {
    match SftPaths::resolve() {
        Ok(paths) => ModelScanner::from_paths(&paths).list_models(),
        Err(e) => {
            tracing::warn!("{e}");
            Vec::new()
        }
    }
}

/// Outcome of picking a model for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSelection {
    /// The caller named a model.
    Requested(String),
    /// Exactly one model is installed.
    Only(String),
    /// Several are installed; the caller has to choose.
    Ambiguous(Vec<String>),
    /// Nothing is installed.
    NoneInstalled,
}

impl ModelSelection {
    /// The chosen model, if the selection settled on one.
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Requested(m) | Self::Only(m) => Some(m.as_str()),
            Self::Ambiguous(_) | Self::NoneInstalled => None,
        }
    }
}

/// Pick a model: an explicit request wins, otherwise settle on the only
/// installed model if there is exactly one.
pub fn select_model(installed: Vec<String>, requested: Option<String>) -> ModelSelection {
    if let Some(model) = requested {
        return ModelSelection::Requested(model);
    }
    match installed.len() {
        0 => ModelSelection::NoneInstalled,
        1 => ModelSelection::Only(installed.into_iter().next().unwrap_or_default()),
        _ => ModelSelection::Ambiguous(installed),
    }
}

/// Resolve a 1-based menu choice against a model list.
pub fn choose_by_number(models: &[String], input: &str) -> Option<String> {
    let n: usize = input.trim().parse().ok()?;
    n.checked_sub(1).and_then(|i| models.get(i)).cloned()
}
