use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

pub const DEFAULT_IMAGE_DIR: &str = "images";
pub const DEFAULT_MODEL_DIR: &str = "models";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7878";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024; // 10 MB

/// Immutable application configuration.
///
/// Built once at startup (defaults, then an optional JSON file, then CLI/env
/// overrides) and handed to every component by reference. Nothing in the
/// crate reads configuration from globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Directory holding the image store.
    pub image_dir: PathBuf,
    /// Directory holding `<model_id>.json` model files.
    pub model_dir: PathBuf,
    /// Ordered model registry. Empty means "discover from `model_dir`".
    pub models: Vec<String>,
    /// Address the studio binds to.
    pub bind_addr: String,
    /// Largest request body accepted by the upload route.
    pub max_upload_bytes: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            models: Vec::new(),
            bind_addr: DEFAULT_BIND_ADDR.to_owned(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Configuration {
    /// Deserializes a configuration from a JSON file. Missing keys fall back
    /// to their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Configuration> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            Error::validation(format!("Could not open config file '{}': {}", path.display(), e))
        })?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            Error::validation(format!("Invalid config file '{}': {}", path.display(), e))
        })
    }

    /// Rejects configurations the application cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.image_dir.as_os_str().is_empty() {
            return Err(Error::validation("image_dir must not be empty"));
        }
        if self.model_dir.as_os_str().is_empty() {
            return Err(Error::validation("model_dir must not be empty"));
        }
        if self.max_upload_bytes == 0 {
            return Err(Error::validation("max_upload_bytes must be positive"));
        }
        if let Some(bad) = self.models.iter().find(|m| !is_valid_model_id(m)) {
            return Err(Error::validation(format!("invalid model id '{}'", bad)));
        }
        Ok(())
    }

    /// Fills an empty model registry from the `*.json` stems in `model_dir`.
    ///
    /// Called once at startup; the registry is fixed afterwards.
    pub fn with_discovered_models(mut self) -> Configuration {
        if self.models.is_empty() {
            self.models = discover_models(&self.model_dir);
            info!(count = self.models.len(), dir = %self.model_dir.display(), "discovered models");
        }
        self
    }

    /// Path of the JSON file backing `model_id`.
    pub fn model_path(&self, model_id: &str) -> PathBuf {
        self.model_dir.join(format!("{}.json", model_id))
    }

    pub fn has_model(&self, model_id: &str) -> bool {
        self.models.iter().any(|m| m == model_id)
    }
}

/// Model ids become file stems, so they may not contain path components.
pub fn is_valid_model_id(id: &str) -> bool {
    !id.is_empty()
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        && !id.contains("..")
}

fn discover_models(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut names: Vec<String> = entries.flatten()
                .filter_map(|e| {
                    let path = e.path();
                    if path.extension().and_then(|s| s.to_str()) == Some("json") {
                        path.file_stem().and_then(|s| s.to_str()).map(|s| s.to_owned())
                    } else {
                        None
                    }
                })
                .filter(|name| is_valid_model_id(name))
                .collect();
            names.sort();
            names
        }
        Err(_) => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lumen.json");
        std::fs::write(&path, r#"{ "image_dir": "/data/img", "models": ["mnist"] }"#).unwrap();

        let cfg = Configuration::load_json(&path).unwrap();
        assert_eq!(cfg.image_dir, PathBuf::from("/data/img"));
        assert_eq!(cfg.models, vec!["mnist".to_owned()]);
        assert_eq!(cfg.model_dir, PathBuf::from(DEFAULT_MODEL_DIR));
        assert_eq!(cfg.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn broken_json_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lumen.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Configuration::load_json(&path), Err(Error::Validation(_))));
    }

    #[test]
    fn discovers_sorted_model_stems() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta.json", "alpha.json", "notes.txt"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        let cfg = Configuration { model_dir: dir.path().to_owned(), ..Default::default() }
            .with_discovered_models();
        assert_eq!(cfg.models, vec!["alpha".to_owned(), "zeta".to_owned()]);
    }

    #[test]
    fn explicit_registry_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("other.json"), "{}").unwrap();
        let cfg = Configuration {
            model_dir: dir.path().to_owned(),
            models: vec!["fixed".into()],
            ..Default::default()
        }
        .with_discovered_models();
        assert_eq!(cfg.models, vec!["fixed".to_owned()]);
    }

    #[test]
    fn rejects_path_like_model_ids() {
        assert!(is_valid_model_id("resnet-18_v2"));
        assert!(!is_valid_model_id("../etc/passwd"));
        assert!(!is_valid_model_id("a/b"));
        assert!(!is_valid_model_id(""));

        let cfg = Configuration { models: vec!["../x".into()], ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}
