//! Pipeline configuration and resolved project layout.
//!
//! # File format
//!
//! An optional `moonwatch-dist.yaml` at the project root:
//!
//! ```text
//! share_dir: share     # resources copied into bundles
//! output_dir: build    # bundles and archives land here
//! ```
//!
//! Relative paths are resolved against the project root. A missing file
//! means all defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::types::TargetDescriptor;

pub const CONFIG_FILE: &str = "moonwatch-dist.yaml";

/// On-disk pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub share_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            share_dir: PathBuf::from("share"),
            output_dir: PathBuf::from("build"),
        }
    }
}

/// `<root>/moonwatch-dist.yaml`, or defaults when absent.
pub fn load_at(root: &Path) -> Result<PipelineConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        tracing::debug!("no {} in {}, using defaults", CONFIG_FILE, root.display());
        return Ok(PipelineConfig::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// Absolute locations the build and package stages work with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub share_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>, config: &PipelineConfig) -> Self {
        let root = root.into();
        Self {
            share_dir: root.join(&config.share_dir),
            output_dir: root.join(&config.output_dir),
            root,
        }
    }

    /// Load `moonwatch-dist.yaml` from `root` and resolve it.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let root = root.into();
        let config = load_at(&root)?;
        Ok(Self::new(root, &config))
    }

    pub fn resource(&self, name: &str) -> PathBuf {
        self.share_dir.join(name)
    }

    /// Every share resource `target` needs, or the first missing one.
    pub fn check_resources(&self, target: &TargetDescriptor) -> Result<Vec<PathBuf>, ConfigError> {
        target
            .share_files()
            .into_iter()
            .map(|(name, _)| {
                let path = self.resource(name);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(ConfigError::MissingResource { path })
                }
            })
            .collect()
    }
}
