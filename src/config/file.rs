//! Optional TOML settings file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Contents of a `--config` file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub gitlab_url: Option<String>,
    #[serde(default)]
    pub filters: Vec<String>,
    pub dest_prefix: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub show_unknown: Option<bool>,
}

impl SettingsFile {
    /// Load settings from a TOML file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }
}
