use anyhow::Context;
use pageforge_common::FileSystem;
use pageforge_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "pageforge.config.json";

/// Pageforge configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Tracing filter directive (e.g. "info", "pageforge_editor=debug")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Catalogs, locale and toast texts handed to every session
    #[serde(flatten)]
    pub editor: EditorConfig,
}

impl Config {
    /// Load config from a directory, falling back to defaults when absent
    pub fn load(fs: &dyn FileSystem, cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if !fs.exists(&config_path) {
            return Ok(Config::default());
        }

        let content = fs
            .read_to_string(&config_path)
            .with_context(|| format!("Cannot read {}", config_path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid {}", config_path.display()))?;
        config.editor.validate()?;

        Ok(config)
    }
}
