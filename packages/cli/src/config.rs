use pagecraft_model::{BlockDescriptor, Registry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

/// Pagecraft configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory containing page files
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    /// Undo history depth for editing sessions
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,

    /// Seed for new block uids; defaults to each page's file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_key: Option<String>,

    /// Block types registered on top of the built-in catalog
    #[serde(default)]
    pub custom_blocks: Vec<BlockDescriptor>,
}

fn default_pages_dir() -> String {
    "pages".to_string()
}

fn default_undo_levels() -> usize {
    100
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to pages directory
    pub fn get_pages_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.pages_dir)
    }

    /// Built-in catalog plus custom blocks; custom ones win on name clashes
    pub fn registry(&self) -> Registry {
        let mut registry = Registry::builtin();
        for descriptor in &self.custom_blocks {
            registry.register(descriptor.clone());
        }
        registry
    }

    /// Page key used to seed uids for blocks added to `page`
    pub fn page_key_for(&self, page: &Path) -> String {
        let stem = page
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("page");

        match &self.page_key {
            Some(key) => format!("{}/{}", key, stem),
            None => stem.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pages_dir: default_pages_dir(),
            undo_levels: default_undo_levels(),
            page_key: None,
            custom_blocks: vec![],
        }
    }
}
