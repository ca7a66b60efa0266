//! TOML configuration.
//!
//! ```toml
//! [content]
//! root = "src/content"
//! extensions = ["mdx", "md"]
//! exclude_globs = ["_*"]
//!
//! [render]
//! smart_punctuation = true
//! external_links_new_tab = true
//!
//! [listing]
//! render_bodies = false
//! ```
//!
//! Only `[content].root` is required; every other key has a default.

use anyhow::{Context, Result};
use globset::Glob;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub content: ContentConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub listing: ListingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    pub root: PathBuf,
    /// File extensions treated as documents. On a stem collision the
    /// extension listed first wins.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Globs matched against file names; matching files are ignored.
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_extensions() -> Vec<String> {
    vec!["mdx".to_string(), "md".to_string()]
}

/// Markdown extensions and HTML output options.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    #[serde(default = "default_true")]
    pub tables: bool,
    #[serde(default = "default_true")]
    pub footnotes: bool,
    #[serde(default = "default_true")]
    pub strikethrough: bool,
    #[serde(default = "default_true")]
    pub tasklists: bool,
    #[serde(default)]
    pub smart_punctuation: bool,
    /// Open absolute http(s) links in a new tab.
    #[serde(default)]
    pub external_links_new_tab: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            tasklists: true,
            smart_punctuation: false,
            external_links_new_tab: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingConfig {
    /// Render body HTML for list views. Detail lookups always render it.
    #[serde(default = "default_true")]
    pub render_bodies: bool,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            render_bodies: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Configuration used when no config file is present.
    pub fn minimal() -> Self {
        Self::for_root("content")
    }

    /// Default configuration over the given content root.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            content: ContentConfig {
                root: root.into(),
                extensions: default_extensions(),
                exclude_globs: Vec::new(),
                follow_symlinks: false,
            },
            render: RenderConfig::default(),
            listing: ListingConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.extensions.is_empty() {
            anyhow::bail!("content.extensions must not be empty");
        }
        for ext in &self.content.extensions {
            if ext.is_empty() {
                anyhow::bail!("content.extensions must not contain empty strings");
            }
            if ext.starts_with('.') {
                anyhow::bail!(
                    "content.extensions entries are written without a leading dot: '{}'",
                    ext
                );
            }
        }
        for pattern in &self.content.exclude_globs {
            Glob::new(pattern)
                .with_context(|| format!("Invalid content.exclude_globs pattern: '{}'", pattern))?;
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
