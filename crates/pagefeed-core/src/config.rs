//! Site and feed configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for pagefeed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Feeds rendered from the site's items.
    #[serde(default)]
    pub feeds: Vec<FeedEntry>,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Base URL for the site (e.g., "https://example.com").
    pub base_url: String,
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Output directory for rendered files.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Directory searched for templates before the built-in ones.
    #[serde(default)]
    pub templates_dir: Option<String>,
}

/// Caller-supplied metadata of a syndication feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfiguration {
    /// Output path of the feed, relative to the output directory.
    pub url: String,

    /// Feed title.
    pub title: String,

    /// Feed description.
    pub description: String,

    /// Name of the feed author.
    pub author_name: String,
}

/// Syndication format of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// RSS 2.0.
    #[default]
    Rss,
    /// Atom 1.0.
    Atom,
}

impl FeedKind {
    /// Template applied to the whole feed.
    pub fn feed_template(&self) -> &'static str {
        match self {
            Self::Rss => "rss.xml",
            Self::Atom => "atom.xml",
        }
    }

    /// Template applied to every item of the feed.
    pub fn item_template(&self) -> &'static str {
        match self {
            Self::Rss => "rss-item.xml",
            Self::Atom => "atom-item.xml",
        }
    }

    /// strftime format of the `timestamp` fields.
    pub fn date_format(&self) -> &'static str {
        match self {
            Self::Rss => "%a, %d %b %Y %H:%M:%S UT",
            Self::Atom => "%Y-%m-%dT%H:%M:%SZ",
        }
    }
}

/// A feed declared in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Feed format.
    #[serde(default)]
    pub kind: FeedKind,

    /// Feed metadata.
    #[serde(flatten)]
    pub feed: FeedConfiguration,
}

fn default_output_dir() -> String {
    "public".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            templates_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `PAGEFEED__SECTION__KEY` environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("PAGEFEED").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.site.base_url.is_empty() {
            return Err(CoreError::config("site.base_url cannot be empty"));
        }

        if self.site.base_url.ends_with('/') {
            tracing::warn!("site.base_url should not have a trailing slash");
        }

        for (index, entry) in self.feeds.iter().enumerate() {
            if entry.feed.url.is_empty() {
                return Err(CoreError::config(format!(
                    "feeds[{index}].url cannot be empty"
                )));
            }
        }

        Ok(())
    }
}
