//! Errors raised while loading site configuration and content metadata.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors of the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The site configuration is missing, malformed or inconsistent.
    #[error("invalid configuration: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A content file has unusable front matter.
    #[error("invalid front matter in {}: {message}", path.display())]
    Frontmatter { path: PathBuf, message: String },

    /// Reading a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Layered loading through the `config` crate failed.
    #[error("configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),
}

impl CoreError {
    /// Configuration error without an underlying cause.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Configuration error caused by `source`.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Front matter error for the file at `path`.
    pub fn frontmatter(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Frontmatter {
            path: path.into(),
            message: message.into(),
        }
    }
}
