//! Output writing.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use pagefeed_core::Config;
use tracing::debug;

use crate::error::{RenderError, Result};

/// Destination of rendered text.
pub trait OutputWriter {
    /// Write `content` at the site-relative `path`.
    fn write(&self, path: &str, content: &str) -> Result<()>;
}

/// Writes output files below a directory.
#[derive(Debug, Clone)]
pub struct DirectoryWriter {
    root: PathBuf,
}

impl DirectoryWriter {
    /// Create a writer rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a writer rooted at `build.output_dir`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.build.output_dir)
    }

    /// Output directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a site-relative path inside the output directory.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return Err(RenderError::output(path)),
            }
        }

        if resolved == self.root {
            return Err(RenderError::output(path));
        }
        Ok(resolved)
    }
}

impl OutputWriter for DirectoryWriter {
    fn write(&self, path: &str, content: &str) -> Result<()> {
        let output_path = self.resolve(path)?;
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, content)?;

        debug!(path = %output_path.display(), "wrote output");
        Ok(())
    }
}
