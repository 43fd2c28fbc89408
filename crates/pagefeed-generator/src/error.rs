//! Error type of the rendering pipeline.

use pagefeed_core::CoreError;
use thiserror::Error;

use crate::template::TemplateError;

/// Rendering errors.
///
/// Every variant is fatal for the render chain it occurs in: later steps do
/// not run and nothing is written.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template lookup or application error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Front matter or configuration error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A chain finished without a field the output writer needs.
    #[error("missing output field: {0}")]
    MissingOutputField(String),

    /// Output path outside of the output directory.
    #[error("invalid output path: {0}")]
    OutputPath(String),
}

impl RenderError {
    /// Create a new output path error.
    pub fn output(path: impl Into<String>) -> Self {
        Self::OutputPath(path.into())
    }
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
