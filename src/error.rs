//! Error types for loading layouts and exporting images
//!
//! Malformed fields inside a payload are not errors: normalization
//! substitutes defaults. These types cover the boundaries only.

use thiserror::Error;

/// Failure to obtain a layout from the collaborator
#[derive(Error, Debug)]
pub enum LoadError {
    /// The collaborator could not be reached or did not answer
    #[error("transport error: {0}")]
    Transport(String),

    /// The collaborator answered with `success: false`
    #[error("layout request rejected: {message}")]
    Rejected { message: String },

    #[error("response has no layout data")]
    MissingLayout,

    #[error("failed to read layout: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode layout JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LoadError {
    /// Whether showing a retry action makes sense
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LoadError::Transport(_) | LoadError::Io(_) | LoadError::Rejected { .. }
        )
    }
}

/// Failure to rasterize a rendered scene
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("invalid SVG: {0}")]
    Svg(String),

    #[error("cannot allocate a {width}×{height} pixmap")]
    Allocation { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("PNG export is not enabled in this build")]
    Unsupported,
}
