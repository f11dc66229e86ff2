//! Rendering error types.

use thiserror::Error;

/// Errors that can occur while managing reflection GPU resources.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Texture creation failed.
    #[error("texture creation failed: {0}")]
    TextureCreationFailed(String),

    /// Requested target dimensions are unusable.
    #[error("invalid render target size {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Out of memory.
    #[error("out of memory")]
    OutOfMemory,
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

impl From<RenderError> for mirrorplane_core::ReflectionError {
    fn from(err: RenderError) -> Self {
        mirrorplane_core::ReflectionError::ResourceExhausted(err.to_string())
    }
}
