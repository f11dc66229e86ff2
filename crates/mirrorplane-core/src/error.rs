//! Error types for mirrorplane.

use thiserror::Error;

/// The main error type for reflection subsystem operations.
///
/// None of these are fatal to the host frame loop: a failed update degrades
/// to "no texture this frame".
#[derive(Error, Debug)]
pub enum ReflectionError {
    /// A required collaborator is missing (source camera, camera component on
    /// the reflection entity).
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    /// The reflection plane is degenerate.
    #[error("invalid plane geometry: {0}")]
    InvalidGeometry(String),

    /// Render target allocation failed.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// One or more configured layers are not known to the host.
    #[error("layers not found: {}", .0.join(", "))]
    LayerNotFound(Vec<String>),

    /// A numeric option is outside its accepted range.
    #[error("option '{name}' = {value} is outside [{min}, {max}]")]
    InvalidOption {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// The renderer has been disposed and can no longer be used.
    #[error("renderer already disposed")]
    Disposed,

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for reflection operations.
pub type Result<T> = std::result::Result<T, ReflectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_not_found_lists_names() {
        let err = ReflectionError::LayerNotFound(vec!["Water".into(), "Fog".into()]);
        assert_eq!(err.to_string(), "layers not found: Water, Fog");
    }

    #[test]
    fn test_invalid_option_message() {
        let err = ReflectionError::InvalidOption {
            name: "scale",
            value: 3.0,
            min: 0.1,
            max: 2.0,
        };
        assert_eq!(err.to_string(), "option 'scale' = 3 is outside [0.1, 2]");
    }
}
