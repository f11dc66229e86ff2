//! Named material parameters written by reflection consumers.

use mirrorplane_core::TextureHandle;

/// Texture bound to a sampler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureBinding {
    /// The current reflection texture.
    Reflection(TextureHandle),
    /// A 1x1 texture filled with a single RGBA8 texel.
    Solid([u8; 4]),
}

/// Value of a named material parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue {
    /// Scalar uniform.
    Float(f32),
    /// Three-component uniform.
    Vec3([f32; 3]),
    /// Sampled texture.
    Texture(TextureBinding),
}

/// Host material that accepts named parameters.
pub trait MaterialParameterSink {
    /// Writes one parameter.
    fn set_parameter(&mut self, name: &str, value: ParameterValue);
}

impl MaterialParameterSink for std::collections::HashMap<String, ParameterValue> {
    fn set_parameter(&mut self, name: &str, value: ParameterValue) {
        self.insert(name.to_string(), value);
    }
}
