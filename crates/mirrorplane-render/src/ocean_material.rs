//! Ocean surface material: the consumer side of the planar reflection.
//!
//! The material samples the reflection texture in screen space, distorts the
//! lookup horizontally with a sine wave, mirrors it vertically and blends the
//! result with a base water tint. When no reflection is available it binds a
//! 1x1 dark-blue texel instead.

use glam::{Vec2, Vec3};
use mirrorplane_core::{OceanMaterialOptions, TextureHandle};

use crate::parameters::{MaterialParameterSink, ParameterValue, TextureBinding};

/// WGSL source of the ocean shader (`vs_main` / `fs_main`).
pub const OCEAN_SHADER_SOURCE: &str = include_str!("shaders/ocean.wgsl");

/// Texel bound when no reflection texture is available.
pub const FALLBACK_TEXEL: [u8; 4] = [0, 32, 64, 255];

/// Material parameter names.
pub mod params {
    pub const TIME: &str = "uTime";
    pub const WAVE_SCALE: &str = "uWaveScale";
    pub const VERTEX_WAVE_HEIGHT: &str = "uVertexWaveHeight";
    pub const OCEAN_COLOR: &str = "uOceanColor";
    pub const REFLECTION_STRENGTH: &str = "uReflectionStrength";
    pub const DIFFUSE_MAP: &str = "uDiffuseMap";
}

/// GPU representation of the ocean uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct OceanUniforms {
    pub screen_size: [f32; 4],
    pub ocean_color: [f32; 3],
    pub time: f32,
    pub wave_scale: f32,
    pub vertex_wave_height: f32,
    pub reflection_strength: f32,
    pub _padding: f32,
}

impl Default for OceanUniforms {
    fn default() -> Self {
        OceanMaterial::default().uniforms(1, 1)
    }
}

/// Screen-space reflection lookup for a fragment, matching `fs_main`.
pub fn reflection_uv(frag_coord: Vec2, inv_screen_size: Vec2, time: f32, wave_scale: f32) -> Vec2 {
    let mut uv = frag_coord * inv_screen_size;
    uv.x += (frag_coord.x * 0.05 + time).sin() * wave_scale;
    uv.y = 1.0 - uv.y;
    uv
}

/// Vertical displacement applied to a vertex, matching `vs_main`.
pub fn vertex_wave_offset(position: Vec3, time: f32, height: f32) -> f32 {
    (position.x * 0.5 + time).sin() * height + (position.z * 0.3 + time * 1.5).sin() * height
}

/// Final fragment color, matching `fs_main`.
pub fn shade(ocean_color: Vec3, reflection: Vec3, strength: f32) -> Vec3 {
    ocean_color.lerp(reflection * strength, strength)
}

/// Per-surface ocean material state.
#[derive(Debug, Clone, Default)]
pub struct OceanMaterial {
    options: OceanMaterialOptions,
    time: f32,
    reflection: Option<TextureHandle>,
}

impl OceanMaterial {
    /// Creates a material after validating its options.
    pub fn new(options: OceanMaterialOptions) -> mirrorplane_core::Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            time: 0.0,
            reflection: None,
        })
    }

    /// Returns the options.
    pub fn options(&self) -> &OceanMaterialOptions {
        &self.options
    }

    /// Replaces the options; invalid options are rejected and the old ones kept.
    pub fn set_options(&mut self, options: OceanMaterialOptions) -> mirrorplane_core::Result<()> {
        options.validate()?;
        self.options = options;
        Ok(())
    }

    /// Accumulated time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advances the animation clock.
    pub fn advance(&mut self, dt: f32) {
        self.time += dt;
    }

    /// Sets the reflection texture for this tick. `None` selects the fallback.
    pub fn set_reflection_texture(&mut self, texture: Option<TextureHandle>) {
        self.reflection = texture;
    }

    /// Returns the reflection texture currently bound, if any.
    pub fn reflection_texture(&self) -> Option<TextureHandle> {
        self.reflection
    }

    /// Returns what `uDiffuseMap` is bound to.
    pub fn texture_binding(&self) -> TextureBinding {
        match self.reflection {
            Some(handle) => TextureBinding::Reflection(handle),
            None => TextureBinding::Solid(FALLBACK_TEXEL),
        }
    }

    /// Writes every shader parameter into `sink`.
    pub fn publish(&self, sink: &mut dyn MaterialParameterSink) {
        let o = &self.options;
        sink.set_parameter(params::TIME, ParameterValue::Float(self.time * o.wave_speed));
        sink.set_parameter(params::WAVE_SCALE, ParameterValue::Float(o.wave_scale));
        sink.set_parameter(
            params::VERTEX_WAVE_HEIGHT,
            ParameterValue::Float(o.vertex_wave_height),
        );
        sink.set_parameter(params::OCEAN_COLOR, ParameterValue::Vec3(o.ocean_color.to_array()));
        sink.set_parameter(
            params::REFLECTION_STRENGTH,
            ParameterValue::Float(o.reflection_strength),
        );
        sink.set_parameter(params::DIFFUSE_MAP, ParameterValue::Texture(self.texture_binding()));
    }

    /// Advances time by `dt` and publishes.
    pub fn update(&mut self, dt: f32, sink: &mut dyn MaterialParameterSink) {
        self.advance(dt);
        self.publish(sink);
    }

    /// GPU uniforms for a render target of the given size.
    #[allow(clippy::cast_precision_loss)]
    pub fn uniforms(&self, width: u32, height: u32) -> OceanUniforms {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        OceanUniforms {
            screen_size: [w, h, 1.0 / w, 1.0 / h],
            ocean_color: self.options.ocean_color.to_array(),
            time: self.time * self.options.wave_speed,
            wave_scale: self.options.wave_scale,
            vertex_wave_height: self.options.vertex_wave_height,
            reflection_strength: self.options.reflection_strength,
            _padding: 0.0,
        }
    }

    /// Takes over the clock and texture binding of a reloaded instance.
    pub fn adopt(&mut self, previous: &OceanMaterial) {
        self.time = previous.time;
        self.reflection = previous.reflection;
    }
}

/// Compiles the ocean shader on `device`.
pub fn create_ocean_shader_module(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Ocean Shader"),
        source: wgpu::ShaderSource::Wgsl(OCEAN_SHADER_SOURCE.into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn handle(id: u64) -> TextureHandle {
        TextureHandle {
            id,
            width: 256,
            height: 128,
        }
    }

    #[test]
    fn test_uniforms_size() {
        // Must match the WGSL struct layout
        assert_eq!(std::mem::size_of::<OceanUniforms>(), 48);
    }

    #[test]
    fn test_fallback_binding_without_reflection() {
        let material = OceanMaterial::default();
        let fallback = TextureBinding::Solid([0, 32, 64, 255]);
        assert_eq!(material.texture_binding(), fallback);
    }

    #[test]
    fn test_publish_writes_all_parameters() {
        let mut material = OceanMaterial::new(OceanMaterialOptions {
            wave_speed: 2.0,
            wave_scale: 0.1,
            ..Default::default()
        })
        .unwrap();
        material.set_reflection_texture(Some(handle(9)));

        let mut sink: HashMap<String, ParameterValue> = HashMap::new();
        material.update(0.5, &mut sink);

        assert_eq!(sink.len(), 6);
        assert_eq!(sink[params::TIME], ParameterValue::Float(1.0));
        assert_eq!(sink[params::WAVE_SCALE], ParameterValue::Float(0.1));
        let color = ParameterValue::Vec3([0.0, 0.1, 0.2]);
        assert_eq!(sink[params::OCEAN_COLOR], color);
        assert_eq!(
            sink[params::DIFFUSE_MAP],
            ParameterValue::Texture(TextureBinding::Reflection(handle(9)))
        );
    }

    #[test]
    fn test_clearing_texture_falls_back() {
        let mut material = OceanMaterial::default();
        material.set_reflection_texture(Some(handle(1)));
        material.set_reflection_texture(None);

        let mut sink: HashMap<String, ParameterValue> = HashMap::new();
        material.publish(&mut sink);
        assert_eq!(
            sink[params::DIFFUSE_MAP],
            ParameterValue::Texture(TextureBinding::Solid(FALLBACK_TEXEL))
        );
    }

    #[test]
    fn test_invalid_options_rejected() {
        let mut material = OceanMaterial::default();
        let result = material.set_options(OceanMaterialOptions {
            reflection_strength: 1.5,
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(material.options().reflection_strength, 0.8);
    }

    #[test]
    fn test_reflection_uv_flips_vertically() {
        let uv = reflection_uv(Vec2::new(100.0, 25.0), Vec2::new(0.01, 0.01), 0.0, 0.0);
        assert!((uv - Vec2::new(1.0, 0.75)).length() < 1e-6);
    }

    #[test]
    fn test_vertex_wave_offset_zero_height() {
        assert_eq!(vertex_wave_offset(Vec3::new(3.0, 0.0, 4.0), 1.0, 0.0), 0.0);
    }

    #[test]
    fn test_shade_blends_toward_reflection() {
        let tint = Vec3::new(0.0, 0.1, 0.2);
        assert!((shade(tint, Vec3::ONE, 0.0) - tint).length() < 1e-6);
        assert!((shade(tint, Vec3::ONE, 1.0) - Vec3::ONE).length() < 1e-6);
    }

    #[test]
    fn test_uniforms_screen_size() {
        let uniforms = OceanMaterial::default().uniforms(512, 256);
        let expected = [512.0, 256.0, 1.0 / 512.0, 1.0 / 256.0];
        assert_eq!(uniforms.screen_size, expected);
        assert_eq!(uniforms.reflection_strength, 0.8);
    }

    #[test]
    fn test_adopt_keeps_clock_and_texture() {
        let mut old = OceanMaterial::default();
        old.advance(3.0);
        old.set_reflection_texture(Some(handle(4)));

        let mut new = OceanMaterial::default();
        new.adopt(&old);
        assert_eq!(new.time(), 3.0);
        assert_eq!(new.reflection_texture(), Some(handle(4)));
    }

    #[test]
    fn test_shader_entry_points() {
        assert!(OCEAN_SHADER_SOURCE.contains("fn vs_main"));
        assert!(OCEAN_SHADER_SOURCE.contains("fn fs_main"));
    }
}
