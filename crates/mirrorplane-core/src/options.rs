//! Configuration options for the reflection subsystem.
//!
//! Every struct here is plain serde data with defaults. Numeric fields carry
//! an accepted range that [`ReflectionOptions::validate`] and friends enforce
//! before a configuration is applied.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ReflectionError, Result};
use crate::ids::EntityId;
use crate::layers::LayerSelection;
use crate::plane::Plane;

/// Name looked up when no source camera is configured explicitly.
pub const DEFAULT_CAMERA_NAME: &str = "Camera";

/// Layers rendered into the reflection by default.
pub const DEFAULT_LAYER_NAMES: &str = "World,Skybox";

/// Reference to a camera entity in the host scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraRef {
    /// A concrete entity.
    Entity(EntityId),
    /// An entity looked up by name when the renderer initializes.
    Named(String),
}

impl Default for CameraRef {
    fn default() -> Self {
        CameraRef::Named(DEFAULT_CAMERA_NAME.to_string())
    }
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ReflectionError::InvalidOption {
            name,
            value,
            min,
            max,
        })
    }
}

/// Options of a planar reflection renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionOptions {
    /// Reflection resolution relative to the source camera's output (0.1-2.0).
    pub scale: f32,

    /// Upper bound on either target dimension (128-2048).
    pub max_resolution: u32,

    /// Whether to generate a mip chain for the reflection texture.
    pub mipmaps: bool,

    /// Whether the render target gets a depth buffer.
    pub depth: bool,

    /// A point on the reflection plane.
    pub plane_point: Vec3,

    /// Normal of the reflection plane; need not be unit length.
    pub plane_normal: Vec3,

    /// Run the update every host frame tick.
    pub auto_update: bool,

    /// Comma-separated layer names the reflection camera renders.
    pub layer_names: String,

    /// Camera whose view gets mirrored.
    pub source_camera: CameraRef,
}

impl ReflectionOptions {
    /// Accepted range for [`Self::scale`].
    pub const SCALE_RANGE: (f32, f32) = (0.1, 2.0);
    /// Accepted range for [`Self::max_resolution`].
    pub const MAX_RESOLUTION_RANGE: (u32, u32) = (128, 2048);

    /// Checks numeric ranges and plane geometry.
    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self) -> Result<()> {
        let (min, max) = Self::SCALE_RANGE;
        check_range("scale", self.scale, min, max)?;
        let (min, max) = Self::MAX_RESOLUTION_RANGE;
        check_range(
            "max_resolution",
            self.max_resolution as f32,
            min as f32,
            max as f32,
        )?;
        self.plane()?;
        Ok(())
    }

    /// Derives the reflection plane.
    pub fn plane(&self) -> Result<Plane> {
        Plane::from_point_normal(self.plane_point, self.plane_normal)
    }

    /// Parses [`Self::layer_names`].
    pub fn layer_selection(&self) -> LayerSelection {
        LayerSelection::parse(&self.layer_names)
    }

    /// Returns true if `other` needs a different render target.
    pub fn target_differs(&self, other: &Self) -> bool {
        self.scale.to_bits() != other.scale.to_bits()
            || self.max_resolution != other.max_resolution
            || self.mipmaps != other.mipmaps
            || self.depth != other.depth
    }

    /// Loads and validates options from JSON. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Serializes the options to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for ReflectionOptions {
    fn default() -> Self {
        Self {
            scale: 0.5,
            max_resolution: 512,
            mipmaps: false,
            depth: true,
            plane_point: Vec3::ZERO,
            plane_normal: Vec3::Y,
            auto_update: true,
            layer_names: DEFAULT_LAYER_NAMES.to_string(),
            source_camera: CameraRef::default(),
        }
    }
}

/// Shading parameters of the ocean surface that samples the reflection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanMaterialOptions {
    /// Speed of the wave animation (0-5).
    pub wave_speed: f32,
    /// Screen-space distortion of the reflection lookup (0-0.2).
    pub wave_scale: f32,
    /// Height of vertex displacement (0-2).
    pub vertex_wave_height: f32,
    /// Base tint of the water.
    pub ocean_color: Vec3,
    /// Blend weight of the reflection against the tint (0-1).
    pub reflection_strength: f32,
}

impl OceanMaterialOptions {
    /// Checks every numeric range.
    pub fn validate(&self) -> Result<()> {
        check_range("wave_speed", self.wave_speed, 0.0, 5.0)?;
        check_range("wave_scale", self.wave_scale, 0.0, 0.2)?;
        check_range("vertex_wave_height", self.vertex_wave_height, 0.0, 2.0)?;
        check_range("reflection_strength", self.reflection_strength, 0.0, 1.0)?;
        Ok(())
    }
}

impl Default for OceanMaterialOptions {
    fn default() -> Self {
        Self {
            wave_speed: 0.0,
            wave_scale: 0.0,
            vertex_wave_height: 0.0,
            ocean_color: Vec3::new(0.0, 0.1, 0.2),
            reflection_strength: 0.8,
        }
    }
}

/// Options of the ocean orchestrator that wires a reflection into water.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanSystemOptions {
    /// The scene's main camera.
    pub main_camera: CameraRef,
    /// Comma-separated layers rendered into the reflection.
    pub reflection_layers: String,
    /// Reflection resolution scale (0.1-2.0).
    pub reflection_scale: f32,
    /// World position of the water plane.
    pub ocean_position: Vec3,
    /// Move ocean surfaces to an "Excluded" layer so they never reflect themselves.
    pub exclude_ocean_from_reflection: bool,
    /// Shading parameters applied to every ocean surface.
    pub material: OceanMaterialOptions,
}

impl OceanSystemOptions {
    /// Checks every numeric range.
    pub fn validate(&self) -> Result<()> {
        let (min, max) = ReflectionOptions::SCALE_RANGE;
        check_range("reflection_scale", self.reflection_scale, min, max)?;
        self.material.validate()
    }

    /// Reflection options derived from the ocean settings.
    pub fn reflection_options(&self) -> ReflectionOptions {
        ReflectionOptions {
            scale: self.reflection_scale,
            plane_point: self.ocean_position,
            plane_normal: Vec3::Y,
            layer_names: self.reflection_layers.clone(),
            source_camera: self.main_camera.clone(),
            auto_update: true,
            mipmaps: false,
            depth: true,
            ..ReflectionOptions::default()
        }
    }
}

impl Default for OceanSystemOptions {
    fn default() -> Self {
        Self {
            main_camera: CameraRef::default(),
            reflection_layers: DEFAULT_LAYER_NAMES.to_string(),
            reflection_scale: 0.5,
            ocean_position: Vec3::ZERO,
            exclude_ocean_from_reflection: true,
            material: OceanMaterialOptions::default(),
        }
    }
}
