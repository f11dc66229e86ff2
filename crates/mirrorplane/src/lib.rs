//! mirrorplane: planar mirror reflections for real-time scenes.
//!
//! A [`PlanarRenderer`] drives a secondary camera that sees the scene mirrored
//! across a plane, keeps its offscreen target sized relative to the main
//! camera and hands the texture to surfaces such as water. The host engine is
//! reached only through the traits in [`host`].
//!
//! # Quick Start
//!
//! ```ignore
//! use mirrorplane::*;
//!
//! let mut ocean = OceanSystem::new(OceanSystemOptions::default(), reflection_camera, allocator);
//! ocean.add_consumer(&mut scene, water)?;
//! ocean.setup(&mut scene)?;
//!
//! // every frame, before the reflection camera renders
//! ocean.tick(&mut scene, dt);
//! ```
//!
//! # Architecture
//!
//! - `mirrorplane-core`: plane, camera snapshots, layer selection, options, errors
//! - `mirrorplane-render`: reflection geometry, render targets, the ocean material
//! - this crate: host traits, the renderer state machine and the ocean system

// Every public item of the facade is documented
#![warn(missing_docs)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod host;
pub mod ocean_system;
pub mod planar_renderer;

pub use host::{CameraHost, LayerRegistry, MaterialHost, SceneHost, SurfaceSink};
pub use ocean_system::{OceanSurface, OceanSystem, EXCLUDED_LAYER_NAME, WORLD_LAYER_NAME};
pub use planar_renderer::{
    PlanarRenderer, RendererHost, RendererState, REFLECTION_CAMERA_PRIORITY,
};

// Re-export core types
pub use mirrorplane_core::{
    CameraRef, EntityId, ExposureSettings, LayerId, LayerSelection, ListenerId, Mat4,
    OceanMaterialOptions, OceanSystemOptions, OpticalParameters, Plane, Quat,
    ReflectionCameraState, ReflectionError, ReflectionOptions, Result, SourceCameraState,
    SubscriptionId, TextureHandle, UVec2, Vec2, Vec3, Vec4, DEFAULT_CAMERA_NAME,
    DEFAULT_LAYER_NAMES,
};

// Re-export render types
pub use mirrorplane_render::{
    mirror_pose, reflection_matrix, MaterialParameterSink, OceanMaterial, ParameterValue,
    RenderError, RenderResult, TargetAllocator, TargetDescriptor, TextureBinding,
    WgpuTargetAllocator, FALLBACK_TEXEL,
};

/// Installs `env_logger` as the `log` backend. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
