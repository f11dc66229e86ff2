//! Rendering side of mirrorplane.
//!
//! This crate provides:
//! - Reflection geometry: the plane reflection matrix and the mirrored camera pose
//! - Render target management with a pluggable [`TargetAllocator`] and a wgpu backend
//!   that regenerates the reflection's mip chain after each render
//! - The ocean material that consumes the reflection texture

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod gpu_target;
pub mod mip_chain;
pub mod ocean_material;
pub mod parameters;
pub mod reflection;
pub mod render_target;

pub use error::{RenderError, RenderResult};
pub use gpu_target::{
    GpuRenderTarget, WgpuTargetAllocator, REFLECTION_COLOR_FORMAT, REFLECTION_DEPTH_FORMAT,
};
pub use mip_chain::{MipChainPass, MIP_BLIT_SHADER_SOURCE};
pub use ocean_material::{
    create_ocean_shader_module, reflection_uv, shade, vertex_wave_offset, OceanMaterial,
    OceanUniforms, FALLBACK_TEXEL, OCEAN_SHADER_SOURCE,
};
pub use parameters::{MaterialParameterSink, ParameterValue, TextureBinding};
pub use reflection::{
    ground_reflection_matrix, look_rotation, mirror_pose, reflection_matrix, MirrorPose,
};
pub use render_target::{
    target_dimensions, RenderTarget, RenderTargetManager, TargetAllocator, TargetDescriptor,
    TargetRequest,
};
