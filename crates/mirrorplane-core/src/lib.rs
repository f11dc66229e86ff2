//! Core abstractions for mirrorplane.
//!
//! This crate holds the host-independent data model of the planar reflection
//! subsystem:
//! - [`Plane`] in Hessian normal form and its validation
//! - Camera snapshots ([`SourceCameraState`]) and the driven reflection camera
//!   ([`ReflectionCameraState`])
//! - Layer selection parsed from configuration strings
//! - Validated configuration structs and the shared error type

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Options structs legitimately have several boolean flags
#![allow(clippy::struct_excessive_bools)]

pub mod camera;
pub mod error;
pub mod ids;
pub mod layers;
pub mod listeners;
pub mod options;
pub mod plane;

pub use camera::{ExposureSettings, OpticalParameters, ReflectionCameraState, SourceCameraState};
pub use error::{ReflectionError, Result};
pub use ids::{EntityId, LayerId, ListenerId, SubscriptionId, TextureHandle};
pub use layers::{LayerSelection, ResolvedLayers};
pub use listeners::PostRenderListeners;
pub use options::{
    CameraRef, OceanMaterialOptions, OceanSystemOptions, ReflectionOptions,
    DEFAULT_CAMERA_NAME, DEFAULT_LAYER_NAMES,
};
pub use plane::Plane;

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, UVec2, Vec2, Vec3, Vec4};
