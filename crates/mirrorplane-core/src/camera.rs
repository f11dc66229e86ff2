//! Camera state snapshots exchanged with the host.

use glam::{Quat, UVec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::ids::{LayerId, TextureHandle};

/// Physical exposure triple copied verbatim between cameras.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureSettings {
    /// Aperture in f-stops.
    pub aperture: f32,
    /// Sensor sensitivity (ISO).
    pub sensitivity: f32,
    /// Shutter time in seconds.
    pub shutter: f32,
}

impl Default for ExposureSettings {
    fn default() -> Self {
        Self {
            aperture: 16.0,
            sensitivity: 1000.0,
            shutter: 1.0 / 1000.0,
        }
    }
}

/// Lens parameters of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticalParameters {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Half-height of the view volume in orthographic mode.
    pub ortho_height: f32,
    /// Near clipping plane.
    pub near_clip: f32,
    /// Far clipping plane.
    pub far_clip: f32,
    /// Exposure triple.
    pub exposure: ExposureSettings,
}

impl Default for OpticalParameters {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            ortho_height: 10.0,
            near_clip: 0.1,
            far_clip: 1000.0,
            exposure: ExposureSettings::default(),
        }
    }
}

/// Per-frame snapshot of the scene's primary camera.
///
/// Owned by the host; the reflection subsystem only reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceCameraState {
    /// World-space position.
    pub position: Vec3,
    /// World-space view direction.
    pub forward: Vec3,
    /// Lens parameters.
    pub optics: OpticalParameters,
    /// Resolution of the surface the camera renders into.
    pub resolution: UVec2,
}

impl SourceCameraState {
    /// Creates a snapshot looking from `position` toward `target`.
    pub fn looking_at(position: Vec3, target: Vec3, resolution: UVec2) -> Self {
        Self {
            position,
            forward: (target - position).normalize_or(Vec3::NEG_Z),
            optics: OpticalParameters::default(),
            resolution,
        }
    }
}

/// The secondary camera driven by the reflection subsystem.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionCameraState {
    /// World-space position (mirrored source position).
    pub position: Vec3,
    /// World-space orientation; the camera looks down its local -Z.
    pub orientation: Quat,
    /// Optics copied from the source camera.
    pub optics: OpticalParameters,
    /// Layers this camera is restricted to.
    pub layers: Vec<LayerId>,
    /// Current output target.
    pub target: Option<TextureHandle>,
    /// Render order; lower values render first.
    pub priority: i32,
}

impl ReflectionCameraState {
    /// World-space forward direction.
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// World-space up direction.
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }
}

impl Default for ReflectionCameraState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            optics: OpticalParameters::default(),
            layers: Vec::new(),
            target: None,
            priority: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looking_at_normalizes_forward() {
        let cam = SourceCameraState::looking_at(
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(0.0, 5.0, -10.0),
            UVec2::new(1920, 1080),
        );
        assert!((cam.forward - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_degenerate_look_at_falls_back() {
        let cam = SourceCameraState::looking_at(Vec3::ONE, Vec3::ONE, UVec2::new(8, 8));
        assert_eq!(cam.forward, Vec3::NEG_Z);
    }

    #[test]
    fn test_reflection_camera_default_axes() {
        let cam = ReflectionCameraState::default();
        assert!((cam.forward() - Vec3::NEG_Z).length() < 1e-6);
        assert!((cam.up() - Vec3::Y).length() < 1e-6);
        assert!(cam.target.is_none());
    }
}
