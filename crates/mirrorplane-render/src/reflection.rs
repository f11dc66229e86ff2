//! Planar reflection geometry.

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
use mirrorplane_core::Plane;

/// Above this |cos| between forward and world up the look-at basis degenerates.
const UP_PARALLEL_THRESHOLD: f32 = 0.999;

/// Computes the reflection matrix for a plane.
///
/// For any point `p`, `R * p = p - 2 * (dot(n, p) + d) * n`.
pub fn reflection_matrix(plane: &Plane) -> Mat4 {
    let Vec3 { x, y, z } = plane.normal();
    let d = plane.distance();

    // | 1-2nx²   -2nxny   -2nxnz   -2nxd |
    // | -2nxny   1-2ny²   -2nynz   -2nyd |
    // | -2nxnz   -2nynz   1-2nz²   -2nzd |
    // |    0        0        0       1   |
    Mat4::from_cols(
        Vec4::new(1.0 - 2.0 * x * x, -2.0 * x * y, -2.0 * x * z, 0.0),
        Vec4::new(-2.0 * x * y, 1.0 - 2.0 * y * y, -2.0 * y * z, 0.0),
        Vec4::new(-2.0 * x * z, -2.0 * y * z, 1.0 - 2.0 * z * z, 0.0),
        Vec4::new(-2.0 * x * d, -2.0 * y * d, -2.0 * z * d, 1.0),
    )
}

/// Computes the reflection matrix for a horizontal plane at the given height.
///
/// Assumes Y-up coordinate system.
pub fn ground_reflection_matrix(height: f32) -> Mat4 {
    reflection_matrix(&Plane::horizontal(height))
}

/// Pose of the mirrored camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorPose {
    /// Mirrored camera position.
    pub position: Vec3,
    /// Mirrored look-at target, one unit ahead of `position`.
    pub target: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
    /// Unit up direction of the resulting camera frame.
    pub up: Vec3,
    /// Camera orientation (right-handed, looking down local -Z).
    pub orientation: Quat,
}

/// Mirrors a camera at `position` looking along `forward` across `plane`.
///
/// The mirrored frame uses world +Y as its up hint. When the mirrored view
/// direction is (nearly) vertical, +Z is used instead.
pub fn mirror_pose(plane: &Plane, position: Vec3, forward: Vec3) -> MirrorPose {
    let matrix = reflection_matrix(plane);
    let mirrored_position = matrix.transform_point3(position);
    let mirrored_target = matrix.transform_point3(position + forward);
    let mirrored_forward = (mirrored_target - mirrored_position).normalize_or(Vec3::NEG_Z);
    let (orientation, up) = look_rotation(mirrored_forward, Vec3::Y);

    MirrorPose {
        position: mirrored_position,
        target: mirrored_target,
        forward: mirrored_forward,
        up,
        orientation,
    }
}

/// Builds the orientation of a camera looking along `forward`.
///
/// Returns the rotation and the orthogonalized up vector.
pub fn look_rotation(forward: Vec3, up_hint: Vec3) -> (Quat, Vec3) {
    let forward = forward.normalize_or(Vec3::NEG_Z);
    let up_hint = if forward.dot(up_hint).abs() > UP_PARALLEL_THRESHOLD {
        Vec3::Z
    } else {
        up_hint
    };
    let right = forward.cross(up_hint).normalize();
    let up = right.cross(forward);
    let rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward));
    (rotation.normalize(), up)
}
