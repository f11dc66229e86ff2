//! Reflection plane in Hessian normal form.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{ReflectionError, Result};

/// Normals shorter than this are treated as degenerate.
const MIN_NORMAL_LENGTH: f32 = 1e-6;

/// A plane stored as unit normal `n` and signed distance `d` so that every
/// point `p` on the plane satisfies `dot(n, p) + d == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    normal: Vec3,
    distance: f32,
}

impl Plane {
    /// Builds a plane from a point on it and a (not necessarily unit) normal.
    ///
    /// Fails with [`ReflectionError::InvalidGeometry`] when the normal has zero
    /// length or any component is not finite.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Result<Self> {
        if !point.is_finite() || !normal.is_finite() {
            return Err(ReflectionError::InvalidGeometry(format!(
                "non-finite plane point {point} or normal {normal}"
            )));
        }
        let length = normal.length();
        if length < MIN_NORMAL_LENGTH {
            return Err(ReflectionError::InvalidGeometry(format!(
                "plane normal {normal} has zero length"
            )));
        }
        let normal = normal / length;
        Ok(Self {
            normal,
            distance: -normal.dot(point),
        })
    }

    /// Horizontal plane at the given height with a +Y normal.
    pub fn horizontal(height: f32) -> Self {
        Self {
            normal: Vec3::Y,
            distance: -height,
        }
    }

    /// Returns the unit normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Returns the signed distance term `d`.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Signed distance from a point to the plane, positive on the normal side.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    /// Mirrors a point across the plane.
    pub fn reflect_point(&self, point: Vec3) -> Vec3 {
        point - 2.0 * self.signed_distance(point) * self.normal
    }

    /// Mirrors a direction across the plane (translation does not apply).
    pub fn reflect_direction(&self, direction: Vec3) -> Vec3 {
        direction - 2.0 * self.normal.dot(direction) * self.normal
    }

    /// Projects a point onto the plane.
    pub fn project(&self, point: Vec3) -> Vec3 {
        point - self.signed_distance(point) * self.normal
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::horizontal(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_point_normal_normalizes() {
        let plane = Plane::from_point_normal(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 4.0, 0.0))
            .unwrap();
        assert!((plane.normal() - Vec3::Y).length() < 1e-6);
        assert!((plane.distance() - (-2.0)).abs() < 1e-6);
    }

    #[test]
    fn test_zero_normal_is_invalid_geometry() {
        let result = Plane::from_point_normal(Vec3::ZERO, Vec3::ZERO);
        assert!(matches!(result, Err(ReflectionError::InvalidGeometry(_))));
    }

    #[test]
    fn test_nan_normal_is_invalid_geometry() {
        let result = Plane::from_point_normal(Vec3::ZERO, Vec3::new(f32::NAN, 1.0, 0.0));
        assert!(matches!(result, Err(ReflectionError::InvalidGeometry(_))));
    }

    #[test]
    fn test_signed_distance_and_project() {
        let plane = Plane::horizontal(1.0);
        let distance = plane.signed_distance(Vec3::new(3.0, 4.0, 0.0));
        assert!((distance - 3.0).abs() < 1e-6);
        let projected = plane.project(Vec3::new(3.0, 4.0, -2.0));
        assert!((projected - Vec3::new(3.0, 1.0, -2.0)).length() < 1e-6);
    }

    #[test]
    fn test_reflect_direction_ignores_offset() {
        let plane = Plane::horizontal(10.0);
        let reflected = plane.reflect_direction(Vec3::new(0.0, -1.0, -1.0));
        assert!((reflected - Vec3::new(0.0, 1.0, -1.0)).length() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_reflect_point_is_involution(
            px in -100.0f32..100.0, py in -100.0f32..100.0, pz in -100.0f32..100.0,
            nx in -1.0f32..1.0, ny in -1.0f32..1.0, nz in -1.0f32..1.0,
            qx in -100.0f32..100.0, qy in -100.0f32..100.0, qz in -100.0f32..100.0,
        ) {
            let normal = Vec3::new(nx, ny, nz);
            prop_assume!(normal.length() > 0.01);
            let plane = Plane::from_point_normal(Vec3::new(px, py, pz), normal).unwrap();
            let q = Vec3::new(qx, qy, qz);
            let back = plane.reflect_point(plane.reflect_point(q));
            prop_assert!((back - q).length() < 1e-2);
        }
    }
}
