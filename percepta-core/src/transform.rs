//! Rigid 3D transformation utilities

use crate::point::{Point3d, Vector3d};
use nalgebra::{Isometry3, Matrix3, Matrix4, Rotation3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// A rigid (rotation + translation) transformation, e.g. sensor to world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub isometry: Isometry3<f64>,
}

impl RigidTransform {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            isometry: Isometry3::identity(),
        }
    }

    /// Create a translation transformation
    pub fn translation(translation: Vector3d) -> Self {
        Self {
            isometry: Isometry3::from_parts(Translation3::from(translation), UnitQuaternion::identity()),
        }
    }

    /// Create a rotation transformation from a quaternion
    pub fn rotation(rotation: UnitQuaternion<f64>) -> Self {
        Self {
            isometry: Isometry3::from_parts(Translation3::identity(), rotation),
        }
    }

    /// Create a transformation from translation and rotation
    pub fn from_translation_rotation(translation: Vector3d, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            isometry: Isometry3::from_parts(Translation3::from(translation), rotation),
        }
    }

    /// Create a transformation from an origin and an orthonormal basis matrix.
    ///
    /// The matrix is trusted to be a proper rotation; debug builds reject a
    /// basis whose determinant is not close to one.
    pub fn from_origin_basis(origin: Point3d, basis: Matrix3<f64>) -> Self {
        debug_assert!(
            (basis.determinant() - 1.0).abs() < 1e-6,
            "basis is not a proper rotation (determinant {})",
            basis.determinant()
        );
        let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(basis));
        Self::from_translation_rotation(origin.coords, rotation)
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3d) -> Point3d {
        self.isometry.transform_point(point)
    }

    /// Apply the rotation part to a vector
    pub fn transform_vector(&self, vector: &Vector3d) -> Vector3d {
        self.isometry.transform_vector(vector)
    }

    /// Compose this transformation with another (`self * other`)
    pub fn compose(self, other: Self) -> Self {
        Self {
            isometry: self.isometry * other.isometry,
        }
    }

    /// Get the inverse transformation
    pub fn inverse(self) -> Self {
        Self {
            isometry: self.isometry.inverse(),
        }
    }

    /// Translation part
    pub fn origin(&self) -> Point3d {
        Point3d::from(self.isometry.translation.vector)
    }

    /// Rotation part as a matrix
    pub fn basis(&self) -> Matrix3<f64> {
        self.isometry.rotation.to_rotation_matrix().into_inner()
    }

    /// Homogeneous 4x4 matrix
    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        self.isometry.to_homogeneous()
    }

    /// Check if this is approximately the identity transformation
    pub fn is_identity(&self, epsilon: f64) -> bool {
        (self.to_homogeneous() - Matrix4::identity()).norm() < epsilon
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for RigidTransform {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl From<Isometry3<f64>> for RigidTransform {
    fn from(isometry: Isometry3<f64>) -> Self {
        Self { isometry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_compose_applies_right_operand_first() {
        let shift = RigidTransform::translation(Vector3d::new(1.0, 0.0, 0.0));
        let turn = RigidTransform::rotation(UnitQuaternion::from_axis_angle(&Vector3d::z_axis(), FRAC_PI_2));

        let p = (turn * shift).transform_point(&Point3d::origin());
        assert_relative_eq!(p, Point3d::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = RigidTransform::from_translation_rotation(
            Vector3d::new(0.5, -1.0, 2.0),
            UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3),
        );
        assert!((t * t.inverse()).is_identity(1e-9));
    }

    #[test]
    fn test_from_origin_basis() {
        let basis = Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let t = RigidTransform::from_origin_basis(Point3d::new(1.0, 2.0, 3.0), basis);
        assert_relative_eq!(t.basis(), basis, epsilon = 1e-12);
        assert_relative_eq!(t.origin(), Point3d::new(1.0, 2.0, 3.0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not a proper rotation")]
    fn test_from_origin_basis_rejects_reflection() {
        let mirrored = Matrix3::new(-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        RigidTransform::from_origin_basis(Point3d::origin(), mirrored);
    }
}
