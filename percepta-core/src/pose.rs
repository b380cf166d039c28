//! Object poses

use crate::point::{Point3d, Vector3d};
use crate::transform::RigidTransform;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// A rigid position and orientation.
///
/// The orientation matrix holds the frame axes as its rows. A pose is
/// immutable once built; re-expressing it in another frame yields a new one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    origin: Point3d,
    orientation: Matrix3<f64>,
}

impl Pose {
    /// Build a pose from an origin and three axes, used as matrix rows
    pub fn from_axes(origin: Point3d, axes: [Vector3d; 3]) -> Self {
        let orientation = Matrix3::from_rows(&[
            axes[0].transpose(),
            axes[1].transpose(),
            axes[2].transpose(),
        ]);
        Self { origin, orientation }
    }

    /// Build a pose from a rigid transformation
    pub fn from_transform(transform: &RigidTransform) -> Self {
        Self {
            origin: transform.origin(),
            orientation: transform.basis(),
        }
    }

    pub fn origin(&self) -> Point3d {
        self.origin
    }

    pub fn orientation(&self) -> Matrix3<f64> {
        self.orientation
    }

    /// The three frame axes (rows of the orientation matrix)
    pub fn axes(&self) -> [Vector3d; 3] {
        [0, 1, 2].map(|i| self.orientation.row(i).transpose())
    }

    /// This pose as a rigid transformation
    pub fn to_transform(&self) -> RigidTransform {
        RigidTransform::from_origin_basis(self.origin, self.orientation)
    }

    /// Re-express the pose through `frame_to_target` (`frame_to_target * self`)
    pub fn in_frame(&self, frame_to_target: &RigidTransform) -> Self {
        Self::from_transform(&frame_to_target.compose(self.to_transform()))
    }
}
