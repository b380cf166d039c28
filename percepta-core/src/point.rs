//! Point types and related functionality

use crate::color::Rgb;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// A sensor point as delivered by the scene: position, an optional normal
/// estimate and an optional color.
///
/// The normal follows the sensor convention of marking a missing estimate
/// with NaN components; use [`ScenePoint::valid_normal`] to read it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePoint {
    pub position: Point3d,
    pub normal: Vector3d,
    pub color: Option<Rgb>,
}

impl ScenePoint {
    /// Create a point without normal or color
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3d::new(x, y, z),
            normal: undefined_normal(),
            color: None,
        }
    }

    /// Attach a normal estimate
    pub fn with_normal(mut self, normal: Vector3d) -> Self {
        self.normal = normal;
        self
    }

    /// Attach a color
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// The normal, if every component is finite
    pub fn valid_normal(&self) -> Option<Vector3d> {
        if self.normal.iter().all(|c| c.is_finite()) {
            Some(self.normal)
        } else {
            None
        }
    }

    /// Whether the position has only finite coordinates
    pub fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|c| c.is_finite())
    }
}

impl Default for ScenePoint {
    fn default() -> Self {
        Self {
            position: Point3d::origin(),
            normal: undefined_normal(),
            color: None,
        }
    }
}

impl From<Point3d> for ScenePoint {
    fn from(position: Point3d) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// The "no estimate" normal
pub fn undefined_normal() -> Vector3d {
    Vector3d::repeat(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_normal_is_undefined() {
        let p = ScenePoint::new(1.0, 2.0, 3.0);
        assert!(p.valid_normal().is_none());
        assert!(p.is_finite());
    }

    #[test]
    fn test_partial_nan_normal_is_invalid() {
        let p = ScenePoint::new(0.0, 0.0, 0.0).with_normal(Vector3d::new(0.0, f64::NAN, 1.0));
        assert!(p.valid_normal().is_none());

        let p = p.with_normal(Vector3d::new(0.0, 0.0, 1.0));
        assert_eq!(p.valid_normal(), Some(Vector3d::new(0.0, 0.0, 1.0)));
    }
}
