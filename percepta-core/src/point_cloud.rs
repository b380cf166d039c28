//! Point cloud data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use crate::transform::RigidTransform;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A generic point cloud container.
///
/// Point order is the sensor scan order; clusters refer to points by their
/// offset into this sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloud<T> {
    pub points: Vec<T>,
}

/// A point cloud of bare positions
pub type PointCloud3d = PointCloud<Point3d>;

/// A point cloud of sensor points with optional normals and colors
pub type ScenePointCloud = PointCloud<ScenePoint>;

impl<T> PointCloud<T> {
    /// Create a new empty point cloud
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a new point cloud with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<T>) -> Self {
        Self { points }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the cloud
    pub fn push(&mut self, point: T) {
        self.points.push(point);
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.points.iter()
    }

    /// Get a mutable iterator over the points
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.points.iter_mut()
    }

    /// Clear all points from the cloud
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Point at `index`, or `IndexOutOfRange`
    pub fn try_get(&self, index: usize) -> Result<&T> {
        self.points.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.points.len(),
        })
    }
}

impl<T: Clone> PointCloud<T> {
    /// Copy the points at `indices` into a new cloud, in the order given.
    ///
    /// Fails on the first index that does not address a point.
    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        let points = indices
            .iter()
            .map(|&index| self.try_get(index).cloned())
            .collect::<Result<Vec<T>>>()?;
        Ok(Self::from_points(points))
    }
}

impl PointCloud<ScenePoint> {
    /// Bare positions, in scan order
    pub fn positions(&self) -> Vec<Point3d> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Apply a rigid transformation to positions and normals
    pub fn transform(&mut self, transform: &RigidTransform) {
        for point in &mut self.points {
            point.position = transform.transform_point(&point.position);
            point.normal = transform.transform_vector(&point.normal);
        }
    }
}

impl PointCloud<Point3d> {
    /// Apply a rigid transformation to all points in the cloud
    pub fn transform(&mut self, transform: &RigidTransform) {
        for point in &mut self.points {
            *point = transform.transform_point(point);
        }
    }
}

impl<T> Default for PointCloud<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for PointCloud<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<T> IndexMut<usize> for PointCloud<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.points[index]
    }
}

impl<T> IntoIterator for PointCloud<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a PointCloud<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl<T> Extend<T> for PointCloud<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.points.extend(iter);
    }
}

impl<T> FromIterator<T> for PointCloud<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            points: Vec::from_iter(iter),
        }
    }
}
