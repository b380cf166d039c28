//! Clusters: index sets over a scene cloud, and what this stage attaches to them

use crate::error::Result;
use crate::point::Point3d;
use crate::point_cloud::PointCloud;
use crate::pose::Pose;
use serde::{Deserialize, Serialize};

/// Provenance tag of clusters produced by hue-based segmentation
pub const HUE_CLUSTERING_SOURCE: &str = "HueClustering";

/// Provenance tag of clusters produced by before/after change detection
pub const CHANGE_DETECTION_SOURCE: &str = "ChangeDetection";

/// A subset of a scene cloud, by point index.
///
/// Indices need not be sorted or contiguous; they are validated when the
/// cluster's points are extracted, not at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRef {
    pub indices: Vec<usize>,
    /// Name of the algorithm that produced the cluster
    pub source: String,
    /// Mean hue attached by the upstream segmentation, if any
    pub mean_hue: Option<f64>,
    pub annotations: Vec<Annotation>,
}

impl ClusterRef {
    pub fn new(indices: Vec<usize>, source: impl Into<String>) -> Self {
        Self {
            indices,
            source: source.into(),
            mean_hue: None,
            annotations: Vec::new(),
        }
    }

    pub fn with_mean_hue(mut self, hue: f64) -> Self {
        self.mean_hue = Some(hue);
        self
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn is_from(&self, source: &str) -> bool {
        self.source == source
    }

    /// Copy this cluster's points out of `cloud`
    pub fn extract<T: Clone>(&self, cloud: &PointCloud<T>) -> Result<PointCloud<T>> {
        cloud.select(&self.indices)
    }

    pub fn annotate(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// The pose annotation, if one has been attached
    pub fn pose(&self) -> Option<&PoseAnnotation> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::Pose(pose) => Some(pose),
            _ => None,
        })
    }

    /// The recognized object, if one has been attached
    pub fn object(&self) -> Option<&ObjectAnnotation> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::Object(object) => Some(object),
            _ => None,
        })
    }

    /// The feature match, if one has been attached
    pub fn feature_match(&self) -> Option<&MatchAnnotation> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::Match(m) => Some(m),
            _ => None,
        })
    }
}

/// Results attached to a cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Annotation {
    Pose(PoseAnnotation),
    Object(ObjectAnnotation),
    Match(MatchAnnotation),
}

/// A pose estimate in sensor and world frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseAnnotation {
    pub sensor: Pose,
    pub world: Pose,
}

/// Nominal bounding dimensions of an object class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectDimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

/// A recognized object class with its fixed nominal dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectAnnotation {
    pub name: String,
    pub type_id: u32,
    pub dimensions: ObjectDimensions,
}

/// A positive feature-signature match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAnnotation {
    pub label: String,
    pub centroid: Point3d,
}
