//! Core traits for percepta

use crate::color::Rgb;
use crate::{cluster::ClusterRef, point::*, point_cloud::*, transform::RigidTransform};

/// Anything with a position in space
pub trait Positioned {
    fn position(&self) -> Point3d;
}

/// Points that can be merged into a single representative, as voxel
/// downsampling does.
pub trait VoxelAverage: Positioned + Sized {
    /// Merge a non-empty set of points
    fn average(points: &[&Self]) -> Self;
}

/// The per-frame view of the upstream segmentation collaborator.
///
/// Provides the scene cloud and the clusters over it, and takes back
/// clusters created by this stage.
pub trait ClusterSource {
    /// Full scene cloud the cluster indices refer to
    fn scene(&self) -> &ScenePointCloud;

    fn clusters(&self) -> &[ClusterRef];

    fn clusters_mut(&mut self) -> &mut Vec<ClusterRef>;

    /// Sensor-to-world transform, when the scene has a viewpoint
    fn sensor_to_world(&self) -> Option<RigidTransform>;

    /// Hand a new cluster back upstream
    fn append_cluster(&mut self, cluster: ClusterRef) {
        self.clusters_mut().push(cluster);
    }
}

impl Positioned for Point3d {
    fn position(&self) -> Point3d {
        *self
    }
}

impl VoxelAverage for Point3d {
    fn average(points: &[&Self]) -> Self {
        let sum = points.iter().fold(Vector3d::zeros(), |acc, p| acc + p.coords);
        Point3d::from(sum / points.len() as f64)
    }
}

impl Positioned for ScenePoint {
    fn position(&self) -> Point3d {
        self.position
    }
}

impl VoxelAverage for ScenePoint {
    /// Positions are averaged over all points, normals over valid normals
    /// only and colors over colored points only.
    fn average(points: &[&Self]) -> Self {
        let positions: Vec<&Point3d> = points.iter().map(|p| &p.position).collect();
        let position = Point3d::average(&positions);

        let normals: Vec<Vector3d> = points.iter().filter_map(|p| p.valid_normal()).collect();
        let normal = if normals.is_empty() {
            undefined_normal()
        } else {
            normals.iter().sum::<Vector3d>() / normals.len() as f64
        };

        let colors: Vec<Rgb> = points.iter().filter_map(|p| p.color).collect();
        let color = if colors.is_empty() {
            None
        } else {
            let n = colors.len() as f64;
            let (r, g, b) = colors.iter().fold((0.0, 0.0, 0.0), |(r, g, b), c| {
                (r + c.r as f64, g + c.g as f64, b + c.b as f64)
            });
            Some(Rgb::new((r / n).round() as u8, (g / n).round() as u8, (b / n).round() as u8))
        };

        Self { position, normal, color }
    }
}
