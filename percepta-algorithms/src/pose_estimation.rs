//! Pose estimation for elongated objects
//!
//! The estimator reduces a cluster with a voxel grid, takes the farthest
//! pair of the reduced points as the long axis, derives a second axis from
//! the mean surface normal and completes an orthonormal frame.

use crate::diameter::{find_diameter, Endpoints};
use crate::filtering::voxel_grid_filter;
use percepta_core::{
    Annotation, ClusterRef, Error, ObjectAnnotation, ObjectDimensions, Pose, PoseAnnotation,
    Result, RigidTransform, ScenePoint, ScenePointCloud, Vector3d, HUE_CLUSTERING_SOURCE,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Vectors shorter than this cannot be turned into a frame axis
const MIN_AXIS_NORM: f64 = 1e-12;

/// Class written onto a cluster whose pose was estimated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectClass {
    pub name: String,
    pub type_id: u32,
    pub dimensions: ObjectDimensions,
}

impl Default for ObjectClass {
    fn default() -> Self {
        Self {
            name: "Knife".to_string(),
            type_id: 6,
            dimensions: ObjectDimensions {
                width: 0.28,
                height: 0.056,
                depth: 0.03,
            },
        }
    }
}

/// Configuration for [`AxisPoseEstimator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisPoseConfig {
    /// Edge length of the downsampling voxels
    pub leaf_size: f64,
    /// Exclusive lower bound on a cluster's mean hue
    pub min_hue: f64,
    /// Exclusive upper bound on a cluster's mean hue
    pub max_hue: f64,
    pub object: ObjectClass,
}

impl Default for AxisPoseConfig {
    fn default() -> Self {
        Self {
            leaf_size: 0.01,
            min_hue: 0.0,
            max_hue: 360.0,
            object: ObjectClass::default(),
        }
    }
}

/// A successful pose estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseEstimate {
    pub sensor: Pose,
    pub world: Pose,
    pub endpoints: Endpoints,
    /// Number of points left after downsampling
    pub support: usize,
}

impl PoseEstimate {
    pub fn annotation(&self) -> PoseAnnotation {
        PoseAnnotation {
            sensor: self.sensor,
            world: self.world,
        }
    }
}

/// Estimates the pose of an elongated rigid object from its cluster
#[derive(Debug, Clone, Default)]
pub struct AxisPoseEstimator {
    config: AxisPoseConfig,
}

impl AxisPoseEstimator {
    pub fn new(config: AxisPoseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AxisPoseConfig {
        &self.config
    }

    /// Hue-segmented clusters whose mean hue lies strictly inside the
    /// configured band
    pub fn is_eligible(&self, cluster: &ClusterRef) -> bool {
        cluster.is_from(HUE_CLUSTERING_SOURCE)
            && cluster
                .mean_hue
                .is_some_and(|hue| hue > self.config.min_hue && hue < self.config.max_hue)
    }

    /// Estimate the sensor- and world-frame pose of a cluster.
    ///
    /// # Arguments
    /// * `cluster` - The cluster's points, with normals where available
    /// * `sensor_to_world` - Transform from the sensor frame to the world frame
    ///
    /// # Errors
    /// `DegenerateGeometry` when fewer than two points survive downsampling,
    /// when no point has a valid normal, or when the mean normal is parallel
    /// to the long axis.
    pub fn estimate_pose(&self, cluster: &ScenePointCloud, sensor_to_world: &RigidTransform) -> Result<PoseEstimate> {
        let reduced = voxel_grid_filter(cluster, self.config.leaf_size)?;
        let positions = reduced.positions();

        let diameter = find_diameter(&positions).ok_or_else(|| {
            Error::DegenerateGeometry(format!(
                "{} point(s) after downsampling, need at least 2",
                reduced.len()
            ))
        })?;
        let endpoints = Endpoints::label(positions[diameter.first], positions[diameter.second]);

        let primary = endpoints.lowest - endpoints.highest;
        let secondary = mean_normal_axis(&reduced.points)?;
        let axes = orthonormal_frame(primary, secondary)?;

        let sensor = Pose::from_axes(endpoints.highest, axes);
        let world = sensor.in_frame(sensor_to_world);

        debug!(
            support = reduced.len(),
            length = diameter.length,
            "estimated axis pose"
        );

        Ok(PoseEstimate {
            sensor,
            world,
            endpoints,
            support: reduced.len(),
        })
    }

    /// Annotate the first eligible cluster that yields a pose.
    ///
    /// Degenerate clusters are skipped and left untouched. Returns the index
    /// of the annotated cluster.
    pub fn annotate_first(
        &self,
        scene: &ScenePointCloud,
        clusters: &mut [ClusterRef],
        sensor_to_world: &RigidTransform,
    ) -> Option<usize> {
        for (index, cluster) in clusters.iter_mut().enumerate() {
            if !self.is_eligible(cluster) {
                continue;
            }
            debug!(index, points = cluster.len(), hue = ?cluster.mean_hue, "eligible cluster");

            let estimate = cluster
                .extract(scene)
                .and_then(|points| self.estimate_pose(&points, sensor_to_world));

            match estimate {
                Ok(estimate) => {
                    cluster.annotate(Annotation::Object(ObjectAnnotation {
                        name: self.config.object.name.clone(),
                        type_id: self.config.object.type_id,
                        dimensions: self.config.object.dimensions,
                    }));
                    cluster.annotate(Annotation::Pose(estimate.annotation()));
                    info!(index, object = %self.config.object.name, "pose annotated");
                    return Some(index);
                }
                Err(e) => warn!(index, error = %e, "skipping cluster"),
            }
        }

        debug!("no cluster yielded a pose");
        None
    }
}

/// Mean of the valid normals with the Y and Z components negated.
///
/// The sign flip matches the orientation of the sensor's normal estimates.
pub fn mean_normal_axis(points: &[ScenePoint]) -> Result<Vector3d> {
    let normals: Vec<Vector3d> = points.iter().filter_map(|p| p.valid_normal()).collect();
    if normals.is_empty() {
        return Err(Error::DegenerateGeometry("no point has a valid normal".to_string()));
    }

    let mean = normals.iter().sum::<Vector3d>() / normals.len() as f64;
    Ok(Vector3d::new(mean.x, -mean.y, -mean.z))
}

/// Build three orthonormal axes from a primary axis and a rough secondary.
///
/// The third axis is `primary × secondary`, and the secondary is then
/// replaced by `third × primary` so it is exactly orthogonal to the primary.
pub fn orthonormal_frame(primary: Vector3d, secondary: Vector3d) -> Result<[Vector3d; 3]> {
    let x = normalized(primary, "primary axis")?;
    let z = normalized(x.cross(&secondary), "third axis (secondary parallel to primary)")?;
    let y = normalized(z.cross(&x), "secondary axis")?;
    Ok([x, y, z])
}

fn normalized(v: Vector3d, what: &str) -> Result<Vector3d> {
    v.try_normalize(MIN_AXIS_NORM)
        .ok_or_else(|| Error::DegenerateGeometry(format!("{what} has zero length")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;
    use percepta_core::{Point3d, PointCloud};

    fn rod(normal: Vector3d) -> ScenePointCloud {
        (0..30)
            .map(|i| ScenePoint::new(0.105 + i as f64 * 0.01, 0.2, 0.805).with_normal(normal))
            .collect()
    }

    #[test]
    fn test_estimate_pose_rod() {
        let estimator = AxisPoseEstimator::default();
        let estimate = estimator
            .estimate_pose(&rod(Vector3d::new(0.0, 0.0, -1.0)), &RigidTransform::identity())
            .unwrap();

        // Far end has the larger coordinate sum and becomes the origin
        assert!(estimate.endpoints.highest.x > estimate.endpoints.lowest.x);
        assert_relative_eq!(estimate.sensor.origin(), estimate.endpoints.highest);

        let [x, y, z] = estimate.sensor.axes();
        assert_relative_eq!(x, Vector3d::new(-1.0, 0.0, 0.0), epsilon = 1e-9);
        // normal (0,0,-1) flips to (0,0,1)
        assert_relative_eq!(y, Vector3d::new(0.0, 0.0, 1.0), epsilon = 1e-9);
        assert_relative_eq!(z, Vector3d::new(0.0, 1.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_estimate_pose_world_frame() {
        let estimator = AxisPoseEstimator::default();
        let sensor_to_world = RigidTransform::from_translation_rotation(
            Vector3d::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, 0.5),
        );
        let estimate = estimator
            .estimate_pose(&rod(Vector3d::new(0.0, 1.0, 0.0)), &sensor_to_world)
            .unwrap();

        let expected_origin = sensor_to_world.transform_point(&estimate.sensor.origin());
        assert_relative_eq!(estimate.world.origin(), expected_origin, epsilon = 1e-9);
        assert_relative_eq!(
            estimate.world.orientation(),
            sensor_to_world.basis() * estimate.sensor.orientation(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_estimate_pose_single_point_is_degenerate() {
        let cluster = PointCloud::from_points(vec![
            ScenePoint::new(0.0, 0.0, 0.0).with_normal(Vector3d::new(0.0, 0.0, 1.0)),
        ]);
        let err = AxisPoseEstimator::default()
            .estimate_pose(&cluster, &RigidTransform::identity())
            .unwrap_err();
        assert!(err.is_degenerate());
    }

    #[test]
    fn test_estimate_pose_points_merging_into_one_voxel() {
        let cluster = PointCloud::from_points(vec![
            ScenePoint::new(0.001, 0.001, 0.001).with_normal(Vector3d::new(0.0, 0.0, 1.0)),
            ScenePoint::new(0.002, 0.002, 0.002).with_normal(Vector3d::new(0.0, 0.0, 1.0)),
        ]);
        let err = AxisPoseEstimator::default()
            .estimate_pose(&cluster, &RigidTransform::identity())
            .unwrap_err();
        assert!(err.is_degenerate());
    }

    #[test]
    fn test_estimate_pose_without_normals_is_degenerate() {
        let cluster: ScenePointCloud = (0..10).map(|i| ScenePoint::new(i as f64 * 0.05, 0.0, 0.0)).collect();
        let err = AxisPoseEstimator::default()
            .estimate_pose(&cluster, &RigidTransform::identity())
            .unwrap_err();
        assert!(err.is_degenerate());
    }

    #[test]
    fn test_estimate_pose_normal_along_axis_is_degenerate() {
        let err = AxisPoseEstimator::default()
            .estimate_pose(&rod(Vector3d::new(1.0, 0.0, 0.0)), &RigidTransform::identity())
            .unwrap_err();
        assert!(err.is_degenerate());
    }

    #[test]
    fn test_mean_normal_axis_flips_y_and_z() {
        let points = vec![
            ScenePoint::new(0.0, 0.0, 0.0).with_normal(Vector3d::new(0.2, 0.4, 0.6)),
            ScenePoint::new(0.0, 0.0, 0.0),
            ScenePoint::new(0.0, 0.0, 0.0).with_normal(Vector3d::new(0.4, 0.0, 0.2)),
        ];
        let axis = mean_normal_axis(&points).unwrap();
        assert_relative_eq!(axis, Vector3d::new(0.3, -0.2, -0.4), epsilon = 1e-12);
    }

    #[test]
    fn test_orthonormal_frame_corrects_skew() {
        let [x, y, z] = orthonormal_frame(Vector3d::new(2.0, 0.0, 0.0), Vector3d::new(1.0, 1.0, 0.0)).unwrap();
        assert_relative_eq!(x, Vector3d::x(), epsilon = 1e-12);
        assert_relative_eq!(y, Vector3d::y(), epsilon = 1e-12);
        assert_relative_eq!(z, Vector3d::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_is_eligible() {
        let estimator = AxisPoseEstimator::new(AxisPoseConfig {
            min_hue: 10.0,
            max_hue: 40.0,
            ..AxisPoseConfig::default()
        });

        assert!(estimator.is_eligible(&ClusterRef::new(vec![0], HUE_CLUSTERING_SOURCE).with_mean_hue(20.0)));
        assert!(!estimator.is_eligible(&ClusterRef::new(vec![0], HUE_CLUSTERING_SOURCE).with_mean_hue(40.0)));
        assert!(!estimator.is_eligible(&ClusterRef::new(vec![0], HUE_CLUSTERING_SOURCE)));
        assert!(!estimator.is_eligible(&ClusterRef::new(vec![0], "Other").with_mean_hue(20.0)));
    }

    #[test]
    fn test_annotate_first_skips_degenerate_cluster() {
        let mut scene: ScenePointCloud = rod(Vector3d::new(0.0, 0.0, -1.0));
        scene.push(ScenePoint::new(0.0, 0.0, 0.0));
        let lone = scene.len() - 1;

        let mut clusters = vec![
            ClusterRef::new(vec![lone], HUE_CLUSTERING_SOURCE).with_mean_hue(20.0),
            ClusterRef::new((0..30).collect(), HUE_CLUSTERING_SOURCE).with_mean_hue(20.0),
        ];

        let annotated = AxisPoseEstimator::default().annotate_first(&scene, &mut clusters, &RigidTransform::identity());
        assert_eq!(annotated, Some(1));
        assert!(clusters[0].annotations.is_empty());
        assert_eq!(clusters[1].object().map(|o| o.name.as_str()), Some("Knife"));
        assert!(clusters[1].pose().is_some());

        let origin = clusters[1].pose().unwrap().sensor.origin();
        assert_relative_eq!(origin, Point3d::new(0.395, 0.2, 0.805), epsilon = 1e-9);
    }
}
