//! In-memory per-frame input

use crate::cluster::ClusterRef;
use crate::point_cloud::ScenePointCloud;
use crate::traits::ClusterSource;
use crate::transform::RigidTransform;

/// One processing call's worth of input: the scene, its clusters and the
/// sensor viewpoint.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub scene: ScenePointCloud,
    pub clusters: Vec<ClusterRef>,
    pub sensor_to_world: Option<RigidTransform>,
}

impl Frame {
    pub fn new(scene: ScenePointCloud, clusters: Vec<ClusterRef>) -> Self {
        Self {
            scene,
            clusters,
            sensor_to_world: None,
        }
    }

    pub fn with_sensor_to_world(mut self, transform: RigidTransform) -> Self {
        self.sensor_to_world = Some(transform);
        self
    }
}

impl ClusterSource for Frame {
    fn scene(&self) -> &ScenePointCloud {
        &self.scene
    }

    fn clusters(&self) -> &[ClusterRef] {
        &self.clusters
    }

    fn clusters_mut(&mut self) -> &mut Vec<ClusterRef> {
        &mut self.clusters
    }

    fn sensor_to_world(&self) -> Option<RigidTransform> {
        self.sensor_to_world
    }
}
