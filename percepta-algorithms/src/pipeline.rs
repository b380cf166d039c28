//! Per-frame cluster processing

use crate::features::{FeatureMatcher, MatchDecision};
use crate::pose_estimation::AxisPoseEstimator;
use percepta_core::{ClusterSource, Error};
use tracing::{debug, warn};

/// What one frame produced
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Index of the cluster that received a pose, if any
    pub posed_cluster: Option<usize>,
    pub matches: Vec<MatchDecision>,
    /// Feature/position correlation was skipped for this frame
    pub correlation_skipped: bool,
}

impl FrameReport {
    pub fn matched_clusters(&self) -> impl Iterator<Item = usize> + '_ {
        self.matches.iter().filter(|m| m.matched).map(|m| m.cluster)
    }
}

/// Runs pose estimation and feature matching over a frame's clusters.
///
/// Failures on individual clusters never fail the frame: the cluster is
/// left unannotated and processing continues.
#[derive(Debug, Clone, Default)]
pub struct FrameProcessor {
    estimator: AxisPoseEstimator,
    matcher: FeatureMatcher,
}

impl FrameProcessor {
    pub fn new(estimator: AxisPoseEstimator, matcher: FeatureMatcher) -> Self {
        Self { estimator, matcher }
    }

    pub fn estimator(&self) -> &AxisPoseEstimator {
        &self.estimator
    }

    pub fn matcher(&self) -> &FeatureMatcher {
        &self.matcher
    }

    /// Annotate the clusters of `source` in place
    pub fn process<S: ClusterSource>(&self, source: &mut S) -> FrameReport {
        let sensor_to_world = source.sensor_to_world().unwrap_or_default();
        let mut clusters = std::mem::take(source.clusters_mut());
        let scene = source.scene();

        debug!(points = scene.len(), clusters = clusters.len(), "process start");

        let posed_cluster = self.estimator.annotate_first(scene, &mut clusters, &sensor_to_world);

        let (matches, correlation_skipped) = match self.matcher.match_clusters(scene, &mut clusters) {
            Ok(matches) => (matches, false),
            Err(e @ Error::SizeMismatch { .. }) => {
                warn!(error = %e, "feature correlation skipped for this frame");
                (Vec::new(), true)
            }
            Err(e) => {
                warn!(error = %e, "feature matching failed for this frame");
                (Vec::new(), true)
            }
        };

        *source.clusters_mut() = clusters;

        FrameReport {
            posed_cluster,
            matches,
            correlation_skipped,
        }
    }
}
