//! Before/after snapshot capture cycle
//!
//! The recorder holds at most one pending "before" snapshot. The first
//! capture trigger stores it; the next one stores the "after" snapshot,
//! runs change detection and returns to the empty state. A trigger is
//! consumed by exactly one transition and always advances the cycle, even
//! when its kind does not match the phase. The recorder is a plain owned
//! value; hosts that share it between threads must serialize access (e.g.
//! behind a `Mutex`) so that only one cycle is in flight.

use crate::change_detection::{detect_changes, ChangeDetectionConfig, ChangeSet};
use crate::depth::{DepthDiff, DepthMap};
use percepta_core::{ClusterRef, ClusterSource, Error, Result, ScenePointCloud};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Externally delivered capture signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTrigger {
    BeforeAction,
    AfterAction,
}

/// A captured scene
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub cloud: ScenePointCloud,
    pub depth: Option<DepthMap>,
    pub timestamp: SystemTime,
}

impl Snapshot {
    /// Snapshot stamped with the current time
    pub fn new(cloud: ScenePointCloud, depth: Option<DepthMap>) -> Self {
        Self {
            cloud,
            depth,
            timestamp: SystemTime::now(),
        }
    }
}

/// Where the recorder is in the capture cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Empty,
    HaveBefore,
}

#[derive(Debug, Default)]
enum RecorderState {
    #[default]
    Empty,
    HaveBefore(Snapshot),
}

/// Result of a completed before/after cycle
#[derive(Debug, Clone)]
pub struct ChangeReport {
    pub change_set: ChangeSet,
    /// Present when both snapshots carried depth maps of equal size
    pub depth_diff: Option<DepthDiff>,
}

impl ChangeReport {
    /// The change as a new cluster, unless nothing changed
    pub fn cluster(&self) -> Option<ClusterRef> {
        self.change_set.clone().into_cluster()
    }
}

/// What a trigger did
#[derive(Debug, Clone)]
pub enum CaptureOutcome {
    BeforeStored,
    Completed(ChangeReport),
}

/// Owns the before/after snapshot pair and runs the capture cycle
#[derive(Debug)]
pub struct SceneRecorder {
    config: ChangeDetectionConfig,
    state: RecorderState,
    last_pair: Option<(Snapshot, Snapshot)>,
}

impl SceneRecorder {
    pub fn new(config: ChangeDetectionConfig) -> Result<Self> {
        if !(config.resolution > 0.0 && config.resolution.is_finite()) {
            return Err(Error::InvalidData(format!(
                "voxel resolution must be positive and finite, got {}",
                config.resolution
            )));
        }
        Ok(Self {
            config,
            state: RecorderState::Empty,
            last_pair: None,
        })
    }

    pub fn config(&self) -> &ChangeDetectionConfig {
        &self.config
    }

    pub fn phase(&self) -> CapturePhase {
        match self.state {
            RecorderState::Empty => CapturePhase::Empty,
            RecorderState::HaveBefore(_) => CapturePhase::HaveBefore,
        }
    }

    /// The most recent completed `(before, after)` pair
    pub fn last_pair(&self) -> Option<(&Snapshot, &Snapshot)> {
        self.last_pair.as_ref().map(|(before, after)| (before, after))
    }

    /// Consume a trigger with the scene current at that moment
    pub fn trigger(&mut self, trigger: CaptureTrigger, snapshot: Snapshot) -> Result<CaptureOutcome> {
        match std::mem::take(&mut self.state) {
            RecorderState::Empty => {
                if trigger != CaptureTrigger::BeforeAction {
                    warn!(?trigger, "trigger out of phase, storing snapshot as before");
                }
                debug!(points = snapshot.cloud.len(), "before snapshot stored");
                self.state = RecorderState::HaveBefore(snapshot);
                Ok(CaptureOutcome::BeforeStored)
            }
            RecorderState::HaveBefore(before) => {
                if trigger != CaptureTrigger::AfterAction {
                    warn!(?trigger, "trigger out of phase, storing snapshot as after");
                }
                let report = self.compare(&before, &snapshot)?;
                self.last_pair = Some((before, snapshot));
                Ok(CaptureOutcome::Completed(report))
            }
        }
    }

    /// Capture the scene of `source`; on a completed cycle with a non-empty
    /// change, append the change cluster to `source`.
    pub fn capture_into<S: ClusterSource>(
        &mut self,
        trigger: CaptureTrigger,
        source: &mut S,
        depth: Option<DepthMap>,
    ) -> Result<Option<ChangeReport>> {
        let snapshot = Snapshot::new(source.scene().clone(), depth);
        match self.trigger(trigger, snapshot)? {
            CaptureOutcome::BeforeStored => Ok(None),
            CaptureOutcome::Completed(report) => {
                if let Some(cluster) = report.cluster() {
                    source.append_cluster(cluster);
                }
                Ok(Some(report))
            }
        }
    }

    fn compare(&self, before: &Snapshot, after: &Snapshot) -> Result<ChangeReport> {
        let change_set = detect_changes(&before.cloud, &after.cloud, self.config.resolution)?;

        let depth_diff = match (&before.depth, &after.depth) {
            (Some(b), Some(a)) => match b.abs_diff(a, self.config.depth_threshold) {
                Ok(diff) => {
                    debug!(min = diff.min, max = diff.max, large = diff.large_changes, "depth difference");
                    Some(diff)
                }
                Err(e) => {
                    warn!(error = %e, "skipping depth difference");
                    None
                }
            },
            _ => None,
        };

        if change_set.is_empty() {
            info!("no change detected");
        } else {
            info!(points = change_set.len(), "change detected");
        }

        Ok(ChangeReport { change_set, depth_diff })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use percepta_core::{Frame, PointCloud, ScenePoint, CHANGE_DETECTION_SOURCE};

    fn cloud(points: &[(f64, f64, f64)]) -> ScenePointCloud {
        points.iter().map(|&(x, y, z)| ScenePoint::new(x, y, z)).collect()
    }

    #[test]
    fn test_cycle_returns_to_empty() {
        let mut recorder = SceneRecorder::new(ChangeDetectionConfig::default()).unwrap();
        assert_eq!(recorder.phase(), CapturePhase::Empty);

        let outcome = recorder
            .trigger(CaptureTrigger::BeforeAction, Snapshot::new(cloud(&[(0.0, 0.0, 0.0)]), None))
            .unwrap();
        assert!(matches!(outcome, CaptureOutcome::BeforeStored));
        assert_eq!(recorder.phase(), CapturePhase::HaveBefore);

        let outcome = recorder
            .trigger(
                CaptureTrigger::AfterAction,
                Snapshot::new(cloud(&[(0.0, 0.0, 0.0), (1.0, 1.0, 1.0)]), None),
            )
            .unwrap();
        let CaptureOutcome::Completed(report) = outcome else {
            panic!("expected a completed cycle");
        };
        assert_eq!(report.change_set.indices, vec![1]);
        assert!(report.depth_diff.is_none());
        assert_eq!(recorder.phase(), CapturePhase::Empty);

        let (before, after) = recorder.last_pair().unwrap();
        assert_eq!(before.cloud.len(), 1);
        assert_eq!(after.cloud.len(), 2);
    }

    #[test]
    fn test_out_of_phase_trigger_still_advances() {
        let mut recorder = SceneRecorder::new(ChangeDetectionConfig::default()).unwrap();

        let outcome = recorder
            .trigger(CaptureTrigger::AfterAction, Snapshot::new(cloud(&[(0.0, 0.0, 0.0)]), None))
            .unwrap();
        assert!(matches!(outcome, CaptureOutcome::BeforeStored));

        let outcome = recorder
            .trigger(CaptureTrigger::BeforeAction, Snapshot::new(cloud(&[(0.0, 0.0, 0.0)]), None))
            .unwrap();
        assert!(matches!(outcome, CaptureOutcome::Completed(ref r) if r.change_set.is_empty()));
        assert_eq!(recorder.phase(), CapturePhase::Empty);
    }

    #[test]
    fn test_depth_diff_attached() {
        let mut recorder = SceneRecorder::new(ChangeDetectionConfig::default()).unwrap();
        let scene = cloud(&[(0.0, 0.0, 0.0)]);

        recorder
            .trigger(CaptureTrigger::BeforeAction, Snapshot::new(scene.clone(), Some(DepthMap::filled(4, 3, 800))))
            .unwrap();
        let outcome = recorder
            .trigger(CaptureTrigger::AfterAction, Snapshot::new(scene, Some(DepthMap::filled(4, 3, 850))))
            .unwrap();

        let CaptureOutcome::Completed(report) = outcome else {
            panic!("expected a completed cycle");
        };
        let diff = report.depth_diff.unwrap();
        assert_eq!(diff.large_changes, 12);
        assert!(report.change_set.is_empty());
    }

    #[test]
    fn test_mismatched_depth_maps_are_skipped() {
        let mut recorder = SceneRecorder::new(ChangeDetectionConfig::default()).unwrap();
        let scene = cloud(&[(0.0, 0.0, 0.0)]);

        recorder
            .trigger(CaptureTrigger::BeforeAction, Snapshot::new(scene.clone(), Some(DepthMap::filled(4, 3, 0))))
            .unwrap();
        let outcome = recorder
            .trigger(CaptureTrigger::AfterAction, Snapshot::new(scene, Some(DepthMap::filled(3, 3, 0))))
            .unwrap();
        assert!(matches!(outcome, CaptureOutcome::Completed(ref r) if r.depth_diff.is_none()));
    }

    #[test]
    fn test_capture_into_appends_change_cluster() {
        let mut recorder = SceneRecorder::new(ChangeDetectionConfig::default()).unwrap();

        let mut frame = Frame::new(cloud(&[(0.0, 0.0, 0.0)]), Vec::new());
        assert!(recorder.capture_into(CaptureTrigger::BeforeAction, &mut frame, None).unwrap().is_none());
        assert!(frame.clusters.is_empty());

        let mut frame = Frame::new(cloud(&[(0.0, 0.0, 0.0), (0.5, 0.5, 0.5)]), Vec::new());
        let report = recorder
            .capture_into(CaptureTrigger::AfterAction, &mut frame, None)
            .unwrap()
            .unwrap();
        assert_eq!(report.change_set.len(), 1);
        assert_eq!(frame.clusters.len(), 1);
        assert!(frame.clusters[0].is_from(CHANGE_DETECTION_SOURCE));
        assert_eq!(frame.clusters[0].indices, vec![1]);
    }

    #[test]
    fn test_capture_into_without_change_adds_nothing() {
        let mut recorder = SceneRecorder::new(ChangeDetectionConfig::default()).unwrap();
        let mut frame = Frame::new(PointCloud::from_points(vec![ScenePoint::new(0.0, 0.0, 0.0)]), Vec::new());

        recorder.capture_into(CaptureTrigger::BeforeAction, &mut frame, None).unwrap();
        let report = recorder.capture_into(CaptureTrigger::AfterAction, &mut frame, None).unwrap();
        assert!(report.unwrap().change_set.is_empty());
        assert!(frame.clusters.is_empty());
    }

    #[test]
    fn test_invalid_resolution() {
        let config = ChangeDetectionConfig {
            resolution: 0.0,
            ..ChangeDetectionConfig::default()
        };
        assert!(SceneRecorder::new(config).is_err());
    }
}
