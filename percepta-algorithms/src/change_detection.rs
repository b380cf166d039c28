//! Spatial change detection between two scene snapshots
//!
//! Change is a set difference over voxel occupancy: a point of the later
//! cloud is novel when its voxel holds no point of the earlier cloud. Two
//! points in the same voxel are indistinguishable, so the precision of the
//! result is bounded by the voxel resolution.

use crate::filtering::{voxel_key, VoxelKey};
use percepta_core::{ClusterRef, Error, PointCloud, Positioned, Result, CHANGE_DETECTION_SOURCE};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Configuration for before/after change detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeDetectionConfig {
    /// Voxel edge length of the occupancy grid
    pub resolution: f64,
    /// Depth difference above which a pixel counts as a large change
    pub depth_threshold: u16,
}

impl Default for ChangeDetectionConfig {
    fn default() -> Self {
        Self {
            resolution: 0.03,
            depth_threshold: 20,
        }
    }
}

/// Indices into the later cloud that occupy previously empty voxels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Ascending indices into the `after` cloud
    pub indices: Vec<usize>,
    pub resolution: f64,
}

impl ChangeSet {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// No change detected; a normal outcome
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The change as a new cluster over the `after` cloud, unless empty
    pub fn into_cluster(self) -> Option<ClusterRef> {
        if self.indices.is_empty() {
            None
        } else {
            Some(ClusterRef::new(self.indices, CHANGE_DETECTION_SOURCE))
        }
    }
}

/// Double-buffered voxel occupancy.
///
/// Points are added to the current buffer; [`switch_buffers`] turns the
/// current occupancy into the reference and starts an empty current buffer.
/// The reference is kept, never cleared, so later points can be tested
/// against it.
///
/// [`switch_buffers`]: VoxelChangeDetector::switch_buffers
#[derive(Debug, Clone)]
pub struct VoxelChangeDetector {
    resolution: f64,
    previous: HashSet<VoxelKey>,
    current: HashMap<VoxelKey, Vec<usize>>,
}

impl VoxelChangeDetector {
    pub fn new(resolution: f64) -> Result<Self> {
        if !(resolution > 0.0 && resolution.is_finite()) {
            return Err(Error::InvalidData(format!(
                "voxel resolution must be positive and finite, got {resolution}"
            )));
        }
        Ok(Self {
            resolution,
            previous: HashSet::new(),
            current: HashMap::new(),
        })
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Add every finite point of `cloud` to the current buffer, recording
    /// its index in `cloud`
    pub fn add_points<T: Positioned + Sync>(&mut self, cloud: &PointCloud<T>) {
        let resolution = self.resolution;
        let keys: Vec<Option<VoxelKey>> = cloud
            .points
            .par_iter()
            .map(|point| {
                let position = point.position();
                position
                    .coords
                    .iter()
                    .all(|c| c.is_finite())
                    .then(|| voxel_key(&position, resolution))
            })
            .collect();

        for (index, key) in keys.into_iter().enumerate() {
            if let Some(key) = key {
                self.current.entry(key).or_default().push(index);
            }
        }
    }

    /// Make the current occupancy the reference and start a new buffer
    pub fn switch_buffers(&mut self) {
        self.previous = self.current.drain().map(|(key, _)| key).collect();
    }

    /// Number of voxels occupied in the reference buffer
    pub fn reference_voxels(&self) -> usize {
        self.previous.len()
    }

    /// Indices of current points whose voxel is absent from the reference,
    /// in ascending order
    pub fn new_voxel_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .current
            .iter()
            .filter(|(key, _)| !self.previous.contains(*key))
            .flat_map(|(_, members)| members.iter().copied())
            .collect();
        indices.sort_unstable();
        indices
    }
}

/// Detect points of `after` that lie in voxels not occupied by `before`.
///
/// # Arguments
/// * `before` - Earlier scene cloud
/// * `after` - Later scene cloud; result indices refer to it
/// * `resolution` - Voxel edge length
///
/// # Example
/// ```rust
/// use percepta_core::{PointCloud, Point3d};
/// use percepta_algorithms::detect_changes;
///
/// fn main() -> percepta_core::Result<()> {
///     let before = PointCloud::from_points(vec![Point3d::new(0.0, 0.0, 0.0)]);
///     let after = PointCloud::from_points(vec![
///         Point3d::new(0.0, 0.0, 0.0),
///         Point3d::new(1.0, 1.0, 1.0),
///     ]);
///
///     let changes = detect_changes(&before, &after, 0.03)?;
///     assert_eq!(changes.indices, vec![1]);
///     Ok(())
/// }
/// ```
pub fn detect_changes<T: Positioned + Sync>(
    before: &PointCloud<T>,
    after: &PointCloud<T>,
    resolution: f64,
) -> Result<ChangeSet> {
    let mut detector = VoxelChangeDetector::new(resolution)?;
    detector.add_points(before);
    detector.switch_buffers();
    detector.add_points(after);

    let indices = detector.new_voxel_indices();
    debug!(
        before = before.len(),
        after = after.len(),
        reference_voxels = detector.reference_voxels(),
        novel = indices.len(),
        "change detection"
    );

    Ok(ChangeSet { indices, resolution })
}
