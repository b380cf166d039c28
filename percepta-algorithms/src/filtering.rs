//! Filtering algorithms

use percepta_core::{Error, PointCloud, Result, VoxelAverage};
use std::collections::HashMap;

/// Integer cell coordinates in a regular grid of cubic voxels
pub type VoxelKey = (i64, i64, i64);

/// Cell containing `point` for the given edge length.
///
/// Cells are anchored at the origin, so the same point always lands in the
/// same cell regardless of which cloud it belongs to.
pub fn voxel_key(point: &percepta_core::Point3d, voxel_size: f64) -> VoxelKey {
    (
        (point.x / voxel_size).floor() as i64,
        (point.y / voxel_size).floor() as i64,
        (point.z / voxel_size).floor() as i64,
    )
}

/// Voxel grid downsampling
///
/// Groups points into cubic voxels of edge `voxel_size` and replaces the
/// points of every occupied voxel by their average (see [`VoxelAverage`]).
/// Output voxels appear in the order their first point appears in the
/// input. Points with non-finite coordinates are dropped.
///
/// # Arguments
/// * `cloud` - Input point cloud
/// * `voxel_size` - Edge length of each voxel cube
///
/// # Returns
/// * `Result<PointCloud<T>>` - Downsampled point cloud
///
/// # Example
/// ```rust
/// use percepta_core::{PointCloud, Point3d};
/// use percepta_algorithms::voxel_grid_filter;
///
/// fn main() -> percepta_core::Result<()> {
///     let cloud = PointCloud::from_points(vec![
///         Point3d::new(0.0, 0.0, 0.0),
///         Point3d::new(0.004, 0.0, 0.0),
///         Point3d::new(0.0, 0.5, 0.0),
///     ]);
///
///     let filtered = voxel_grid_filter(&cloud, 0.01)?;
///     assert_eq!(filtered.len(), 2);
///     Ok(())
/// }
/// ```
pub fn voxel_grid_filter<T: VoxelAverage>(cloud: &PointCloud<T>, voxel_size: f64) -> Result<PointCloud<T>> {
    if !(voxel_size > 0.0 && voxel_size.is_finite()) {
        return Err(Error::InvalidData(format!(
            "voxel_size must be positive and finite, got {voxel_size}"
        )));
    }

    if cloud.is_empty() {
        return Ok(PointCloud::new());
    }

    let mut slots: HashMap<VoxelKey, usize> = HashMap::new();
    let mut voxels: Vec<Vec<&T>> = Vec::new();

    for point in &cloud.points {
        let position = point.position();
        if !position.coords.iter().all(|c| c.is_finite()) {
            continue;
        }
        let slot = *slots.entry(voxel_key(&position, voxel_size)).or_insert_with(|| {
            voxels.push(Vec::new());
            voxels.len() - 1
        });
        voxels[slot].push(point);
    }

    Ok(voxels.iter().map(|members| T::average(members)).collect())
}
