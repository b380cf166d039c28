//! Depth image differencing
//!
//! A coarse per-pixel indicator of change between two depth images. It is
//! diagnostic output only and does not feed the voxel change set.

use percepta_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// A row-major grid of raw depth samples
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthMap {
    width: usize,
    height: usize,
    data: Vec<u16>,
}

impl DepthMap {
    pub fn new(width: usize, height: usize, data: Vec<u16>) -> Result<Self> {
        if data.len() != width * height {
            return Err(Error::InvalidData(format!(
                "depth map of {width}x{height} needs {} samples, got {}",
                width * height,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    /// A map with every sample set to `value`
    pub fn filled(width: usize, height: usize, value: u16) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u16] {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u16> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// Per-pixel absolute difference against `other`.
    ///
    /// Pixels whose difference exceeds `threshold` are saturated to
    /// `u16::MAX` in the returned mask.
    pub fn abs_diff(&self, other: &DepthMap, threshold: u16) -> Result<DepthDiff> {
        if self.width != other.width || self.height != other.height {
            return Err(Error::InvalidData(format!(
                "depth maps differ in size: {}x{} vs {}x{}",
                self.width, self.height, other.width, other.height
            )));
        }

        let mut min = u16::MAX;
        let mut max = 0;
        let mut large_changes = 0;
        let mask = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| {
                let d = a.abs_diff(b);
                min = min.min(d);
                max = max.max(d);
                if d > threshold {
                    large_changes += 1;
                    u16::MAX
                } else {
                    d
                }
            })
            .collect();

        if self.data.is_empty() {
            min = 0;
        }

        Ok(DepthDiff {
            mask: DepthMap {
                width: self.width,
                height: self.height,
                data: mask,
            },
            min,
            max,
            large_changes,
            threshold,
        })
    }
}

/// Result of [`DepthMap::abs_diff`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthDiff {
    /// Absolute differences, saturated above the threshold
    pub mask: DepthMap,
    /// Smallest raw difference
    pub min: u16,
    /// Largest raw difference
    pub max: u16,
    /// Number of pixels above the threshold
    pub large_changes: usize,
    pub threshold: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abs_diff_thresholds() {
        let before = DepthMap::new(2, 2, vec![1000, 1000, 500, 0]).unwrap();
        let after = DepthMap::new(2, 2, vec![1010, 900, 500, 21]).unwrap();

        let diff = before.abs_diff(&after, 20).unwrap();
        assert_eq!(diff.mask.data(), &[10, u16::MAX, 0, u16::MAX]);
        assert_eq!(diff.min, 0);
        assert_eq!(diff.max, 100);
        assert_eq!(diff.large_changes, 2);
    }

    #[test]
    fn test_abs_diff_at_threshold_is_not_large() {
        let before = DepthMap::filled(3, 1, 100);
        let after = DepthMap::filled(3, 1, 120);
        let diff = before.abs_diff(&after, 20).unwrap();
        assert_eq!(diff.large_changes, 0);
        assert_eq!(diff.mask.get(2, 0), Some(20));
    }

    #[test]
    fn test_abs_diff_size_mismatch() {
        let a = DepthMap::filled(2, 2, 0);
        let b = DepthMap::filled(2, 3, 0);
        assert!(a.abs_diff(&b, 20).is_err());
    }

    #[test]
    fn test_new_checks_sample_count() {
        assert!(DepthMap::new(2, 2, vec![0; 3]).is_err());
        assert!(DepthMap::new(0, 0, Vec::new()).is_ok());
    }
}
