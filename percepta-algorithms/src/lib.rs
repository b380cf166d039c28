//! # percepta Algorithms
//!
//! Cluster-level analysis of segmented point clouds.
//!
//! This crate provides voxel downsampling, principal axis pose estimation,
//! before/after change detection over voxel occupancy, and feature-based
//! object matching. The [`pipeline`] module combines pose estimation and
//! matching into a single per-frame pass.

pub mod filtering;
pub mod diameter;
pub mod pose_estimation;
pub mod change_detection;
pub mod depth;
pub mod scene_recorder;
pub mod features;
pub mod pipeline;

// Re-export commonly used items
pub use filtering::*;
pub use diameter::*;
pub use pose_estimation::*;
pub use change_detection::*;
pub use depth::*;
pub use scene_recorder::*;
pub use features::*;
pub use pipeline::*;
