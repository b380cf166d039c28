//! Core data structures and traits for percepta
//!
//! This crate provides the data model shared by the cluster analysis
//! algorithms: sensor points, point clouds, clusters and their annotations,
//! rigid transforms and poses, and the error type.

pub mod point;
pub mod color;
pub mod point_cloud;
pub mod cluster;
pub mod pose;
pub mod traits;
pub mod transform;
pub mod frame;
pub mod error;

pub use point::*;
pub use color::*;
pub use point_cloud::*;
pub use cluster::*;
pub use pose::*;
pub use traits::*;
pub use transform::*;
pub use frame::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix3, Isometry3, UnitQuaternion};
