//! # percepta
//!
//! Cluster-level perception for segmented point clouds.
//!
//! This is the umbrella crate that provides convenient access to all percepta
//! functionality together with YAML configuration loading. Use the individual
//! crates for more granular control over dependencies.
//!
//! ## Crates
//!
//! - **Core**: data model (scene points, point clouds, clusters and their
//!   annotations, rigid transforms and poses, errors)
//! - **Algorithms**: axis pose estimation, before/after change detection,
//!   feature matching and per-frame processing
//!
//! ## Quick Start
//!
//! ```rust
//! use percepta::prelude::*;
//!
//! let before = PointCloud::from_points(vec![ScenePoint::new(0.0, 0.0, 0.0)]);
//! let after = PointCloud::from_points(vec![
//!     ScenePoint::new(0.0, 0.0, 0.0),
//!     ScenePoint::new(1.0, 1.0, 1.0),
//! ]);
//!
//! let config = PerceptionConfig::default();
//! let changes = detect_changes(&before, &after, config.change_detection.resolution).unwrap();
//! assert_eq!(changes.indices, vec![1]);
//! ```

pub mod config;

// Re-export core functionality
pub use percepta_core::*;

pub use percepta_algorithms as algorithms;

pub use config::{PerceptionConfig, VisualizationConfig};

/// Convenient imports for common use cases
pub mod prelude {
    pub use percepta_core::*;
    pub use percepta_algorithms::*;
    pub use crate::config::{PerceptionConfig, VisualizationConfig};
}
