//! Startup configuration loaded from YAML.
//!
//! Every section falls back to its component defaults, so a file only needs
//! the values it changes:
//!
//! ```yaml
//! pose:
//!   min_hue: 200.0
//!   max_hue: 260.0
//!   leaf_size: 0.01
//! change_detection:
//!   resolution: 0.03
//! features:
//!   tolerance: 0.1
//!   reference:
//!     variances: [0.005, 0.0003, 0.00001]
//!     mean_color: { h: 30.0, s: 0.4, v: 0.6 }
//! visualization:
//!   vector_length: 0.1
//! ```

use percepta_algorithms::{
    AxisPoseConfig, AxisPoseEstimator, ChangeDetectionConfig, FeatureMatchConfig, FeatureMatcher, FrameProcessor,
    SceneRecorder,
};
use percepta_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Settings consumed only by the visualization collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    /// Display length of drawn axis vectors
    pub vector_length: f64,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self { vector_length: 0.1 }
    }
}

/// Full perception configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerceptionConfig {
    /// Pose estimation settings
    #[serde(default)]
    pub pose: AxisPoseConfig,

    /// Before/after change detection settings
    #[serde(default)]
    pub change_detection: ChangeDetectionConfig,

    /// Feature matching settings
    #[serde(default)]
    pub features: FeatureMatchConfig,

    #[serde(default)]
    pub visualization: VisualizationConfig,
}

impl PerceptionConfig {
    /// Load and validate configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&contents)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| Error::MalformedConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::MalformedConfiguration(e.to_string()))
    }

    /// Per-frame processor built from the pose and feature sections
    pub fn frame_processor(&self) -> FrameProcessor {
        FrameProcessor::new(
            AxisPoseEstimator::new(self.pose.clone()),
            FeatureMatcher::new(self.features.clone()),
        )
    }

    /// Before/after recorder built from the change detection section
    pub fn scene_recorder(&self) -> Result<SceneRecorder> {
        SceneRecorder::new(self.change_detection.clone())
    }

    /// Check value ranges the components rely on
    pub fn validate(&self) -> Result<()> {
        let pose = &self.pose;
        ensure_positive("pose.leaf_size", pose.leaf_size)?;
        if !(pose.min_hue < pose.max_hue) {
            return Err(malformed(format!(
                "pose.min_hue ({}) must be below pose.max_hue ({})",
                pose.min_hue, pose.max_hue
            )));
        }
        if pose.object.name.is_empty() {
            return Err(malformed("pose.object.name must not be empty".to_string()));
        }

        ensure_positive("change_detection.resolution", self.change_detection.resolution)?;

        let features = &self.features;
        if !(0.0..1.0).contains(&features.tolerance) {
            return Err(malformed(format!(
                "features.tolerance must be in [0, 1), got {}",
                features.tolerance
            )));
        }
        let reference = &features.reference;
        if let Some(v) = reference.variances.iter().find(|v| !non_negative(**v)) {
            return Err(malformed(format!(
                "features.reference.variances must be finite and non-negative, got {v}"
            )));
        }
        if let Some(c) = reference.mean_color.channels().iter().find(|c| !non_negative(**c)) {
            return Err(malformed(format!(
                "features.reference.mean_color must be finite and non-negative, got {c}"
            )));
        }

        ensure_positive("visualization.vector_length", self.visualization.vector_length)?;
        Ok(())
    }
}

fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(malformed(format!("{name} must be positive and finite, got {value}")))
    }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn malformed(message: String) -> Error {
    Error::MalformedConfiguration(message)
}
