//! Shape and color feature descriptors
//!
//! A cluster is summarized by the principal axes of its point distribution,
//! the variance along each axis and its mean color. Two descriptors match
//! when every variance and every color channel of the candidate lies within
//! a relative tolerance band around the reference.

use percepta_core::{
    Annotation, ClusterRef, Error, Hsv, MatchAnnotation, Point3d, Result, ScenePoint, ScenePointCloud,
    Vector3d,
};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Shape and color summary of a cluster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureVector {
    /// Principal directions, by descending variance
    pub axes: [Vector3d; 3],
    /// Variance along each principal direction
    pub variances: [f64; 3],
    pub mean_color: Hsv,
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            axes: [Vector3d::x(), Vector3d::y(), Vector3d::z()],
            variances: [0.0; 3],
            mean_color: Hsv::default(),
        }
    }
}

impl fmt::Display for FeatureVector {
    /// Three lines: primary axis, variances, then h, s, v
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.axes[0];
        let v = self.variances;
        let c = self.mean_color;
        writeln!(f, "{:.6}, {:.6}, {:.6}", a.x, a.y, a.z)?;
        writeln!(f, "{:.6}, {:.6}, {:.6}", v[0], v[1], v[2])?;
        write!(f, "{:.6}, {:.6}, {:.6}", c.h, c.s, c.v)
    }
}

/// Compute the descriptor of a cluster.
///
/// Needs at least three points with finite positions. Points without
/// color do not contribute to the mean color; a cluster with no colored
/// point has black mean color.
pub fn compute_features(cluster: &ScenePointCloud) -> Result<FeatureVector> {
    let positions: Vec<Point3d> = cluster
        .iter()
        .filter(|p| p.is_finite())
        .map(|p| p.position)
        .collect();
    if positions.len() < 3 {
        return Err(Error::DegenerateGeometry(format!(
            "{} finite point(s), need at least 3 for principal axes",
            positions.len()
        )));
    }

    let (axes, variances) = principal_axes(&positions);
    let mean_color = mean_color(&cluster.points);

    Ok(FeatureVector { axes, variances, mean_color })
}

/// Eigen-decomposition of the population covariance, sorted by
/// descending eigenvalue. The third axis is rebuilt as the cross product
/// of the first two so the frame is right-handed.
fn principal_axes(points: &[Point3d]) -> ([Vector3d; 3], [f64; 3]) {
    let centroid = centroid(points);

    let mut covariance = Matrix3::zeros();
    for point in points {
        let diff = point - centroid;
        covariance += diff * diff.transpose();
    }
    covariance /= points.len() as f64;

    let eigen = covariance.symmetric_eigen();
    let mut pairs: Vec<(f64, Vector3d)> = eigen
        .eigenvalues
        .iter()
        .zip(eigen.eigenvectors.column_iter())
        .map(|(val, vec)| (val.max(0.0), vec.normalize()))
        .collect();
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

    let first = pairs[0].1;
    let second = pairs[1].1;
    let third = first.cross(&second);

    ([first, second, third], [pairs[0].0, pairs[1].0, pairs[2].0])
}

fn centroid(points: &[Point3d]) -> Point3d {
    let sum = points.iter().fold(Vector3d::zeros(), |acc, p| acc + p.coords);
    Point3d::from(sum / points.len() as f64)
}

fn mean_color(points: &[ScenePoint]) -> Hsv {
    let mut sum = Vector3d::zeros();
    let mut count = 0usize;
    for color in points.iter().filter_map(|p| p.color) {
        sum += Vector3d::new(color.r as f64, color.g as f64, color.b as f64);
        count += 1;
    }
    if count == 0 {
        return Hsv::default();
    }
    let mean = sum / count as f64;
    Hsv::from_rgb(mean.x, mean.y, mean.z)
}

/// Whether `candidate` matches `reference` within a relative `tolerance`.
///
/// Each candidate variance must lie in
/// `[reference * (1 - tolerance), reference * (1 + tolerance)]` and each of
/// h, s and v in `reference ± reference * tolerance`. Axis directions are
/// not compared.
pub fn is_match(reference: &FeatureVector, candidate: &FeatureVector, tolerance: f64) -> bool {
    let variances_match = reference
        .variances
        .iter()
        .zip(&candidate.variances)
        .all(|(&r, &c)| within_band(r, c, tolerance));

    let colors_match = reference
        .mean_color
        .channels()
        .iter()
        .zip(&candidate.mean_color.channels())
        .all(|(&r, &c)| within_band(r, c, tolerance));

    variances_match && colors_match
}

fn within_band(reference: f64, value: f64, tolerance: f64) -> bool {
    let lower = reference - reference * tolerance;
    let upper = reference + reference * tolerance;
    value >= lower && value <= upper
}

/// Configuration for [`FeatureMatcher`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureMatchConfig {
    /// Signature of the object to recognize
    pub reference: FeatureVector,
    /// Relative tolerance applied to every variance and color channel
    pub tolerance: f64,
    /// Label attached to matching clusters
    pub label: String,
}

impl Default for FeatureMatchConfig {
    fn default() -> Self {
        Self {
            reference: FeatureVector::default(),
            tolerance: 0.1,
            label: "Spatula".to_string(),
        }
    }
}

/// Outcome of comparing one cluster against the reference
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDecision {
    /// Index of the cluster in the frame's cluster list
    pub cluster: usize,
    pub centroid: Point3d,
    pub features: FeatureVector,
    pub matched: bool,
}

/// Per-frame feature computation and matching over all clusters
#[derive(Debug, Clone, Default)]
pub struct FeatureMatcher {
    config: FeatureMatchConfig,
}

impl FeatureMatcher {
    pub fn new(config: FeatureMatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureMatchConfig {
        &self.config
    }

    /// Compare a candidate against the configured reference
    pub fn matches(&self, candidate: &FeatureVector) -> bool {
        is_match(&self.config.reference, candidate, self.config.tolerance)
    }

    /// Compute features and centroids for every cluster and match them.
    ///
    /// A cluster whose points cannot be extracted or whose features cannot
    /// be computed is logged and skipped; the remaining clusters are still
    /// compared. Each feature vector is paired with the centroid of the same
    /// cluster, and `SizeMismatch` is returned if that pairing ever breaks.
    /// Matching clusters get a [`MatchAnnotation`].
    pub fn match_clusters(&self, scene: &ScenePointCloud, clusters: &mut [ClusterRef]) -> Result<Vec<MatchDecision>> {
        let mut features = Vec::with_capacity(clusters.len());
        let mut positions = Vec::with_capacity(clusters.len());

        for (index, cluster) in clusters.iter().enumerate() {
            let points = match cluster.extract(scene) {
                Ok(points) => points,
                Err(e) => {
                    warn!(index, error = %e, "skipping cluster");
                    continue;
                }
            };

            let computed = match compute_features(&points) {
                Ok(f) => f,
                Err(e) => {
                    warn!(index, error = %e, "no features for cluster");
                    continue;
                }
            };
            let finite: Vec<Point3d> = points.iter().filter(|p| p.is_finite()).map(|p| p.position).collect();
            features.push((index, computed));
            positions.push(centroid(&finite));
        }

        if features.len() != positions.len() {
            warn!(
                features = features.len(),
                positions = positions.len(),
                "feature and position counts differ, skipping correlation"
            );
            return Err(Error::SizeMismatch {
                features: features.len(),
                positions: positions.len(),
            });
        }

        let mut decisions = Vec::with_capacity(features.len());
        for ((index, features), centroid) in features.into_iter().zip(positions) {
            let matched = self.matches(&features);
            debug!(index, %features, matched, "feature comparison");
            if matched {
                info!(index, label = %self.config.label, "cluster matches reference");
                clusters[index].annotate(Annotation::Match(MatchAnnotation {
                    label: self.config.label.clone(),
                    centroid,
                }));
            }
            decisions.push(MatchDecision {
                cluster: index,
                centroid,
                features,
                matched,
            });
        }

        Ok(decisions)
    }
}
