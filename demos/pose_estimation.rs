//! Pose estimation and feature matching on a synthetic tabletop scene
//!
//! Builds a scene with a noisy knife-like rod and a flat spatula-like patch,
//! hands both to the frame processor as hue clusters and prints the
//! resulting annotations.
//!
//! ```bash
//! cargo run --bin pose_estimation -- --config percepta.yaml --noise 0.002
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use nalgebra::UnitQuaternion;
use percepta::prelude::*;
use rand::prelude::*;
use tracing::info;

#[derive(Parser)]
#[command(name = "pose-estimation")]
#[command(about = "Estimate the pose of a synthetic elongated object")]
struct Args {
    /// YAML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Amplitude of the uniform positional noise
    #[arg(long, default_value = "0.001")]
    noise: f64,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => PerceptionConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => PerceptionConfig::default(),
    };

    let mut rng = StdRng::seed_from_u64(args.seed);
    let knife = rod(&mut rng, args.noise, 0.28, 0.02);
    let patch = rod(&mut rng, args.noise, 0.1, 0.08);

    // Without a configured reference, recognize the patch itself
    if args.config.is_none() {
        config.features.reference = compute_features(&patch)?;
    }

    let mut scene = ScenePointCloud::new();
    let knife_indices: Vec<usize> = (0..knife.len()).collect();
    scene.extend(knife);
    let patch_indices: Vec<usize> = (scene.len()..scene.len() + patch.len()).collect();
    scene.extend(patch.into_iter().map(|mut p| {
        p.position.y += 0.3;
        p
    }));

    let sensor_to_world = RigidTransform::from_translation_rotation(
        Vector3d::new(0.0, 0.0, 1.2),
        UnitQuaternion::from_euler_angles(std::f64::consts::PI, 0.0, 0.0),
    );
    let mut frame = Frame::new(
        scene,
        vec![
            ClusterRef::new(knife_indices, HUE_CLUSTERING_SOURCE).with_mean_hue(20.0),
            ClusterRef::new(patch_indices, HUE_CLUSTERING_SOURCE).with_mean_hue(20.0),
        ],
    )
    .with_sensor_to_world(sensor_to_world);

    let report = config.frame_processor().process(&mut frame);
    info!(posed = ?report.posed_cluster, skipped = report.correlation_skipped, "frame processed");

    for (index, cluster) in frame.clusters.iter().enumerate() {
        println!("cluster {index} ({} points)", cluster.len());
        if let (Some(object), Some(pose)) = (cluster.object(), cluster.pose()) {
            let origin = pose.world.origin();
            println!("  {} (type {})", object.name, object.type_id);
            println!("  world origin: ({:.3}, {:.3}, {:.3})", origin.x, origin.y, origin.z);
            for (name, axis) in ["x", "y", "z"].iter().zip(pose.world.axes()) {
                let tip = origin + axis * config.visualization.vector_length;
                println!("  {name} axis: ({:.3}, {:.3}, {:.3})", tip.x, tip.y, tip.z);
            }
        }
        if let Some(found) = cluster.feature_match() {
            println!("  matches {} at {:?}", found.label, found.centroid);
        }
    }

    for decision in &report.matches {
        println!("features of cluster {}:\n{}", decision.cluster, decision.features);
    }

    Ok(())
}

/// A flat colored bar of `length` by `width` at 0.9 in front of the sensor
fn rod(rng: &mut StdRng, noise: f64, length: f64, width: f64) -> ScenePointCloud {
    let steps_x = (length / 0.004) as usize;
    let steps_y = (width / 0.004) as usize;
    let jitter = move |rng: &mut StdRng| rng.gen_range(-1.0..=1.0) * noise;

    (0..steps_x)
        .flat_map(|i| (0..steps_y).map(move |j| (i, j)))
        .map(|(i, j)| {
            ScenePoint::new(
                0.1 + i as f64 * 0.004 + jitter(rng),
                0.05 + j as f64 * 0.004 + jitter(rng),
                0.9 + jitter(rng),
            )
            .with_normal(Vector3d::new(0.0, 0.0, -1.0))
            .with_color(Rgb::new(200, 110, 60))
        })
        .collect()
}
