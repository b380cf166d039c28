//! Before/after change detection on a synthetic tabletop
//!
//! Captures an empty table, places a box on it and captures again. The
//! novel voxels become a change cluster; the depth difference of the two
//! rendered depth maps is reported alongside.
//!
//! ```bash
//! cargo run --bin change_detection -- --resolution 0.02
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use percepta::prelude::*;
use rand::prelude::*;
use tracing::info;

const DEPTH_WIDTH: usize = 64;
const DEPTH_HEIGHT: usize = 48;

#[derive(Parser)]
#[command(name = "change-detection")]
#[command(about = "Detect an object placed between two captures")]
struct Args {
    /// YAML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the voxel resolution
    #[arg(long)]
    resolution: Option<f64>,

    /// Number of table points
    #[arg(long, default_value = "20000")]
    points: usize,

    /// Random seed
    #[arg(long, default_value = "7")]
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
    if let Some(resolution) = args.resolution {
        config.change_detection.resolution = resolution;
        config.validate()?;
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let table: ScenePointCloud = (0..args.points)
        .map(|_| ScenePoint::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.3..0.3), 1.0))
        .collect();

    let mut recorder = config.scene_recorder()?;

    let mut before = Frame::new(table.clone(), Vec::new());
    let before_depth = render_depth(&before.scene)?;
    recorder.capture_into(CaptureTrigger::BeforeAction, &mut before, Some(before_depth))?;
    info!(phase = ?recorder.phase(), "before captured");

    let mut scene = table;
    let box_points = (0..2_000).map(|_| {
        ScenePoint::new(rng.gen_range(0.1..0.2), rng.gen_range(-0.05..0.05), rng.gen_range(0.85..0.95))
            .with_color(Rgb::new(30, 90, 200))
    });
    scene.extend(box_points);

    let mut after = Frame::new(scene, Vec::new());
    let depth = render_depth(&after.scene)?;
    let report = recorder
        .capture_into(CaptureTrigger::AfterAction, &mut after, Some(depth))?
        .context("second capture should complete the cycle")?;

    println!(
        "{} novel points at resolution {}",
        report.change_set.len(),
        report.change_set.resolution
    );
    for cluster in &after.clusters {
        let points = cluster.extract(&after.scene)?;
        let centroid = points.positions().iter().fold(Vector3d::zeros(), |acc, p| acc + p.coords) / points.len() as f64;
        println!(
            "cluster from {} with {} points around ({:.3}, {:.3}, {:.3})",
            cluster.source,
            cluster.len(),
            centroid.x,
            centroid.y,
            centroid.z
        );
    }
    if let Some(diff) = &report.depth_diff {
        println!(
            "depth difference: min {} max {}, {} pixels above {}",
            diff.min, diff.max, diff.large_changes, diff.threshold
        );
    }

    Ok(())
}

/// Nearest depth per pixel in millimeters under a pinhole projection
fn render_depth(cloud: &ScenePointCloud) -> anyhow::Result<DepthMap> {
    let focal = 40.0;
    let mut data = vec![0u16; DEPTH_WIDTH * DEPTH_HEIGHT];

    for point in cloud.iter() {
        let p = point.position;
        if p.z <= 0.0 {
            continue;
        }
        let u = (p.x / p.z * focal + DEPTH_WIDTH as f64 / 2.0).floor();
        let v = (p.y / p.z * focal + DEPTH_HEIGHT as f64 / 2.0).floor();
        if u < 0.0 || v < 0.0 || u >= DEPTH_WIDTH as f64 || v >= DEPTH_HEIGHT as f64 {
            continue;
        }
        let slot = &mut data[v as usize * DEPTH_WIDTH + u as usize];
        let millimeters = (p.z * 1000.0).round() as u16;
        if *slot == 0 || millimeters < *slot {
            *slot = millimeters;
        }
    }

    Ok(DepthMap::new(DEPTH_WIDTH, DEPTH_HEIGHT, data)?)
}
