//! Field Experiment CLI.
//!
//! Commands:
//! - run: Drive a field of fingers tracking orbiting points of interest
//! - layout: Print the generated mounts without running anything

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use nalgebra::Point3;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use field_experiment::experiment::{FieldRunner, RunConfig};
use field_experiment::layout::{Surface, grid_mounts};
use field_experiment::results::timestamped_path;
use field_experiment::scenario::{OrbitPath, OrbitScenario};
use finger_kernel::FieldConfig;

#[derive(Parser)]
#[command(name = "field-experiment")]
#[command(version)]
#[command(about = "Finger field runs over simulated points of interest")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a field
    Run {
        /// Number of frames to drive
        #[arg(long, default_value = "600")]
        frames: usize,

        /// Mount grid rows per surface
        #[arg(long, default_value = "4")]
        rows: usize,

        /// Mount grid columns per surface
        #[arg(long, default_value = "6")]
        cols: usize,

        /// Finger length, world units
        #[arg(long, default_value = "0.3")]
        finger_length: f64,

        /// Orbiting points of interest
        #[arg(long, default_value = "2")]
        orbits: usize,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Frame interval in milliseconds
        #[arg(long, default_value = "16")]
        interval_ms: u64,

        /// Pace frames against the wall clock instead of running flat out
        #[arg(long)]
        realtime: bool,

        /// Output file for the run summary
        #[arg(long, default_value = "summary.json")]
        output: PathBuf,
    },

    /// Print the generated mounts
    Layout {
        /// Mount grid rows per surface
        #[arg(long, default_value = "4")]
        rows: usize,

        /// Mount grid columns per surface
        #[arg(long, default_value = "6")]
        cols: usize,

        /// Finger length, world units
        #[arg(long, default_value = "0.3")]
        finger_length: f64,
    },
}

/// The reference room: a floor patch and one wall patch.
fn room_surfaces() -> Vec<Surface> {
    vec![
        Surface::floor(Point3::new(-2.0, 0.0, -2.0), 4.0, 4.0),
        Surface::wall_facing_x(Point3::new(-2.0, 0.0, -2.0), 4.0, 2.5),
    ]
}

/// Orbits threading the middle of the room, decorrelated by phase.
fn room_orbits(count: usize) -> Vec<OrbitPath> {
    (0..count)
        .map(|i| OrbitPath {
            center: Point3::new(0.0, 0.8 + 0.3 * i as f64, 0.0),
            radius: 1.2 + 0.4 * i as f64,
            angular_velocity: 0.6 + 0.25 * i as f64,
            phase: i as f64 * 2.1,
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Run {
            frames,
            rows,
            cols,
            finger_length,
            orbits,
            seed,
            interval_ms,
            realtime,
            output,
        } => {
            let field = FieldConfig {
                frame_interval_ms: interval_ms,
                ..FieldConfig::default()
            };

            let mounts: Vec<_> = room_surfaces()
                .iter()
                .flat_map(|surface| grid_mounts(surface, rows, cols, finger_length))
                .collect();

            let scenario = OrbitScenario::new(room_orbits(orbits.max(1)))?;

            let run = RunConfig {
                frames,
                seed,
                realtime,
            };

            let summary = FieldRunner::new(run, field, mounts, scenario).run().await?;

            let path = timestamped_path(&output);
            summary.save(&path)?;
            info!(path = %path.display(), "Summary written");
        }

        Commands::Layout {
            rows,
            cols,
            finger_length,
        } => {
            for (surface_index, surface) in room_surfaces().iter().enumerate() {
                for mount in grid_mounts(surface, rows, cols, finger_length) {
                    println!(
                        "surface {} base ({:.3}, {:.3}, {:.3}) tip ({:.3}, {:.3}, {:.3})",
                        surface_index,
                        mount.base.x,
                        mount.base.y,
                        mount.base.z,
                        mount.tip.x,
                        mount.tip.y,
                        mount.tip.z,
                    );
                }
            }
        }
    }

    Ok(())
}
