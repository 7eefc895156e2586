//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Terrain engine command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "tellus", about = "Planet-scale terrain LOD engine")]
pub struct CliArgs {
    /// Planet radius in meters.
    #[arg(long)]
    pub radius: Option<f64>,

    /// Maximum quadtree depth.
    #[arg(long)]
    pub max_depth: Option<u8>,

    /// Split-box inflation factor (must exceed 1.0).
    #[arg(long)]
    pub split_factor: Option<f64>,

    /// Starting camera altitude in meters.
    #[arg(long)]
    pub altitude: Option<f64>,

    /// Frames to run before exiting (0 = run until interrupted).
    #[arg(long)]
    pub frames: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(r) = args.radius {
            self.planet.radius_m = r;
        }
        if let Some(d) = args.max_depth {
            self.planet.max_depth = d;
        }
        if let Some(f) = args.split_factor {
            self.planet.split_factor = f;
        }
        if let Some(alt) = args.altitude {
            self.camera.start_altitude_m = alt;
        }
        if let Some(frames) = args.frames {
            self.frame_loop.max_frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
