//! Headless orbital-descent demo.
//!
//! Loads configuration, builds a two-hemisphere planet scene, then flies
//! the camera from orbit down toward the surface at a fixed descent rate,
//! logging how the terrain LOD responds frame by frame.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use glam::{DMat4, DVec3};
use tracing::info;

use tellus_app::{EngineContext, FrameLoop};
use tellus_config::{CliArgs, Config};
use tellus_log::init_logging;
use tellus_math::{Frustum, Geodetic};
use tellus_render::{BufferId, MaterialId, RecordingContext};
use tellus_scene::NodeKind;
use tellus_terrain::{TerrainParams, TerrainSurface};

/// The descent stops here; below this the demo just orbits in place.
const MIN_ALTITUDE_M: f64 = 500.0;

fn main() {
    let args = CliArgs::parse();
    let config_dir = args.config.clone().unwrap_or_else(|| PathBuf::from("."));

    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load config: {e}");
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);
    if let Err(e) = config.validate() {
        eprintln!("invalid config: {e}");
        std::process::exit(1);
    }

    if config.debug.log_json {
        init_logging(Some(Path::new("logs")), true, Some(&config));
    } else {
        init_logging(None, false, Some(&config));
    }

    run(&config);
}

fn run(config: &Config) {
    let params = TerrainParams::new(
        config.planet.radius_m,
        config.planet.split_factor,
        config.planet.max_depth,
    );
    let anchor = Geodetic::from_degrees(config.camera.start_lat_deg, config.camera.start_lon_deg);
    let mut altitude = config.camera.start_altitude_m;

    let mut ctx = EngineContext::new(anchor.to_cartesian(params.radius + altitude));
    ctx.scene.create_node(
        "planet",
        NodeKind::Terrain(TerrainSurface::hemispheres(
            params,
            BufferId(0),
            MaterialId(0),
        )),
    );

    let mut gfx = RecordingContext::new();
    let mut frame_loop = FrameLoop::new(config.frame_loop.tick_rate);
    let pacing = Duration::from_secs_f64(frame_loop.fixed_dt());
    let max_frames = config.frame_loop.max_frames;

    info!(
        radius_m = params.radius,
        max_depth = params.max_depth,
        start_altitude_m = altitude,
        max_frames,
        "orbital descent starting"
    );

    while max_frames == 0 || frame_loop.frame_count() < max_frames {
        frame_loop.tick(
            |dt, _sim_time| {
                altitude = (altitude - config.camera.descent_rate_m_s * dt).max(MIN_ALTITUDE_M);
                ctx.camera
                    .set_position(anchor.to_cartesian(params.radius + altitude));
                ctx.simulate(dt);
            },
            |_alpha| {},
        );

        gfx.clear();
        let eye = ctx.camera.position();
        ctx.render_frame(view_frustum(eye, params.radius), &mut gfx);

        if frame_loop.frame_count() % 60 == 0 {
            info!(
                frame = frame_loop.frame_count(),
                altitude_m = altitude,
                commands = gfx.submit_count(),
                "descending"
            );
        }

        std::thread::sleep(pacing);
    }

    info!(
        frames = frame_loop.frame_count(),
        sim_steps = frame_loop.update_count(),
        final_altitude_m = altitude,
        "orbital descent finished"
    );
}

/// Frustum looking from the eye straight at the planet center.
fn view_frustum(eye: DVec3, radius: f64) -> Frustum {
    // Pick an up vector that cannot be collinear with the view direction.
    let toward_center = (-eye).normalize_or_zero();
    let up = if toward_center.dot(DVec3::Z).abs() > 0.99 {
        DVec3::X
    } else {
        DVec3::Z
    };
    let view = DMat4::look_at_rh(eye, DVec3::ZERO, up);
    let proj = DMat4::perspective_rh(1.2, 16.0 / 9.0, 1.0, 100.0 * radius);
    Frustum::from_view_projection(&(proj * view))
}
