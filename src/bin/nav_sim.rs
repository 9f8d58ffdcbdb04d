//! Headless Navigation Simulator
//!
//! Run with: `cargo run --bin nav-sim -- --mode focus --frames 600`
//!
//! Builds a small scene (a spinning planet and its moon), drives the
//! navigation camera from a scripted input thread, and logs the trajectory
//! and camera events. Set `RUST_LOG=debug` (or `trace`) for per-frame detail.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use clap::Parser;
use glam::DVec3;
use log::info;

use skynav_engine::camera::{CameraCommand, CameraEvent, CameraMode, CommandSender, NavigationCamera, NavigationConfig};
use skynav_engine::scene::units::KM_TO_U;
use skynav_engine::scene::{CelestialBody, SimulationClock, body_handle, focus_handle};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Frames between trajectory log lines
const LOG_INTERVAL: u64 = 60;

#[derive(Parser, Debug, Clone)]
#[command(name = "nav-sim")]
#[command(about = "Headless planetarium camera navigation simulator", long_about = None)]
struct Cli {
    /// Navigation config (JSON). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Frame time in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Initial camera mode: free, focus or game
    #[arg(long, default_value = "focus")]
    mode: CameraMode,

    /// Simulation seconds per real second
    #[arg(long, default_value_t = 3600.0)]
    warp: f64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NavigationConfig::load(path)?,
        None => NavigationConfig::default(),
    };
    if !(cli.dt.is_finite() && cli.dt > 0.0) {
        return Err(format!("--dt must be positive, got {}", cli.dt).into());
    }

    // Scene
    let planet = Arc::new(
        CelestialBody::new(1, "Planet", DVec3::new(0.0, 0.0, -50_000.0 * KM_TO_U), 6_371.0 * KM_TO_U)
            .with_spin(DVec3::Y, 360.0 / 86_400.0)
            .with_height_scale(20.0 * KM_TO_U),
    );
    let moon = Arc::new(
        CelestialBody::new(2, "Moon", DVec3::new(384_400.0 * KM_TO_U, 0.0, -50_000.0 * KM_TO_U), 1_737.0 * KM_TO_U)
            .with_velocity(DVec3::new(0.0, 0.0, 1.022 * KM_TO_U)),
    );

    let (event_tx, event_rx) = mpsc::channel();
    let mut camera = NavigationCamera::new(config).with_event_sink(event_tx);
    camera.set_closest_body(Some(body_handle(&planet)));
    let mut clock = SimulationClock::with_warp(cli.warp);

    // Scripted input listener on its own thread
    let sender = camera.command_sender();
    sender.send(CameraCommand::SetFocus(focus_handle(&planet)));
    sender.send(CameraCommand::SetMode {
        mode: cli.mode,
        center_focus: true,
    });
    let (tick_tx, tick_rx) = mpsc::channel::<u64>();
    let moon_handle = focus_handle(&moon);
    let script = thread::Builder::new()
        .name("nav-input".to_string())
        .spawn(move || {
            for frame in tick_rx {
                script_input(&sender, frame, &moon_handle);
            }
        })?;

    info!(
        "simulating {} frames at dt={:.4}s, mode {}, warp {}",
        cli.frames, cli.dt, cli.mode, cli.warp
    );

    for frame in 0..cli.frames {
        let sim_delta = clock.advance(cli.dt);
        camera.update(cli.dt, &clock);
        planet.advance(sim_delta);
        moon.advance(sim_delta);

        for event in event_rx.try_iter() {
            log_event(frame, &event);
        }
        if frame % LOG_INTERVAL == 0 {
            let pos = camera.position();
            info!(
                "frame {frame:5} [{}] pos=({:.6e}, {:.6e}, {:.6e}) speed={:.3e} tu={:.3e}",
                camera.mode(),
                pos.x,
                pos.y,
                pos.z,
                camera.velocity().length(),
                camera.translate_units()
            );
        }
        // Input thread gone means the script finished early
        if tick_tx.send(frame).is_err() {
            break;
        }
    }

    drop(tick_tx);
    if script.join().is_err() {
        return Err("input thread panicked".into());
    }

    let frame = camera.frame();
    info!(
        "final pose: pos={:?} dir={:?} up={:?} ({} byte GPU snapshot)",
        camera.position(),
        camera.direction(),
        camera.up(),
        frame.as_bytes().len()
    );
    Ok(())
}

/// Input script, keyed on the frame number.
fn script_input(sender: &CommandSender, frame: u64, moon: &skynav_engine::scene::FocusHandle) {
    let cmd = match frame {
        10 => CameraCommand::GoToFocus,
        30..=90 => CameraCommand::ForwardForce(0.5),
        120..=180 => CameraCommand::Rotate {
            dx: 2.0,
            dy: 0.0,
            look_held: false,
            acceleration: false,
        },
        200 => CameraCommand::SetTracking(Some(moon.clone())),
        260 => CameraCommand::SetTracking(None),
        300..=330 => CameraCommand::ForwardForce(-1.0),
        360 => CameraCommand::SetMode {
            mode: CameraMode::Free,
            center_focus: false,
        },
        380 => CameraCommand::LookAtSky {
            ra_deg: 90.0,
            dec_deg: 30.0,
        },
        450..=470 => CameraCommand::Roll {
            amount: 15.0,
            acceleration: false,
        },
        500 => CameraCommand::StopAll,
        540 => CameraCommand::Home,
        _ => return,
    };
    sender.send(cmd);
}

fn log_event(frame: u64, event: &CameraEvent) {
    match event {
        // Every focus frame reports one; only sample them
        CameraEvent::FocusInfoUpdated(focus) => {
            if frame % LOG_INTERVAL == 0 {
                info!(
                    "frame {frame:5} focus {} at {:.3e} above surface, {:.4}° wide, ra={:.2}° dec={:.2}°",
                    focus.name, focus.distance_to_surface, focus.view_angle_deg, focus.ra_deg, focus.dec_deg
                );
            }
        }
        other => info!("frame {frame:5} event {other:?}"),
    }
}
