//! Sky Navigation Engine Library
//!
//! Camera navigation for a digital planetarium. Turns per-frame input into a
//! physically plausible camera trajectory across scales from metres above a
//! planet's surface to gigaparsecs, keeps the camera out of celestial bodies,
//! and keeps a locked focus stable while it moves and spins.
//!
//! # Modules
//!
//! - [`camera`] - Navigation camera, modes, integrator, commands and events
//! - [`scene`] - Focus and closest-body interfaces, units, analytic bodies, clock
//! - [`math`] - Double-precision vector helpers
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use glam::DVec3;
//! use skynav_engine::camera::{CameraCommand, CameraMode, NavigationCamera, NavigationConfig};
//! use skynav_engine::scene::{focus_handle, CelestialBody, SimulationClock};
//!
//! let planet = Arc::new(CelestialBody::new(1, "Planet", DVec3::new(0.0, 0.0, -100.0), 10.0));
//! let mut camera = NavigationCamera::new(NavigationConfig::default());
//! let mut clock = SimulationClock::new();
//!
//! // Input threads post commands; the simulation thread drains them in `update`
//! let sender = camera.command_sender();
//! sender.send(CameraCommand::SetFocus(focus_handle(&planet)));
//! sender.send(CameraCommand::SetMode { mode: CameraMode::Focus, center_focus: true });
//! sender.send(CameraCommand::GoToFocus);
//!
//! for _ in 0..60 {
//!     clock.advance(0.016);
//!     camera.update(0.016, &clock);
//! }
//! assert_eq!(camera.mode(), CameraMode::Focus);
//! ```

pub mod camera;
pub mod math;
pub mod scene;

pub use camera::{CameraCommand, CameraEvent, CameraMode, NavigationCamera, NavigationConfig};
pub use scene::{ClosestBodyProvider, FocusProvider, TimeProvider};
