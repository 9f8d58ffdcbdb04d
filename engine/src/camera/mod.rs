//! Camera Module
//!
//! Planetarium navigation camera: free flight, focus orbit, game-style
//! gravity flight and scripted paths. This module is window-system agnostic;
//! it turns input commands into a double-precision pose and leaves
//! projection and rendering to the caller.

pub mod commands;
pub mod config;
pub mod controller;
pub mod events;
pub mod guard;
pub mod integrator;
pub mod mode;
pub mod orientation;
pub mod snapshot;
pub mod state;

pub use commands::{CameraCommand, CommandQueue, CommandSender};
pub use config::{ConfigError, DistanceCurve, FocusLockConfig, HomePose, NavigationConfig};
pub use controller::NavigationCamera;
pub use events::{CameraEvent, EventSink, FocusInfo, NullSink};
pub use mode::CameraMode;
pub use snapshot::CameraFrame;
pub use state::{AngularAxis, AngularState, CameraState, DeviceInput, RotationAxis, VrBeam};
