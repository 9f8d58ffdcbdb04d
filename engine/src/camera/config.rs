//! Navigation Configuration
//!
//! Every tuning constant of the camera subsystem lives here, so that the
//! empirically tuned friction and response values can be adjusted without
//! touching the integrator. `Default` returns the shipped tuning.
//!
//! Configs are loaded from JSON. Missing fields take their default value and
//! out-of-range values are clamped (and logged) by [`NavigationConfig::validate`].

use std::fmt;
use std::path::Path;

use glam::DVec3;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::scene::units::{KPC_TO_U, M_TO_U, MPC_TO_U, PC_TO_U};

/// Allowed range for the speed, turn and rotate factors
pub const FACTOR_RANGE: (f64, f64) = (0.01, 100.0);
/// Hard upper bound for the field of view
pub const FOV_HARD_MAX: f64 = 179.0;
/// Field of view at which the FOV factor is 1
pub const FOV_REFERENCE: f64 = 40.0;

/// Focus lock behavior in focus mode
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusLockConfig {
    /// Camera rides along with the focus motion
    pub position: bool,
    /// Camera also co-rotates with the focus spin
    pub orientation: bool,
}

impl Default for FocusLockConfig {
    fn default() -> Self {
        Self {
            position: true,
            orientation: false,
        }
    }
}

/// Piecewise-linear response curve from clearance distance to translate units.
///
/// Three bands: `[0, dist_a]` maps to `[0, units_a]`, `[dist_a, dist_b]` to
/// `[units_a, units_b]` and `[dist_b, dist_c]` to `[units_b, units_c]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceCurve {
    pub dist_a: f64,
    pub dist_b: f64,
    pub dist_c: f64,
    pub units_a: f64,
    pub units_b: f64,
    pub units_c: f64,
}

impl Default for DistanceCurve {
    fn default() -> Self {
        Self {
            dist_a: 0.1 * PC_TO_U,
            dist_b: 5.0 * KPC_TO_U,
            dist_c: 5000.0 * MPC_TO_U,
            units_a: 1e6,
            units_b: 1e10,
            units_c: 2e16,
        }
    }
}

impl DistanceCurve {
    /// Evaluate the curve at `dist`.
    pub fn eval(&self, dist: f64) -> f64 {
        use crate::math::flint;
        if dist < self.dist_a {
            flint(dist, 0.0, self.dist_a, 0.0, self.units_a)
        } else if dist < self.dist_b {
            flint(dist, self.dist_a, self.dist_b, self.units_a, self.units_b)
        } else {
            flint(dist, self.dist_b, self.dist_c, self.units_b, self.units_c)
        }
    }
}

/// Camera pose restored by the home command
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomePose {
    pub position: DVec3,
    pub direction: DVec3,
    pub up: DVec3,
}

impl Default for HomePose {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            direction: DVec3::NEG_Z,
            up: DVec3::Y,
        }
    }
}

/// Central configuration for camera navigation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Global translation speed factor
    pub speed: f64,
    /// Free rotation (pitch/yaw/roll) factor
    pub turn_speed: f64,
    /// Orbit rotation factor
    pub rotate_speed: f64,
    /// Maximum speed in internal units per second (`None` = unlimited)
    pub speed_limit: Option<f64>,
    /// Cinematic mode keeps angular momentum and coasts longer
    pub cinematic: bool,
    /// Scale free-mode coasting by the translate units
    pub target_mode: bool,
    pub focus_lock: FocusLockConfig,

    /// Field of view in degrees and its allowed range
    pub fov_deg: f64,
    pub min_fov_deg: f64,
    pub max_fov_deg: f64,

    /// VR headset mode: disables steering and lowers the thrust multiplier
    pub vr: bool,

    /// Minimum distance to keep from a surface
    pub min_distance: f64,
    /// Floor of the translate units in free and focus mode
    pub min_translate_units: f64,
    /// Floor of the translate units in game mode
    pub game_min_translate_units: f64,
    /// The integrator ceiling is at least this many `min_distance`
    pub translate_floor_factor: f64,
    pub distance_curve: DistanceCurve,
    /// Position is clamped to this distance from the origin
    pub max_distance: f64,

    /// Friction counter amount while coasting
    pub friction: f64,
    /// Cap of the cinematic counter amount
    pub cinematic_friction_cap: f64,
    /// Seconds after the last thrust command before the camera is stopped
    pub response_time: f64,
    pub game_response_time: f64,
    pub cinematic_response_time: f64,

    /// Multiplier applied to forward force commands
    pub force_multiplier: f64,
    pub vr_force_multiplier: f64,
    /// Velocity cap of instantaneous nudges
    pub nudge_velocity_cap: f64,

    /// Game mode gravity
    pub gravity: bool,
    pub gravity_acceleration: f64,
    /// Gravity acts within this many radii of the closest body
    pub gravity_range_radii: f64,

    /// Steering converges below this angle
    pub facing_threshold_deg: f64,
    /// Turn rate toward the focus, per second
    pub focus_steer_rate: f64,
    pub cinematic_focus_steer_rate: f64,
    /// Orbit input is damped once the focus appears larger than this
    pub orbit_damping_angle_deg: f64,

    /// Terrain clearance is `height_scale / terrain_clearance_divisor`
    pub terrain_clearance_divisor: f64,
    /// Go-to-focus distance, in focus sizes
    pub approach_distance_sizes: f64,
    /// Push-out distance when entering focus mode inside the focus, in sizes
    pub proximity_pushout_sizes: f64,

    /// Planetarium dome tilt; steering targets are biased upward by this angle
    pub planetarium_angle_deg: Option<f64>,

    pub home: HomePose,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            turn_speed: 1.0,
            rotate_speed: 1.0,
            speed_limit: None,
            cinematic: false,
            target_mode: false,
            focus_lock: FocusLockConfig::default(),
            fov_deg: FOV_REFERENCE,
            min_fov_deg: 1.0,
            max_fov_deg: 150.0,
            vr: false,
            min_distance: M_TO_U,
            min_translate_units: 0.5e-8,
            game_min_translate_units: 1e-11,
            translate_floor_factor: 10.0,
            distance_curve: DistanceCurve::default(),
            max_distance: 50_000.0 * MPC_TO_U,
            friction: 2.0,
            cinematic_friction_cap: 200.0,
            response_time: 0.5,
            game_response_time: 0.25,
            cinematic_response_time: 250.0,
            force_multiplier: 100.0,
            vr_force_multiplier: 10.0,
            nudge_velocity_cap: 5e12,
            gravity: true,
            gravity_acceleration: 0.002,
            gravity_range_radii: 2.0,
            facing_threshold_deg: 0.5,
            focus_steer_rate: 10.0,
            cinematic_focus_steer_rate: 1.0,
            orbit_damping_angle_deg: 20.0,
            terrain_clearance_divisor: 10.0,
            approach_distance_sizes: 3.0,
            proximity_pushout_sizes: 6.0,
            planetarium_angle_deg: None,
            home: HomePose::default(),
        }
    }
}

impl NavigationConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: NavigationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file and validate it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamp out-of-range values.
    ///
    /// Only structurally impossible configs (non-finite values, inverted
    /// ranges) are rejected.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let finite = [
            ("speed", self.speed),
            ("turn_speed", self.turn_speed),
            ("rotate_speed", self.rotate_speed),
            ("fov_deg", self.fov_deg),
            ("min_fov_deg", self.min_fov_deg),
            ("max_fov_deg", self.max_fov_deg),
            ("facing_threshold_deg", self.facing_threshold_deg),
            ("terrain_clearance_divisor", self.terrain_clearance_divisor),
            ("min_distance", self.min_distance),
            ("max_distance", self.max_distance),
            ("friction", self.friction),
            ("gravity_acceleration", self.gravity_acceleration),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!("{name} must be finite")));
        }
        if self.min_fov_deg > self.max_fov_deg {
            return Err(ConfigError::Invalid(format!(
                "min_fov_deg ({}) exceeds max_fov_deg ({})",
                self.min_fov_deg, self.max_fov_deg
            )));
        }
        let c = &self.distance_curve;
        if !(0.0 < c.dist_a && c.dist_a < c.dist_b && c.dist_b < c.dist_c) {
            return Err(ConfigError::Invalid(
                "distance_curve breakpoints must be increasing and positive".to_string(),
            ));
        }

        self.speed = clamp_logged("speed", self.speed, FACTOR_RANGE.0, FACTOR_RANGE.1);
        self.turn_speed = clamp_logged("turn_speed", self.turn_speed, FACTOR_RANGE.0, FACTOR_RANGE.1);
        self.rotate_speed =
            clamp_logged("rotate_speed", self.rotate_speed, FACTOR_RANGE.0, FACTOR_RANGE.1);
        self.max_fov_deg = clamp_logged("max_fov_deg", self.max_fov_deg, 1.0, FOV_HARD_MAX);
        self.min_fov_deg = clamp_logged("min_fov_deg", self.min_fov_deg, 0.1, self.max_fov_deg);
        self.fov_deg = clamp_logged("fov_deg", self.fov_deg, self.min_fov_deg, self.max_fov_deg);
        self.facing_threshold_deg =
            clamp_logged("facing_threshold_deg", self.facing_threshold_deg, 1e-6, 45.0);
        self.terrain_clearance_divisor =
            clamp_logged("terrain_clearance_divisor", self.terrain_clearance_divisor, 1.0, 1e6);
        self.min_distance = self.min_distance.max(0.0);
        self.max_distance = self.max_distance.max(self.min_distance);
        if let Some(limit) = self.speed_limit {
            if !(limit.is_finite() && limit > 0.0) {
                warn!("speed_limit {limit} is not positive, disabling it");
                self.speed_limit = None;
            }
        }
        Ok(())
    }

    /// FOV relative to the reference 40°
    #[inline]
    pub fn fov_factor(&self) -> f64 {
        self.fov_deg / FOV_REFERENCE
    }

    /// Lower bound of the integrator's translate ceiling
    #[inline]
    pub fn translate_floor(&self) -> f64 {
        self.translate_floor_factor * self.min_distance
    }

    /// Seconds without thrust before friction stops the camera
    pub fn response_window(&self, game: bool) -> f64 {
        if self.cinematic {
            self.cinematic_response_time
        } else if game {
            self.game_response_time
        } else {
            self.response_time
        }
    }

    /// Focus-mode steering rate
    pub fn steer_rate(&self) -> f64 {
        if self.cinematic {
            self.cinematic_focus_steer_rate
        } else {
            self.focus_steer_rate
        }
    }

    /// Thrust multiplier for the current device
    pub fn thrust_multiplier(&self) -> f64 {
        if self.vr {
            self.vr_force_multiplier
        } else {
            self.force_multiplier
        }
    }
}

fn clamp_logged(name: &str, value: f64, min: f64, max: f64) -> f64 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!("{name} {value} out of range [{min}, {max}], clamped to {clamped}");
    }
    clamped
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// Errors that can occur while loading a navigation config.
#[derive(Debug)]
pub enum ConfigError {
    /// Standard I/O error.
    Io(std::io::Error),
    /// JSON deserialization error.
    Json(serde_json::Error),
    /// Structurally invalid value.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {e}"),
            ConfigError::Json(e) => write!(f, "JSON error: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}
