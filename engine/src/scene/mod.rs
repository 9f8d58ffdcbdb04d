//! Scene Module
//!
//! Read-only views of the scene that the camera navigates: the focus object,
//! the closest massive body and the simulation clock. The camera never owns
//! these; it holds [`Weak`] handles and re-validates them every frame, so the
//! catalog may drop an object at any time.
//!
//! [`CelestialBody`] and [`SimulationClock`] are small analytic implementations
//! used by the `nav-sim` binary and by tests.

pub mod body;
pub mod clock;
pub mod units;

pub use body::CelestialBody;
pub use clock::SimulationClock;

use std::fmt;
use std::sync::{Arc, Weak};

use glam::DVec3;

/// Stable identifier of a focusable object in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FocusId(pub u64);

impl fmt::Display for FocusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An object the camera can focus on, orbit and track.
pub trait FocusProvider: Send + Sync {
    /// Catalog identifier
    fn id(&self) -> FocusId;

    /// Human-readable name, for logs
    fn name(&self) -> String {
        self.id().to_string()
    }

    /// Absolute position at the current simulation time
    fn absolute_position(&self) -> DVec3;

    /// Position after `sim_delta` seconds of simulation time
    fn predicted_position(&self, sim_delta: f64) -> DVec3;

    /// Bounding radius in internal units
    fn radius(&self) -> f64;

    /// Characteristic size (diameter)
    fn size(&self) -> f64 {
        2.0 * self.radius()
    }

    /// Apparent angular diameter in degrees as seen from `camera_position`.
    fn apparent_view_angle_deg(&self, camera_position: DVec3) -> f64 {
        let dist = (self.absolute_position() - camera_position).length();
        if dist <= self.radius() {
            return 180.0;
        }
        2.0 * (self.radius() / dist).atan().to_degrees()
    }

    /// False once the object is too faint or too far to be shown
    fn is_within_visibility_limits(&self) -> bool;

    /// False while the object's component type is hidden from display
    fn is_display_enabled(&self) -> bool {
        true
    }

    /// Current spin angle around [`FocusProvider::spin_axis`], in degrees
    fn spin_angle_deg(&self) -> Option<f64> {
        None
    }

    /// Spin axis in world space
    fn spin_axis(&self) -> Option<DVec3> {
        None
    }

    /// Distance from the focus center to its surface below `camera_position`.
    fn surface_height_at(&self, _camera_position: DVec3) -> f64 {
        self.radius()
    }

    /// Whether the camera should be pushed out when it ends up inside this object.
    ///
    /// Point-like objects (stars, particle groups) return false.
    fn allows_proximity_correction(&self) -> bool {
        true
    }
}

/// The closest massive body, used for gravity and terrain clamping.
pub trait ClosestBodyProvider: Send + Sync {
    /// Absolute position at the current simulation time
    fn absolute_position(&self) -> DVec3;

    /// Position after `sim_delta` seconds of simulation time
    fn predicted_position(&self, sim_delta: f64) -> DVec3;

    /// Bounding radius in internal units
    fn radius(&self) -> f64;

    /// Distance from `body_position` to the terrain surface under `camera_position`.
    fn probe_height(&self, camera_position: DVec3, body_position: DVec3) -> f64;

    /// Maximum terrain displacement above the reference sphere
    fn height_scale(&self) -> f64 {
        0.0
    }

    /// Whether game mode gravity pulls toward this body
    fn exerts_gravity(&self) -> bool {
        true
    }
}

/// Source of simulation time.
pub trait TimeProvider {
    /// Current simulation time in seconds
    fn sim_time(&self) -> f64;

    /// Simulation time advanced during the current frame (may be scaled or negative)
    fn sim_delta(&self) -> f64;

    /// True when object coordinates are not valid at the current time
    fn coordinate_time_overflow(&self) -> bool {
        false
    }
}

/// Non-owning handle to a focus object
pub type FocusHandle = Weak<dyn FocusProvider>;

/// Non-owning handle to a closest-body object
pub type BodyHandle = Weak<dyn ClosestBodyProvider>;

/// Create a [`FocusHandle`] from a catalog-owned object.
pub fn focus_handle<T: FocusProvider + 'static>(object: &Arc<T>) -> FocusHandle {
    let weak: Weak<T> = Arc::downgrade(object);
    weak
}

/// Create a [`BodyHandle`] from a catalog-owned object.
pub fn body_handle<T: ClosestBodyProvider + 'static>(object: &Arc<T>) -> BodyHandle {
    let weak: Weak<T> = Arc::downgrade(object);
    weak
}
