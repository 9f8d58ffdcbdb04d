//! Analytic celestial body
//!
//! A sphere moving linearly and spinning uniformly about a fixed axis.
//! It implements both [`FocusProvider`] and [`ClosestBodyProvider`], so the same
//! object can be focused, orbited and landed on.

use std::sync::RwLock;

use glam::DVec3;

use super::{ClosestBodyProvider, FocusId, FocusProvider};

/// Mutable part of a body, advanced by the owning scene.
#[derive(Clone, Debug)]
struct BodyMotion {
    position: DVec3,
    velocity: DVec3,
    spin_angle_deg: f64,
    visible: bool,
    display_enabled: bool,
}

/// Spherical body with linear motion and uniform spin.
///
/// The scene owns bodies through `Arc` and hands the camera weak handles.
#[derive(Debug)]
pub struct CelestialBody {
    id: FocusId,
    name: String,
    radius: f64,
    /// Terrain displacement above the reference sphere
    height_scale: f64,
    /// Spin axis (unit length), if the body rotates
    spin_axis: Option<DVec3>,
    /// Spin rate in degrees per second of simulation time
    spin_rate_deg: f64,
    /// Point-like bodies (stars) are never pushed out of
    point_like: bool,
    gravity: bool,
    motion: RwLock<BodyMotion>,
}

impl CelestialBody {
    /// Create a static, non-spinning, visible body.
    pub fn new(id: u64, name: impl Into<String>, position: DVec3, radius: f64) -> Self {
        Self {
            id: FocusId(id),
            name: name.into(),
            radius,
            height_scale: 0.0,
            spin_axis: None,
            spin_rate_deg: 0.0,
            point_like: false,
            gravity: true,
            motion: RwLock::new(BodyMotion {
                position,
                velocity: DVec3::ZERO,
                spin_angle_deg: 0.0,
                visible: true,
                display_enabled: true,
            }),
        }
    }

    /// Set the linear velocity in internal units per simulation second.
    pub fn with_velocity(self, velocity: DVec3) -> Self {
        self.write().velocity = velocity;
        self
    }

    /// Make the body spin about `axis` at `rate_deg` degrees per simulation second.
    pub fn with_spin(mut self, axis: DVec3, rate_deg: f64) -> Self {
        self.spin_axis = axis.try_normalize();
        self.spin_rate_deg = rate_deg;
        self
    }

    /// Set the terrain height scale.
    pub fn with_height_scale(mut self, height_scale: f64) -> Self {
        self.height_scale = height_scale.max(0.0);
        self
    }

    /// Mark the body as point-like (no proximity correction, no gravity).
    pub fn point_like(mut self) -> Self {
        self.point_like = true;
        self.gravity = false;
        self
    }

    /// Advance position and spin by `sim_delta` seconds.
    pub fn advance(&self, sim_delta: f64) {
        let spin_rate = self.spin_rate_deg;
        let mut motion = self.write();
        let velocity = motion.velocity;
        motion.position += velocity * sim_delta;
        motion.spin_angle_deg = (motion.spin_angle_deg + spin_rate * sim_delta) % 360.0;
    }

    /// Teleport the body.
    pub fn set_position(&self, position: DVec3) {
        self.write().position = position;
    }

    /// Toggle the visibility-limit predicate.
    pub fn set_visible(&self, visible: bool) {
        self.write().visible = visible;
    }

    /// Toggle whether the body's component type is displayed.
    pub fn set_display_enabled(&self, enabled: bool) {
        self.write().display_enabled = enabled;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BodyMotion> {
        self.motion.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BodyMotion> {
        self.motion.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FocusProvider for CelestialBody {
    fn id(&self) -> FocusId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn absolute_position(&self) -> DVec3 {
        self.read().position
    }

    fn predicted_position(&self, sim_delta: f64) -> DVec3 {
        let motion = self.read();
        motion.position + motion.velocity * sim_delta
    }

    fn radius(&self) -> f64 {
        self.radius
    }

    fn is_within_visibility_limits(&self) -> bool {
        self.read().visible
    }

    fn is_display_enabled(&self) -> bool {
        self.read().display_enabled
    }

    fn spin_angle_deg(&self) -> Option<f64> {
        self.spin_axis.map(|_| self.read().spin_angle_deg)
    }

    fn spin_axis(&self) -> Option<DVec3> {
        self.spin_axis
    }

    fn allows_proximity_correction(&self) -> bool {
        !self.point_like
    }
}

impl ClosestBodyProvider for CelestialBody {
    fn absolute_position(&self) -> DVec3 {
        self.read().position
    }

    fn predicted_position(&self, sim_delta: f64) -> DVec3 {
        FocusProvider::predicted_position(self, sim_delta)
    }

    fn radius(&self) -> f64 {
        self.radius
    }

    fn probe_height(&self, _camera_position: DVec3, _body_position: DVec3) -> f64 {
        self.radius
    }

    fn height_scale(&self) -> f64 {
        self.height_scale
    }

    fn exerts_gravity(&self) -> bool {
        self.gravity
    }
}
