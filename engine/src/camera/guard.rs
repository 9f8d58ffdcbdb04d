//! Collision & Stability Guard
//!
//! Post-integration corrections: keep the camera above terrain and out of
//! the focus, inside the universe bounds, and never at a non-finite position.

use glam::DVec3;
use log::warn;

use super::state::CameraState;
use crate::math::normalize_or;

/// Push `position` out of a body whose surface (plus clearance) lies at
/// `elevation` from `center`. Returns the corrected position if it moved.
pub fn terrain_clamp(position: DVec3, center: DVec3, elevation: f64) -> Option<DVec3> {
    let offset = position - center;
    let distance = offset.length();
    if !(distance < elevation) {
        return None;
    }
    let outward = normalize_or(offset, DVec3::Y);
    Some(position + outward * (elevation - distance))
}

/// Terrain elevation below the camera: probed height plus a fraction of the height scale.
#[inline]
pub fn terrain_elevation(probe_height: f64, height_scale: f64, clearance_divisor: f64) -> f64 {
    probe_height + height_scale / clearance_divisor
}

/// Clamp `position` to at most `max_distance` from the origin.
#[inline]
pub fn clamp_max_distance(position: DVec3, max_distance: f64) -> DVec3 {
    if position.length() >= max_distance {
        position.clamp_length_max(max_distance)
    } else {
        position
    }
}

/// Move a camera found inside a focus back onto its surface.
///
/// `fallback` is the outward direction when the camera sits exactly at the
/// focus center.
pub fn push_out_of_focus(position: DVec3, focus: DVec3, radius: f64, fallback: DVec3) -> Option<DVec3> {
    let offset = position - focus;
    if !(offset.length() < radius) {
        return None;
    }
    Some(focus + normalize_or(offset, fallback) * radius)
}

/// Restore the last good position after a non-finite result, or refresh the backup.
///
/// Returns true if the position was restored.
pub fn recover_non_finite(state: &mut CameraState) -> bool {
    if state.position.is_finite() {
        state.position_backup = state.position;
        return false;
    }
    warn!(
        "rejecting non-finite camera position {:?}, restoring {:?}",
        state.position, state.position_backup
    );
    state.position = state.position_backup;
    if !state.velocity.is_finite() {
        state.velocity = DVec3::ZERO;
        state.last_velocity = DVec3::ZERO;
    }
    if !state.force.is_finite() || !state.acceleration.is_finite() {
        state.force = DVec3::ZERO;
        state.acceleration = DVec3::ZERO;
    }
    true
}

/// Replace a non-finite orientation with the canonical one.
pub fn recover_orientation(state: &mut CameraState) {
    if !state.direction.is_finite() {
        state.direction = DVec3::NEG_Z;
    }
    if !state.up.is_finite() {
        state.up = DVec3::Y;
    }
    state.orthonormalize();
}
