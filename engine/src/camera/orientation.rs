//! Orientation Controller
//!
//! Advances `direction` and `up` from the angular state, revolves the camera
//! around the focus for orbit input, and turns the view toward targets.
//!
//! Angular deltas are in degrees. After every public operation the pose is
//! re-orthonormalized, so callers never see a skewed basis.

use glam::DVec3;

use super::state::{CameraState, RotationAxis};
use crate::math::{angle_between_deg, normalize_or, rotate_about_axis, rotate_around_point};

/// Rotate the view (direction and up) about `axis` in place.
///
/// Raw primitive: the basis is not re-orthonormalized here.
#[inline]
pub fn rotate_view(state: &mut CameraState, axis: DVec3, degrees: f64) {
    state.direction = rotate_about_axis(state.direction, axis, degrees);
    state.up = rotate_about_axis(state.up, axis, degrees);
}

/// Revolve the camera around an axis through `center`, rotating the view with it.
#[inline]
pub fn rotate_around(state: &mut CameraState, center: DVec3, axis: DVec3, degrees: f64) {
    state.position = rotate_around_point(state.position, center, axis, degrees);
    rotate_view(state, axis, degrees);
}

/// Integrate pitch and yaw and rotate the view.
///
/// `scale` multiplies the angular deltas. Acceleration is always cleared,
/// velocity too unless `keep_momentum`.
pub fn update_free_rotation(state: &mut CameraState, dt: f64, scale: f64, keep_momentum: bool) {
    if state.angular[RotationAxis::Pitch].advance(dt) {
        let axis = state.direction.cross(state.up);
        let delta = state.angular[RotationAxis::Pitch].delta;
        rotate_view(state, axis, delta * scale);
    }
    if state.angular[RotationAxis::Yaw].advance(dt) {
        let axis = state.up;
        let delta = state.angular[RotationAxis::Yaw].delta;
        rotate_view(state, axis, -delta * scale);
    }
    state.angular[RotationAxis::Pitch].settle(keep_momentum);
    state.angular[RotationAxis::Yaw].settle(keep_momentum);
    state.orthonormalize();
}

/// Integrate roll and rotate the view about the view direction.
pub fn update_roll(state: &mut CameraState, dt: f64, scale: f64, keep_momentum: bool) {
    if state.angular[RotationAxis::Roll].advance(dt) {
        let axis = state.direction;
        let delta = state.angular[RotationAxis::Roll].delta;
        rotate_view(state, axis, -delta * scale);
    }
    state.angular[RotationAxis::Roll].settle(keep_momentum);
    state.orthonormalize();
}

/// Integrate the orbit axes and revolve the camera around `center`.
pub fn update_orbit(state: &mut CameraState, dt: f64, center: DVec3, scale: f64, keep_momentum: bool) {
    if state.angular[RotationAxis::Vertical].advance(dt) {
        let axis = state.direction.cross(state.up);
        let delta = state.angular[RotationAxis::Vertical].delta;
        rotate_around(state, center, axis, delta * scale);
    }
    if state.angular[RotationAxis::Horizontal].advance(dt) {
        let axis = state.up;
        let delta = state.angular[RotationAxis::Horizontal].delta;
        rotate_around(state, center, axis, -delta * scale);
    }
    state.angular[RotationAxis::Vertical].settle(keep_momentum);
    state.angular[RotationAxis::Horizontal].settle(keep_momentum);
    state.orthonormalize();
}

/// Translate sideways and vertically with the orbit axes' velocities.
///
/// Free modes only: there is no focus to orbit, so horizontal and vertical
/// input pans the camera at `translate_units` per unit of velocity.
pub fn update_lateral(
    state: &mut CameraState,
    dt: f64,
    translate_units: f64,
    speed_limit: Option<f64>,
) {
    if !(dt > 0.0) {
        return;
    }
    let horizontal = state.angular[RotationAxis::Horizontal].vel;
    let vertical = state.angular[RotationAxis::Vertical].vel;
    if horizontal == 0.0 && vertical == 0.0 {
        return;
    }
    let mut velocity = state.right() * horizontal * translate_units + state.up * vertical * translate_units;
    if let Some(limit) = speed_limit {
        velocity = crate::math::clamp_length(velocity, limit);
    }
    state.position += velocity * dt;
}

/// Steering parameters for [`steer_toward`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Steering {
    /// Blend rate per second; the blend factor is `min(1, rate * dt)`
    pub rate: f64,
    /// Converged below this angle (degrees)
    pub threshold_deg: f64,
    /// Planetarium tilt: the target is raised by `tan(angle) * distance` along
    /// the component of `up` perpendicular to the line of sight to it
    pub planetarium_angle_deg: Option<f64>,
}

/// Turn the view gently toward `target`. Returns whether the view faces it.
pub fn steer_toward(state: &mut CameraState, target: DVec3, dt: f64, steering: &Steering) -> bool {
    let mut to_target = target - state.position;
    if let Some(angle) = steering.planetarium_angle_deg {
        let distance = to_target.length();
        let lift = to_target.cross(state.up).cross(to_target).try_normalize();
        if let Some(lift) = lift {
            to_target += lift * angle.to_radians().tan() * distance;
        }
    }
    let Some(desired) = to_target.try_normalize() else {
        return true;
    };

    if angle_between_deg(desired, state.direction) > steering.threshold_deg {
        let blend = (steering.rate * dt).clamp(0.0, 1.0);
        let turned = state.direction + (desired - state.direction) * blend;
        state.direction = normalize_or(turned, state.direction);
        state.orthonormalize();
        false
    } else {
        true
    }
}

/// Point the view at `target` immediately.
pub fn snap_toward(state: &mut CameraState, target: DVec3) {
    if let Some(desired) = (target - state.position).try_normalize() {
        state.direction = desired;
        state.orthonormalize();
    }
}

/// Co-rotate the camera with a spinning focus.
///
/// Revolves the position about the spin `axis` through `pivot` and rotates
/// the view by the same angle.
pub fn compensate_spin(state: &mut CameraState, pivot: DVec3, axis: DVec3, delta_deg: f64) {
    if delta_deg == 0.0 || !delta_deg.is_finite() {
        return;
    }
    rotate_around(state, pivot, axis, delta_deg);
    state.orthonormalize();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(state: &CameraState) {
        assert!((state.direction.length() - 1.0).abs() < 1e-9);
        assert!((state.up.length() - 1.0).abs() < 1e-9);
        assert!(state.direction.dot(state.up).abs() < 1e-9);
    }

    #[test]
    fn test_yaw_turns_right() {
        let mut state = CameraState::default();
        state.angular[RotationAxis::Yaw].vel = 90.0;
        update_free_rotation(&mut state, 1.0, 1.0, false);
        // Negative rotation about +Y takes -Z to +X
        assert!((state.direction - DVec3::X).length() < 1e-9);
        assert_eq!(state.angular[RotationAxis::Yaw].vel, 0.0);
        assert_orthonormal(&state);
    }

    #[test]
    fn test_pitch_keeps_basis_orthonormal() {
        let mut state = CameraState::default();
        state.angular[RotationAxis::Pitch].accel = 30.0;
        for _ in 0..100 {
            state.angular[RotationAxis::Pitch].accel = 30.0;
            update_free_rotation(&mut state, 0.016, 1.0, true);
            assert_orthonormal(&state);
        }
        assert!(state.angular[RotationAxis::Pitch].vel > 0.0);
    }

    #[test]
    fn test_roll_rotates_up_only() {
        let mut state = CameraState::default();
        state.angular[RotationAxis::Roll].vel = 45.0;
        update_roll(&mut state, 1.0, 1.0, false);
        assert!((state.direction - DVec3::NEG_Z).length() < 1e-12);
        assert!((state.up.y - 45f64.to_radians().cos()).abs() < 1e-9);
    }

    #[test]
    fn test_orbit_keeps_distance_to_center() {
        let center = DVec3::ZERO;
        let mut state = CameraState::with_pose(DVec3::new(0.0, 0.0, 50.0), DVec3::NEG_Z, DVec3::Y);
        state.angular[RotationAxis::Horizontal].vel = 30.0;
        state.angular[RotationAxis::Vertical].vel = 10.0;
        update_orbit(&mut state, 1.0, center, 1.0, false);
        assert!((state.position.length() - 50.0).abs() < 1e-9);
        // Still looking at the center
        let to_center = (center - state.position).normalize();
        assert!((to_center - state.direction).length() < 1e-9);
        assert_orthonormal(&state);
    }

    #[test]
    fn test_lateral_pans_right() {
        let mut state = CameraState::default();
        state.angular[RotationAxis::Horizontal].vel = 1.0;
        update_lateral(&mut state, 1.0, 2.0, None);
        assert!((state.position - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-12);

        let mut state = CameraState::default();
        state.angular[RotationAxis::Vertical].vel = 1.0;
        update_lateral(&mut state, 1.0, 10.0, Some(3.0));
        assert!((state.position.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_steer_converges() {
        let mut state = CameraState::default();
        let steering = Steering {
            rate: 10.0,
            threshold_deg: 0.5,
            planetarium_angle_deg: None,
        };
        let target = DVec3::new(100.0, 0.0, 0.0);
        let mut facing = false;
        for _ in 0..200 {
            facing = steer_toward(&mut state, target, 0.016, &steering);
            assert_orthonormal(&state);
            if facing {
                break;
            }
        }
        assert!(facing);
        assert!(angle_between_deg(state.direction, DVec3::X) <= 0.5);
    }

    #[test]
    fn test_steer_opposite_target_is_finite() {
        let mut state = CameraState::default();
        let steering = Steering {
            rate: 1e6,
            threshold_deg: 0.5,
            planetarium_angle_deg: None,
        };
        // Blend factor 1 toward the exact opposite direction
        steer_toward(&mut state, DVec3::new(0.0, 0.0, 10.0), 1.0, &steering);
        assert!(state.direction.is_finite());
        assert_orthonormal(&state);
    }

    #[test]
    fn test_planetarium_bias_raises_target() {
        let mut state = CameraState::default();
        let steering = Steering {
            rate: 1e6,
            threshold_deg: 0.01,
            planetarium_angle_deg: Some(45.0),
        };
        steer_toward(&mut state, DVec3::new(0.0, 0.0, -10.0), 1.0, &steering);
        assert!((angle_between_deg(state.direction, DVec3::NEG_Z) - 45.0).abs() < 1e-6);
        assert!(state.direction.y > 0.0);
    }

    #[test]
    fn test_planetarium_bias_tilts_off_axis_target() {
        // Target already 45 degrees above the view; the tilt is measured from the target line
        let mut state = CameraState::default();
        let steering = Steering {
            rate: 1e6,
            threshold_deg: 0.01,
            planetarium_angle_deg: Some(45.0),
        };
        let target = DVec3::new(0.0, 10.0, -10.0);
        steer_toward(&mut state, target, 1.0, &steering);
        assert!((angle_between_deg(state.direction, target) - 45.0).abs() < 1e-6);
        assert!((state.direction - DVec3::Y).length() < 1e-9);
        assert_orthonormal(&state);
    }

    #[test]
    fn test_planetarium_bias_skipped_when_up_along_target() {
        let mut state = CameraState::with_pose(DVec3::ZERO, DVec3::NEG_Z, DVec3::Y);
        let steering = Steering {
            rate: 1e6,
            threshold_deg: 0.01,
            planetarium_angle_deg: Some(30.0),
        };
        let target = DVec3::new(0.0, 10.0, 0.0);
        steer_toward(&mut state, target, 1.0, &steering);
        assert!((state.direction - DVec3::Y).length() < 1e-9);
        assert!(state.up.is_finite());
    }

    #[test]
    fn test_snap_toward() {
        let mut state = CameraState::default();
        snap_toward(&mut state, DVec3::new(0.0, 5.0, -5.0));
        let expected = DVec3::new(0.0, 1.0, -1.0).normalize();
        assert!((state.direction - expected).length() < 1e-12);
        assert_orthonormal(&state);
    }

    #[test]
    fn test_compensate_spin_rotates_around_pivot() {
        let pivot = DVec3::new(10.0, 0.0, 0.0);
        let mut state = CameraState::with_pose(DVec3::new(10.0, 0.0, 5.0), DVec3::NEG_Z, DVec3::Y);
        compensate_spin(&mut state, pivot, DVec3::Y, 90.0);
        assert!((state.position - DVec3::new(15.0, 0.0, 0.0)).length() < 1e-9);
        assert!((state.direction - DVec3::NEG_X).length() < 1e-9);
    }
}
