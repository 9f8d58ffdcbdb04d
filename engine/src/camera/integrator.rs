//! Translational Integrator
//!
//! Advances velocity and position from the accumulated force, friction,
//! device velocity and cruise thrust. Speeds span from metres per second
//! near a surface to megaparsecs per second in intergalactic space, so every
//! step is bounded by the distance-dependent translate units.

use glam::DVec3;
use log::trace;

use super::config::{DistanceCurve, NavigationConfig};
use super::mode::CameraMode;
use super::state::{CameraState, DeviceInput};
use crate::math::{clamp_length, normalize_or};

/// Translate units for a given clearance above the tracked surface.
///
/// Zero when the clearance is negative (or NaN), otherwise the distance curve
/// floored at `min_units` and scaled by `speed`.
pub fn translate_units(clearance: f64, min_units: f64, speed: f64, curve: &DistanceCurve) -> f64 {
    if !(clearance >= 0.0) {
        return 0.0;
    }
    curve.eval(clearance).max(min_units) * speed
}

/// Clearance of the camera above a body surface, keeping `min_distance` of margin.
#[inline]
pub fn clearance(distance_to_center: f64, surface_height: f64, min_distance: f64) -> f64 {
    distance_to_center - (surface_height + min_distance)
}

/// Distance to the focus surface used to boost friction when zooming in
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusProximity {
    /// Distance from the camera to the focus center
    pub distance: f64,
    /// Surface height of the focus below the camera
    pub elevation: f64,
}

/// Per-step inputs of [`integrate_position`]
#[derive(Clone, Copy, Debug)]
pub struct IntegratorStep<'a> {
    pub config: &'a NavigationConfig,
    pub mode: CameraMode,
    pub device: &'a DeviceInput,
    /// Uncapped translate units
    pub translate_units: f64,
    /// Velocity ceiling (translate units floored at the translate floor)
    pub ceiling: f64,
    /// Scale used for the cinematic friction counter
    pub friction_scale: f64,
    /// Set in focus mode
    pub focus: Option<FocusProximity>,
    /// Response window in seconds after which the camera is braked to a stop
    pub response_window: f64,
    /// Speed multiplier
    pub speed_multiplier: f64,
}

/// Advance the translational state by `dt` seconds.
pub fn integrate_position(state: &mut CameraState, dt: f64, step: &IntegratorStep<'_>) {
    let config = step.config;

    // Device velocity bypasses force
    if step.device.gamepad_velocity != 0.0 {
        state.velocity = state.direction * step.device.gamepad_velocity * step.ceiling;
    } else if let Some(beam) = step.device.vr_beam.filter(|b| b.amount_x != 0.0 || b.amount_y != 0.0) {
        let along = normalize_or(beam.p1 - beam.p0, state.direction);
        let across = normalize_or(along.cross(state.up), state.right());
        state.velocity = along * beam.amount_y * step.ceiling + across * beam.amount_x * step.ceiling;
    }

    let speed = state.velocity.length();
    if state.full_stop {
        let mut counter = if state.last_forward_amount < 0.0 && config.cinematic {
            step.friction_scale.min(config.cinematic_friction_cap)
        } else {
            config.friction
        };
        if let Some(focus) = step.focus {
            if step.mode.is_focus() && state.last_forward_amount > 0.0 {
                let scale = focus.elevation / (focus.distance - focus.elevation);
                if scale.is_finite() && scale > 0.0 {
                    counter *= scale;
                }
            }
        }
        let amount = -speed * counter * dt;
        state.friction = if amount.is_finite() {
            normalize_or(state.velocity, DVec3::ZERO) * amount
        } else {
            DVec3::ZERO
        };
    } else {
        state.friction = -state.force * dt;
    }
    state.force += state.friction;

    let window_elapsed = state.last_forward_time > step.response_window
        && !step.device.drives_velocity()
        && state.full_stop;
    if window_elapsed || (state.last_forward_amount > 0.0 && step.translate_units == 0.0) {
        state.stop_translation();
    }

    if state.thrust != 0.0 {
        state.force += state.direction * state.thrust * state.thrust_direction;
    }
    state.acceleration += state.force;

    if state.force == DVec3::ZERO && state.velocity == DVec3::ZERO && state.acceleration == DVec3::ZERO {
        return;
    }

    state.velocity += state.acceleration * dt * step.speed_multiplier;
    if let Some(limit) = config.speed_limit {
        state.velocity = clamp_length(state.velocity, limit);
    }
    if state.last_velocity.dot(state.velocity) < 0.0 {
        state.velocity = DVec3::ZERO;
    }

    if step.mode.is_focus() {
        let magnitude = state.velocity.length();
        let along = state.velocity.dot(state.focus_direction);
        let sign = if along > 0.0 {
            1.0
        } else if along < 0.0 {
            -1.0
        } else {
            0.0
        };
        state.velocity = normalize_or(state.focus_direction, DVec3::ZERO) * sign * magnitude;
    }

    state.velocity = clamp_length(state.velocity, step.ceiling * step.speed_multiplier);
    trace!(
        "integrate: tu={:.3e} ceiling={:.3e} speed={:.3e}",
        step.translate_units,
        step.ceiling,
        state.velocity.length()
    );
    state.position += state.velocity * dt;

    state.acceleration = DVec3::ZERO;
    state.force = DVec3::ZERO;
    state.last_velocity = state.velocity;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::state::VrBeam;

    fn step<'a>(config: &'a NavigationConfig, device: &'a DeviceInput, mode: CameraMode) -> IntegratorStep<'a> {
        IntegratorStep {
            config,
            mode,
            device,
            translate_units: 1.0,
            ceiling: 1e6,
            friction_scale: 1.0,
            focus: None,
            response_window: config.response_window(mode.is_game_like()),
            speed_multiplier: 1.0,
        }
    }

    #[test]
    fn test_translate_units_zero_below_surface() {
        let curve = DistanceCurve::default();
        assert_eq!(translate_units(-1.0, 1e-8, 1.0, &curve), 0.0);
        assert_eq!(translate_units(f64::NAN, 1e-8, 1.0, &curve), 0.0);
    }

    #[test]
    fn test_translate_units_floor_and_speed() {
        let curve = DistanceCurve::default();
        assert_eq!(translate_units(0.0, 0.5e-8, 1.0, &curve), 0.5e-8);
        let base = translate_units(curve.dist_a, 0.5e-8, 1.0, &curve);
        assert!((base - curve.units_a).abs() < 1e-6);
        let fast = translate_units(curve.dist_a, 0.5e-8, 3.0, &curve);
        assert!((fast - 3.0 * base).abs() < 1e-6);
    }

    #[test]
    fn test_friction_decays_monotonically() {
        let config = NavigationConfig::default();
        let device = DeviceInput::default();
        let mut state = CameraState::default();
        state.velocity = DVec3::new(0.0, 0.0, -10.0);
        state.last_velocity = state.velocity;
        let s = step(&config, &device, CameraMode::Free);

        let mut last = state.speed();
        for _ in 0..20 {
            integrate_position(&mut state, 0.016, &s);
            let now = state.speed();
            assert!(now <= last);
            last = now;
        }
        assert!(last < 10.0);
    }

    #[test]
    fn test_stops_after_response_window() {
        let config = NavigationConfig::default();
        let device = DeviceInput::default();
        let mut state = CameraState::default();
        state.velocity = DVec3::new(1.0, 0.0, 0.0);
        state.last_forward_time = config.response_time + 0.1;
        integrate_position(&mut state, 0.016, &step(&config, &device, CameraMode::Free));
        assert_eq!(state.velocity, DVec3::ZERO);
        assert_eq!(state.position, DVec3::ZERO);
    }

    #[test]
    fn test_reversal_zeroes_velocity() {
        let config = NavigationConfig::default();
        let device = DeviceInput::default();
        let mut state = CameraState::default();
        state.full_stop = false;
        state.last_velocity = DVec3::new(0.0, 0.0, 1.0);
        state.force = DVec3::new(0.0, 0.0, -1000.0);
        integrate_position(&mut state, 0.1, &step(&config, &device, CameraMode::Free));
        assert_eq!(state.velocity, DVec3::ZERO);
    }

    #[test]
    fn test_push_after_stop_is_not_a_reversal() {
        let config = NavigationConfig::default();
        let device = DeviceInput::default();
        let mut state = CameraState::default();
        state.full_stop = false;
        state.last_velocity = DVec3::new(0.0, 0.0, -1.0);
        state.velocity = DVec3::new(0.0, 0.0, -1.0);
        state.stop_translation();

        state.force = DVec3::new(0.0, 0.0, 10.0);
        integrate_position(&mut state, 0.1, &step(&config, &device, CameraMode::Free));
        assert!(state.velocity.z > 0.0);
        assert!(state.position.z > 0.0);
    }

    #[test]
    fn test_velocity_clamped_to_ceiling_and_limit() {
        let mut config = NavigationConfig::default();
        let device = DeviceInput::default();
        let mut state = CameraState::default();
        state.full_stop = false;
        state.force = DVec3::new(1e9, 0.0, 0.0);
        let mut s = step(&config, &device, CameraMode::Free);
        s.ceiling = 5.0;
        integrate_position(&mut state, 0.5, &s);
        assert!((state.speed() - 5.0).abs() < 1e-9);

        config.speed_limit = Some(2.0);
        let mut state = CameraState::default();
        state.full_stop = false;
        state.force = DVec3::new(1e9, 0.0, 0.0);
        let s = step(&config, &device, CameraMode::Free);
        integrate_position(&mut state, 0.5, &s);
        assert!((state.speed() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_focus_mode_repoints_velocity() {
        let config = NavigationConfig::default();
        let device = DeviceInput::default();
        let mut state = CameraState::default();
        state.full_stop = false;
        state.focus_direction = DVec3::X;
        state.force = DVec3::new(-3.0, 4.0, 0.0);
        integrate_position(&mut state, 0.5, &step(&config, &device, CameraMode::Focus));
        // Signed magnitude kept, direction along the focus direction
        assert!((state.velocity.x + 1.25).abs() < 1e-9);
        assert!(state.velocity.y.abs() < 1e-12);

        // Perpendicular velocity has no sign and vanishes
        let mut state = CameraState::default();
        state.full_stop = false;
        state.focus_direction = DVec3::X;
        state.force = DVec3::new(0.0, 4.0, 0.0);
        integrate_position(&mut state, 0.5, &step(&config, &device, CameraMode::Focus));
        assert_eq!(state.velocity, DVec3::ZERO);
    }

    #[test]
    fn test_gamepad_sets_velocity_along_view() {
        let config = NavigationConfig::default();
        let device = DeviceInput {
            gamepad_velocity: 0.5,
            ..Default::default()
        };
        let mut state = CameraState::default();
        let mut s = step(&config, &device, CameraMode::Free);
        s.ceiling = 10.0;
        integrate_position(&mut state, 0.1, &s);
        assert!(state.position.z < 0.0);
        assert!(state.position.x.abs() < 1e-12);
    }

    #[test]
    fn test_vr_beam_sets_velocity() {
        let config = NavigationConfig::default();
        let device = DeviceInput {
            vr_beam: Some(VrBeam {
                p0: DVec3::ZERO,
                p1: DVec3::new(0.0, 0.0, -2.0),
                amount_x: 0.0,
                amount_y: 1.0,
            }),
            ..Default::default()
        };
        let mut state = CameraState::default();
        let mut s = step(&config, &device, CameraMode::Free);
        s.ceiling = 1.0;
        integrate_position(&mut state, 1.0, &s);
        assert!(state.velocity.z < 0.0);
    }

    #[test]
    fn test_thrust_pushes_along_direction() {
        let config = NavigationConfig::default();
        let device = DeviceInput::default();
        let mut state = CameraState::default();
        state.full_stop = false;
        state.thrust = 2.0;
        state.thrust_direction = 1.0;
        integrate_position(&mut state, 0.5, &step(&config, &device, CameraMode::Free));
        assert!(state.velocity.z < 0.0);
        assert!(state.position.z < 0.0);
    }

    #[test]
    fn test_zero_dt_is_finite() {
        let config = NavigationConfig::default();
        let device = DeviceInput::default();
        let mut state = CameraState::default();
        state.velocity = DVec3::new(1.0, 2.0, 3.0);
        integrate_position(&mut state, 0.0, &step(&config, &device, CameraMode::Focus));
        assert!(state.position.is_finite());
        assert!(state.velocity.is_finite());
    }
}
