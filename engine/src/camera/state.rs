//! Camera state
//!
//! Everything the navigation subsystem integrates from frame to frame:
//! the pose, the translational integrator vectors, and five angular degrees
//! of freedom (pitch, yaw, roll plus the two orbit axes around the focus).

use std::ops::{Index, IndexMut};

use glam::DVec3;

/// One rotational degree of freedom
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AngularAxis {
    /// Angular acceleration (deg/s²)
    pub accel: f64,
    /// Angular velocity (deg/s)
    pub vel: f64,
    /// Angle advanced during the last step (deg)
    pub delta: f64,
}

impl AngularAxis {
    /// Integrate one step. Returns false when the axis is at rest.
    pub fn advance(&mut self, dt: f64) -> bool {
        if self.accel == 0.0 && self.vel == 0.0 {
            return false;
        }
        self.vel += self.accel * dt;
        self.delta = (self.vel * dt) % 360.0;
        true
    }

    /// Clear acceleration, and velocity too unless momentum is kept.
    #[inline]
    pub fn settle(&mut self, keep_momentum: bool) {
        self.accel = 0.0;
        if !keep_momentum {
            self.vel = 0.0;
        }
    }

    /// Add to the acceleration, or set the velocity directly.
    #[inline]
    pub fn apply(&mut self, amount: f64, as_acceleration: bool) {
        if as_acceleration {
            self.accel += amount;
        } else {
            self.vel = amount;
        }
    }

    /// Zero the axis. Returns whether anything was non-zero.
    pub fn stop(&mut self) -> bool {
        let moving = self.accel != 0.0 || self.vel != 0.0 || self.delta != 0.0;
        *self = Self::default();
        moving
    }

    #[inline]
    pub fn is_at_rest(&self) -> bool {
        self.accel == 0.0 && self.vel == 0.0
    }
}

/// Index into [`AngularState`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RotationAxis {
    Pitch,
    Yaw,
    Roll,
    /// Orbit around the focus, about the camera's up vector
    Horizontal,
    /// Orbit around the focus, about the camera's right vector
    Vertical,
}

impl RotationAxis {
    pub const ALL: [RotationAxis; 5] = [
        RotationAxis::Pitch,
        RotationAxis::Yaw,
        RotationAxis::Roll,
        RotationAxis::Horizontal,
        RotationAxis::Vertical,
    ];

    #[inline]
    const fn index(self) -> usize {
        match self {
            RotationAxis::Pitch => 0,
            RotationAxis::Yaw => 1,
            RotationAxis::Roll => 2,
            RotationAxis::Horizontal => 3,
            RotationAxis::Vertical => 4,
        }
    }
}

/// Angular state for all five rotational degrees of freedom
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AngularState([AngularAxis; 5]);

impl AngularState {
    /// Stop the given axes. Returns whether any of them was moving.
    pub fn stop(&mut self, axes: &[RotationAxis]) -> bool {
        axes.iter()
            .fold(false, |moving, &axis| self[axis].stop() | moving)
    }

    pub fn is_at_rest(&self) -> bool {
        self.0.iter().all(AngularAxis::is_at_rest)
    }
}

impl Index<RotationAxis> for AngularState {
    type Output = AngularAxis;

    fn index(&self, axis: RotationAxis) -> &AngularAxis {
        &self.0[axis.index()]
    }
}

impl IndexMut<RotationAxis> for AngularState {
    fn index_mut(&mut self, axis: RotationAxis) -> &mut AngularAxis {
        &mut self.0[axis.index()]
    }
}

/// VR controller beam used as a velocity source
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VrBeam {
    /// Beam start
    pub p0: DVec3,
    /// Beam end
    pub p1: DVec3,
    /// Amount perpendicular to the beam, in [-1, 1]
    pub amount_x: f64,
    /// Amount along the beam, in [-1, 1]
    pub amount_y: f64,
}

/// Continuous device intents staged for the next integration step
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeviceInput {
    /// Gamepad stick magnitude in [-1, 1], along the view direction
    pub gamepad_velocity: f64,
    /// VR beam velocity, if a controller is pointing
    pub vr_beam: Option<VrBeam>,
    /// A continuous controller drives rotation (angular momentum is kept)
    pub controller_active: bool,
    /// Up/jump input is held (suspends game mode gravity)
    pub jump_held: bool,
}

impl DeviceInput {
    /// True when a device sets the velocity directly this frame
    pub fn drives_velocity(&self) -> bool {
        self.gamepad_velocity != 0.0
            || self
                .vr_beam
                .is_some_and(|beam| beam.amount_x != 0.0 || beam.amount_y != 0.0)
    }
}

/// Full mutable state of the navigation camera
#[derive(Clone, Debug, PartialEq)]
pub struct CameraState {
    pub position: DVec3,
    /// View direction, unit length
    pub direction: DVec3,
    /// Up vector, unit length and perpendicular to `direction`
    pub up: DVec3,
    pub velocity: DVec3,
    pub acceleration: DVec3,
    pub force: DVec3,
    pub friction: DVec3,
    /// Velocity at the end of the previous step (reversal detection)
    pub last_velocity: DVec3,
    pub angular: AngularState,
    /// Seconds since the last explicit thrust command
    pub last_forward_time: f64,
    /// Signed amount of the last thrust command (positive = forward)
    pub last_forward_amount: f64,
    /// Constant cruise thrust and its sign
    pub thrust: f64,
    pub thrust_direction: f64,
    /// Friction brakes the camera to a stop after the response window
    pub full_stop: bool,
    /// The user looked away from the focus while in focus mode
    pub diverted: bool,
    /// Turn-toward-target has converged
    pub facing_focus: bool,
    /// Unit vector from camera to focus, refreshed every focus-mode step
    pub focus_direction: DVec3,
    /// Last known finite position
    pub position_backup: DVec3,
}

impl Default for CameraState {
    fn default() -> Self {
        Self::with_pose(DVec3::ZERO, DVec3::NEG_Z, DVec3::Y)
    }
}

impl CameraState {
    /// Create a state at rest with the given pose. `direction` and `up` are
    /// normalized and orthogonalized.
    pub fn with_pose(position: DVec3, direction: DVec3, up: DVec3) -> Self {
        let direction = crate::math::normalize_or(direction, DVec3::NEG_Z);
        let up = crate::math::orthonormal_up(direction, up);
        Self {
            position,
            direction,
            up,
            velocity: DVec3::ZERO,
            acceleration: DVec3::ZERO,
            force: DVec3::ZERO,
            friction: DVec3::ZERO,
            last_velocity: DVec3::ZERO,
            angular: AngularState::default(),
            last_forward_time: 0.0,
            last_forward_amount: 0.0,
            thrust: 0.0,
            thrust_direction: 0.0,
            full_stop: true,
            diverted: false,
            facing_focus: false,
            focus_direction: direction,
            position_backup: position,
        }
    }

    /// Camera right vector
    #[inline]
    pub fn right(&self) -> DVec3 {
        crate::math::normalize_or(self.direction.cross(self.up), DVec3::X)
    }

    /// Renormalize `direction` and make `up` perpendicular to it.
    pub fn orthonormalize(&mut self) {
        self.direction = crate::math::normalize_or(self.direction, DVec3::NEG_Z);
        self.up = crate::math::orthonormal_up(self.direction, self.up);
    }

    /// Zero force and velocity. Returns whether either was non-zero.
    ///
    /// Also forgets the previous velocity, so the first push after a stop is
    /// never taken for a reversal.
    pub fn stop_translation(&mut self) -> bool {
        let moving = self.force != DVec3::ZERO || self.velocity != DVec3::ZERO;
        self.force = DVec3::ZERO;
        self.velocity = DVec3::ZERO;
        self.last_velocity = DVec3::ZERO;
        moving
    }

    /// Current speed
    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_advance_wraps_delta() {
        let mut axis = AngularAxis {
            accel: 0.0,
            vel: 1000.0,
            delta: 0.0,
        };
        assert!(axis.advance(0.5));
        assert_eq!(axis.delta, 140.0);
    }

    #[test]
    fn test_axis_at_rest_does_not_advance() {
        let mut axis = AngularAxis::default();
        assert!(!axis.advance(0.016));
        assert_eq!(axis.delta, 0.0);
    }

    #[test]
    fn test_axis_apply_modes() {
        let mut axis = AngularAxis::default();
        axis.apply(2.0, true);
        axis.apply(3.0, true);
        assert_eq!(axis.accel, 5.0);
        axis.apply(7.0, false);
        assert_eq!(axis.vel, 7.0);
    }

    #[test]
    fn test_axis_settle() {
        let mut axis = AngularAxis {
            accel: 1.0,
            vel: 2.0,
            delta: 0.1,
        };
        axis.settle(true);
        assert_eq!(axis.accel, 0.0);
        assert_eq!(axis.vel, 2.0);
        axis.settle(false);
        assert_eq!(axis.vel, 0.0);
    }

    #[test]
    fn test_angular_state_stop_is_idempotent() {
        let mut angular = AngularState::default();
        angular[RotationAxis::Yaw].vel = 4.0;
        assert!(angular.stop(&RotationAxis::ALL));
        assert!(!angular.stop(&RotationAxis::ALL));
        assert!(angular.is_at_rest());
    }

    #[test]
    fn test_with_pose_orthonormalizes() {
        let state = CameraState::with_pose(DVec3::ZERO, DVec3::new(0.0, 0.0, -2.0), DVec3::new(0.0, 1.0, 1.0));
        assert!((state.direction.length() - 1.0).abs() < 1e-12);
        assert!((state.up.length() - 1.0).abs() < 1e-12);
        assert!(state.direction.dot(state.up).abs() < 1e-12);
        assert_eq!(state.right(), DVec3::X);
    }

    #[test]
    fn test_device_input_drives_velocity() {
        let mut input = DeviceInput::default();
        assert!(!input.drives_velocity());
        input.vr_beam = Some(VrBeam {
            p0: DVec3::ZERO,
            p1: DVec3::Z,
            amount_x: 0.0,
            amount_y: 0.5,
        });
        assert!(input.drives_velocity());
    }
}
