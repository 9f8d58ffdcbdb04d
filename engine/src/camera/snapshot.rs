//! Camera snapshot for renderers
//!
//! Positions span ~1e25 internal units, far beyond f32 precision. The
//! snapshot splits the position into a high and a low f32 part
//! (`high + low ≈ position`), the usual trick for camera-relative rendering.

use super::mode::CameraMode;
use super::state::CameraState;

/// Per-frame camera snapshot. Layout matches a WGSL uniform struct:
///
///   offset  0: position_high (vec3<f32>) = 12 bytes
///   offset 12: mode (u32)                = 4 bytes
///   offset 16: position_low (vec3<f32>)  = 12 bytes
///   offset 28: fov_deg (f32)             = 4 bytes
///   offset 32: direction (vec3<f32>)     = 12 bytes
///   offset 44: speed (f32)               = 4 bytes
///   offset 48: up (vec3<f32>)            = 12 bytes
///   offset 60: _pad (u32)                = 4 bytes
///   Total: 64 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraFrame {
    pub position_high: [f32; 3],
    /// 0 = free, 1 = focus, 2 = game, 3 = scripted path
    pub mode: u32,
    pub position_low: [f32; 3],
    pub fov_deg: f32,
    pub direction: [f32; 3],
    /// Camera speed in internal units per second
    pub speed: f32,
    pub up: [f32; 3],
    pub _pad: u32,
}

static_assertions::assert_eq_size!(CameraFrame, [u8; 64]);

impl CameraFrame {
    pub fn new(state: &CameraState, mode: CameraMode, fov_deg: f64) -> Self {
        let (position_high, position_low) = split_f64x3(state.position.to_array());
        Self {
            position_high,
            mode: mode_code(mode),
            position_low,
            fov_deg: fov_deg as f32,
            direction: state.direction.as_vec3().to_array(),
            speed: state.speed() as f32,
            up: state.up.as_vec3().to_array(),
            _pad: 0,
        }
    }

    /// Reassembled double-precision position
    pub fn position(&self) -> glam::DVec3 {
        glam::DVec3::from_array(self.position_high.map(f64::from))
            + glam::DVec3::from_array(self.position_low.map(f64::from))
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

fn mode_code(mode: CameraMode) -> u32 {
    match mode {
        CameraMode::Free => 0,
        CameraMode::Focus => 1,
        CameraMode::Game => 2,
        CameraMode::ScriptedPath => 3,
    }
}

fn split_f64x3(v: [f64; 3]) -> ([f32; 3], [f32; 3]) {
    let high = v.map(|x| x as f32);
    let mut low = [0.0f32; 3];
    for i in 0..3 {
        low[i] = (v[i] - f64::from(high[i])) as f32;
    }
    (high, low)
}
