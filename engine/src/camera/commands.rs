//! Camera commands
//!
//! Input listeners run on their own threads and never touch the camera
//! directly. They post [`CameraCommand`]s through a cloneable
//! [`CommandSender`]; the simulation thread drains the [`CommandQueue`] once
//! at the start of every update.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use glam::DVec3;

use super::config::FocusLockConfig;
use super::mode::CameraMode;
use super::state::VrBeam;
use crate::scene::{BodyHandle, FocusHandle};

/// A discrete request to the navigation camera.
#[derive(Clone)]
pub enum CameraCommand {
    /// Forward (positive) or backward thrust
    ForwardForce(f64),
    /// Instantaneous nudges along the view, right and up vectors
    Forward { amount: f64, min_translate: f64 },
    Strafe { amount: f64, min_translate: f64 },
    Vertical { amount: f64, min_translate: f64 },
    /// Screen-space pan
    Pan { dx: f64, dy: f64 },
    /// Yaw/pitch in free mode, orbit in focus mode
    Rotate {
        dx: f64,
        dy: f64,
        look_held: bool,
        acceleration: bool,
    },
    /// Yaw/pitch regardless of mode
    Turn { dx: f64, dy: f64, acceleration: bool },
    Roll { amount: f64, acceleration: bool },
    /// Orbit (focus) or lateral pan (free) velocities
    SetHorizontal(f64),
    SetVertical(f64),
    StopForward,
    StopRotate,
    StopRoll,
    StopTurn,
    StopAll,
    /// Turn back to the focus after looking away
    Center,
    GoToFocus,
    SetFocus(FocusHandle),
    SetClosestBody(Option<BodyHandle>),
    SetTracking(Option<FocusHandle>),
    SetMode { mode: CameraMode, center_focus: bool },
    SetPosition(DVec3),
    SetDirection(DVec3),
    SetUp(DVec3),
    SetFov(f64),
    /// Steer toward a sky direction, in degrees
    LookAtSky { ra_deg: f64, dec_deg: f64 },
    Gamepad(f64),
    Vr(Option<VrBeam>),
    ControllerActive(bool),
    JumpHeld(bool),
    Thrust { amount: f64, direction: f64 },
    Home,
    SetCinematic(bool),
    SetFocusLock(FocusLockConfig),
    SetSpeed(f64),
    SetTurnSpeed(f64),
    SetRotateSpeed(f64),
    SetSpeedLimit(Option<f64>),
    SetMultipliers { movement: f64, speed: f64 },
    /// Pose for scripted-path mode
    ScriptedPose { position: DVec3, direction: DVec3, up: DVec3 },
}

impl std::fmt::Debug for CameraCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraCommand::SetFocus(handle) => f
                .debug_tuple("SetFocus")
                .field(&handle.upgrade().map(|focus| focus.id()))
                .finish(),
            CameraCommand::SetClosestBody(handle) => f
                .debug_tuple("SetClosestBody")
                .field(&handle.as_ref().map(|h| h.strong_count() > 0))
                .finish(),
            CameraCommand::SetTracking(handle) => f
                .debug_tuple("SetTracking")
                .field(&handle.as_ref().and_then(|h| h.upgrade()).map(|focus| focus.id()))
                .finish(),
            other => f.write_str(other.name()),
        }
    }
}

impl CameraCommand {
    /// Command name for logs
    pub fn name(&self) -> &'static str {
        match self {
            CameraCommand::ForwardForce(_) => "ForwardForce",
            CameraCommand::Forward { .. } => "Forward",
            CameraCommand::Strafe { .. } => "Strafe",
            CameraCommand::Vertical { .. } => "Vertical",
            CameraCommand::Pan { .. } => "Pan",
            CameraCommand::Rotate { .. } => "Rotate",
            CameraCommand::Turn { .. } => "Turn",
            CameraCommand::Roll { .. } => "Roll",
            CameraCommand::SetHorizontal(_) => "SetHorizontal",
            CameraCommand::SetVertical(_) => "SetVertical",
            CameraCommand::StopForward => "StopForward",
            CameraCommand::StopRotate => "StopRotate",
            CameraCommand::StopRoll => "StopRoll",
            CameraCommand::StopTurn => "StopTurn",
            CameraCommand::StopAll => "StopAll",
            CameraCommand::Center => "Center",
            CameraCommand::GoToFocus => "GoToFocus",
            CameraCommand::SetFocus(_) => "SetFocus",
            CameraCommand::SetClosestBody(_) => "SetClosestBody",
            CameraCommand::SetTracking(_) => "SetTracking",
            CameraCommand::SetMode { .. } => "SetMode",
            CameraCommand::SetPosition(_) => "SetPosition",
            CameraCommand::SetDirection(_) => "SetDirection",
            CameraCommand::SetUp(_) => "SetUp",
            CameraCommand::SetFov(_) => "SetFov",
            CameraCommand::LookAtSky { .. } => "LookAtSky",
            CameraCommand::Gamepad(_) => "Gamepad",
            CameraCommand::Vr(_) => "Vr",
            CameraCommand::ControllerActive(_) => "ControllerActive",
            CameraCommand::JumpHeld(_) => "JumpHeld",
            CameraCommand::Thrust { .. } => "Thrust",
            CameraCommand::Home => "Home",
            CameraCommand::SetCinematic(_) => "SetCinematic",
            CameraCommand::SetFocusLock(_) => "SetFocusLock",
            CameraCommand::SetSpeed(_) => "SetSpeed",
            CameraCommand::SetTurnSpeed(_) => "SetTurnSpeed",
            CameraCommand::SetRotateSpeed(_) => "SetRotateSpeed",
            CameraCommand::SetSpeedLimit(_) => "SetSpeedLimit",
            CameraCommand::SetMultipliers { .. } => "SetMultipliers",
            CameraCommand::ScriptedPose { .. } => "ScriptedPose",
        }
    }
}

/// Cloneable producer side of the [`CommandQueue`]
#[derive(Clone)]
pub struct CommandSender {
    tx: Sender<CameraCommand>,
    pending: Arc<AtomicUsize>,
}

impl CommandSender {
    /// Post a command. Returns false if the camera has been dropped.
    pub fn send(&self, cmd: CameraCommand) -> bool {
        if self.tx.send(cmd).is_ok() {
            self.pending.fetch_add(1, Ordering::Release);
            true
        } else {
            false
        }
    }
}

/// Consumer side, owned by the camera.
pub struct CommandQueue {
    tx: Sender<CameraCommand>,
    rx: Receiver<CameraCommand>,
    pending: Arc<AtomicUsize>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<CameraCommand>();
        Self {
            tx,
            rx,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// New producer handle
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
            pending: Arc::clone(&self.pending),
        }
    }

    /// Number of commands posted but not drained yet
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Take the commands posted so far.
    ///
    /// Commands posted while draining stay queued for the next call.
    pub fn drain(&self) -> Vec<CameraCommand> {
        let count = self.pending.swap(0, Ordering::AcqRel);
        let mut commands = Vec::with_capacity(count);
        for _ in 0..count {
            match self.rx.try_recv() {
                Ok(cmd) => commands.push(cmd),
                Err(_) => break,
            }
        }
        commands
    }
}
