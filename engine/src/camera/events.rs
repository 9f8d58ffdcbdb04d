//! Camera notifications
//!
//! The camera reports focus and mode changes to whoever owns the UI and
//! input listeners. Transport is pluggable through [`EventSink`].

use std::sync::mpsc::Sender;

use super::mode::CameraMode;
use crate::scene::FocusId;

/// Per-frame information about the current focus
#[derive(Clone, Debug, PartialEq)]
pub struct FocusInfo {
    pub id: FocusId,
    pub name: String,
    /// Distance from the camera to the focus surface
    pub distance_to_surface: f64,
    /// Apparent angular diameter in degrees
    pub view_angle_deg: f64,
    /// Right ascension and declination of the focus, in degrees
    pub ra_deg: f64,
    pub dec_deg: f64,
    /// Distance from the origin to the focus surface
    pub distance_from_origin: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CameraEvent {
    FocusChanged { id: FocusId, name: String },
    /// The focus became invalid and the camera fell back to free mode
    FocusLost(Option<FocusId>),
    ModeChanged { from: CameraMode, to: CameraMode },
    FocusInfoUpdated(FocusInfo),
    TrackingChanged(Option<FocusId>),
}

/// Receives camera notifications on the simulation thread.
pub trait EventSink: Send {
    fn post(&mut self, event: CameraEvent);
}

impl EventSink for Sender<CameraEvent> {
    fn post(&mut self, event: CameraEvent) {
        // Receiver gone means nobody listens any more
        let _ = self.send(event);
    }
}

/// Discards all events
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn post(&mut self, _event: CameraEvent) {}
}
