//! Camera navigation modes

use std::fmt;

use serde::{Deserialize, Serialize};

/// Navigation mode - selects which integrator/orientation behaviors run each frame
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// Default: free flight with inertia, rotation in place
    #[default]
    Free,
    /// Orbit and track a focus object
    Focus,
    /// Free flight with gravity toward the closest body
    Game,
    /// Pose driven by an external scripted path; physics bypassed
    ScriptedPath,
}

impl CameraMode {
    /// All modes, in declaration order
    pub const ALL: [CameraMode; 4] = [
        CameraMode::Free,
        CameraMode::Focus,
        CameraMode::Game,
        CameraMode::ScriptedPath,
    ];

    #[inline]
    pub fn is_focus(self) -> bool {
        self == CameraMode::Focus
    }

    /// Game-like modes use the game input scheme and gravity
    #[inline]
    pub fn is_game_like(self) -> bool {
        self == CameraMode::Game
    }

    /// Sensitivity and friction are computed relative to the focus object
    #[inline]
    pub fn uses_focus_object(self) -> bool {
        self.is_focus()
    }

    /// Sensitivity is computed relative to the closest body
    #[inline]
    pub fn uses_closest_body(self) -> bool {
        matches!(self, CameraMode::Free | CameraMode::Game)
    }

    /// The camera integrates its own motion in this mode
    #[inline]
    pub fn is_physics_driven(self) -> bool {
        self != CameraMode::ScriptedPath
    }
}

impl fmt::Display for CameraMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CameraMode::Free => "free",
            CameraMode::Focus => "focus",
            CameraMode::Game => "game",
            CameraMode::ScriptedPath => "scripted_path",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for CameraMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CameraMode::ALL
            .into_iter()
            .find(|mode| mode.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown camera mode: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_predicates() {
        assert!(CameraMode::Focus.uses_focus_object());
        assert!(!CameraMode::Focus.uses_closest_body());
        assert!(CameraMode::Free.uses_closest_body());
        assert!(CameraMode::Game.uses_closest_body());
        assert!(CameraMode::Game.is_game_like());
        assert!(!CameraMode::ScriptedPath.is_physics_driven());
        assert!(!CameraMode::ScriptedPath.uses_closest_body());
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("FOCUS".parse::<CameraMode>(), Ok(CameraMode::Focus));
        assert_eq!("scripted_path".parse::<CameraMode>(), Ok(CameraMode::ScriptedPath));
        assert!("orbit".parse::<CameraMode>().is_err());
    }
}
