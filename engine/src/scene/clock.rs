//! Simulation clock
//!
//! Minimal [`TimeProvider`] with a time-warp factor and an optional validity
//! window for object coordinates.

use super::TimeProvider;

/// Simulation clock advanced once per frame by the application.
#[derive(Clone, Debug)]
pub struct SimulationClock {
    time: f64,
    delta: f64,
    /// Simulation seconds per real second
    pub warp: f64,
    /// Coordinates are only valid while `|time| <= limit`
    pub validity_limit: Option<f64>,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            time: 0.0,
            delta: 0.0,
            warp: 1.0,
            validity_limit: None,
        }
    }
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock with a time-warp factor.
    pub fn with_warp(warp: f64) -> Self {
        Self {
            warp,
            ..Default::default()
        }
    }

    /// Advance by `dt` real seconds. Returns the simulation delta.
    pub fn advance(&mut self, dt: f64) -> f64 {
        self.delta = dt * self.warp;
        self.time += self.delta;
        self.delta
    }

    /// Jump to an absolute simulation time.
    pub fn set_time(&mut self, time: f64) {
        self.delta = 0.0;
        self.time = time;
    }
}

impl TimeProvider for SimulationClock {
    fn sim_time(&self) -> f64 {
        self.time
    }

    fn sim_delta(&self) -> f64 {
        self.delta
    }

    fn coordinate_time_overflow(&self) -> bool {
        self.validity_limit
            .is_some_and(|limit| self.time.abs() > limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_warp() {
        let mut clock = SimulationClock::with_warp(10.0);
        assert_eq!(clock.advance(0.5), 5.0);
        assert_eq!(clock.sim_time(), 5.0);
        assert_eq!(clock.sim_delta(), 5.0);
    }

    #[test]
    fn test_clock_overflow() {
        let mut clock = SimulationClock::new();
        clock.validity_limit = Some(100.0);
        assert!(!clock.coordinate_time_overflow());
        clock.set_time(-101.0);
        assert!(clock.coordinate_time_overflow());
    }
}
