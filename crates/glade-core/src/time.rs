//! Time keeping for the Glade engine
//!
//! Converts variable real-time frame deltas into a deterministic sequence of
//! fixed simulation steps, plus the interpolation factor renderers use to
//! blend between the last two simulated states.

use serde::{Deserialize, Serialize};

/// Configuration for simulation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// How many in-game seconds pass per real second
    pub time_scale: f32,
    /// Fixed timestep for simulation (in seconds)
    pub fixed_timestep: f32,
    /// Maximum delta time to prevent spiral of death
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 60.0,
            max_delta_time: 0.25,
        }
    }
}

/// Errors from invalid time configuration values.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TimeConfigError {
    #[error("fixed_timestep must be positive, got {0}")]
    NonPositiveTimestep(f32),

    #[error("max_delta_time must be at least one fixed_timestep ({timestep}), got {max_delta}")]
    MaxDeltaTooSmall { timestep: f32, max_delta: f32 },
}

impl TimeConfig {
    /// Check the configuration for values that would stall or break the loop.
    pub fn validate(&self) -> Result<(), TimeConfigError> {
        if self.fixed_timestep <= 0.0 {
            return Err(TimeConfigError::NonPositiveTimestep(self.fixed_timestep));
        }
        if self.max_delta_time < self.fixed_timestep {
            return Err(TimeConfigError::MaxDeltaTooSmall {
                timestep: self.fixed_timestep,
                max_delta: self.max_delta_time,
            });
        }
        Ok(())
    }
}

/// Game time tracking. Feed it raw frame deltas via [`GameTime::update`],
/// then drain fixed steps with [`GameTime::consume_fixed_step`].
#[derive(Debug, Clone)]
pub struct GameTime {
    /// Configuration
    pub config: TimeConfig,
    /// Time since start in seconds (scaled)
    pub total_time: f64,
    /// Delta time for this frame (clamped and scaled)
    pub delta_time: f32,
    /// Unscaled delta time (still clamped)
    pub unscaled_delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
    /// Accumulated time waiting to be consumed as fixed steps
    fixed_accumulator: f32,
    paused: bool,
    step_requested: bool,
}

impl Default for GameTime {
    fn default() -> Self {
        Self::new(TimeConfig::default())
    }
}

impl GameTime {
    /// Create a new game time with the given config.
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            total_time: 0.0,
            delta_time: 0.0,
            unscaled_delta_time: 0.0,
            frame_count: 0,
            fixed_accumulator: 0.0,
            paused: false,
            step_requested: false,
        }
    }

    /// Update with the raw delta from the previous frame. The delta is
    /// clamped to `max_delta_time` before it reaches the accumulator, so a
    /// hitch cannot trigger an unbounded catch-up burst.
    pub fn update(&mut self, raw_delta: f32) {
        self.unscaled_delta_time = raw_delta.min(self.config.max_delta_time);
        self.frame_count += 1;

        if self.paused {
            self.delta_time = 0.0;
            return;
        }

        self.delta_time = self.unscaled_delta_time * self.config.time_scale;
        self.total_time += self.delta_time as f64;
        self.fixed_accumulator += self.delta_time;
    }

    /// Should another fixed step run now? Each `true` drains one timestep
    /// from the accumulator. While paused, returns `true` exactly once per
    /// [`GameTime::step_once`] request.
    pub fn consume_fixed_step(&mut self) -> bool {
        if !self.paused {
            if self.fixed_accumulator >= self.config.fixed_timestep {
                self.fixed_accumulator -= self.config.fixed_timestep;
                return true;
            }
            return false;
        }

        if self.step_requested {
            self.step_requested = false;
            return true;
        }
        false
    }

    /// Render interpolation factor in `[0, 1]`: how far between the last
    /// fixed step and the next one we currently are.
    pub fn interpolation(&self) -> f32 {
        if self.paused {
            return 1.0;
        }
        if self.config.fixed_timestep <= 0.0 {
            return 0.0;
        }
        (self.fixed_accumulator / self.config.fixed_timestep).clamp(0.0, 1.0)
    }

    /// The fixed timestep in seconds.
    pub fn fixed_delta(&self) -> f32 {
        self.config.fixed_timestep
    }

    /// Current fixed-step accumulator value, mainly for diagnostics.
    pub fn accumulator(&self) -> f32 {
        self.fixed_accumulator
    }

    /// Pause or resume simulation time.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// While paused, request a single fixed step on the next
    /// [`GameTime::consume_fixed_step`] call.
    pub fn step_once(&mut self) {
        self.step_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_clamped() {
        let mut time = GameTime::default();
        time.update(10.0);
        assert_eq!(time.unscaled_delta_time, time.config.max_delta_time);
    }

    #[test]
    fn fixed_steps_drain_accumulator() {
        let mut time = GameTime::default();
        let step = time.fixed_delta();

        // Three and a half steps worth of time.
        time.update(step * 3.5);

        let mut steps = 0;
        while time.consume_fixed_step() {
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert!((time.accumulator() - step * 0.5).abs() < 1e-6);
    }

    #[test]
    fn interpolation_in_unit_range() {
        let mut time = GameTime::default();
        time.update(time.fixed_delta() * 0.25);
        let alpha = time.interpolation();
        assert!((0.0..=1.0).contains(&alpha));
        assert!((alpha - 0.25).abs() < 1e-4);
    }

    #[test]
    fn paused_time_does_not_accumulate() {
        let mut time = GameTime::default();
        time.set_paused(true);
        time.update(1.0);
        assert_eq!(time.delta_time, 0.0);
        assert!(!time.consume_fixed_step());
    }

    #[test]
    fn single_step_while_paused() {
        let mut time = GameTime::default();
        time.set_paused(true);
        time.step_once();
        assert!(time.consume_fixed_step());
        assert!(!time.consume_fixed_step());
    }

    #[test]
    fn config_validation() {
        assert!(TimeConfig::default().validate().is_ok());

        let bad = TimeConfig {
            fixed_timestep: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let tiny_clamp = TimeConfig {
            max_delta_time: 0.001,
            ..Default::default()
        };
        assert!(tiny_clamp.validate().is_err());
    }
}
