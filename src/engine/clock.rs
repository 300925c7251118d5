//! Clamped game clock
//!
//! Converts wall-clock readings into per-frame deltas. Each delta is capped
//! at `max_step` so a stalled tab or a debugger pause never produces one
//! huge simulation step.

use crate::platform::TimeSource;

/// Game clock accumulating clamped wall-clock deltas
pub struct Clock {
    source: Box<dyn TimeSource>,
    /// Seconds of game time since the first tick
    game_time: f64,
    last_wall_timestamp: f64,
    max_step: f64,
}

impl Clock {
    /// Create a clock whose reference timestamp is the source's current time,
    /// so the first tick reports a small, bounded delta.
    pub fn new(source: Box<dyn TimeSource>, max_step: f64) -> Self {
        let last_wall_timestamp = source.now_secs();
        Self {
            source,
            game_time: 0.0,
            last_wall_timestamp,
            max_step,
        }
    }

    /// Read the wall clock and return the clamped delta since the last tick
    pub fn tick(&mut self) -> f64 {
        let now = self.source.now_secs();
        self.advance_to(now)
    }

    /// Advance to an explicit wall timestamp (seconds).
    ///
    /// A timestamp earlier than the previous one yields a zero delta; game
    /// time never runs backwards.
    pub fn advance_to(&mut self, now: f64) -> f64 {
        let wall_delta = (now - self.last_wall_timestamp).max(0.0);
        self.last_wall_timestamp = now;

        let delta = wall_delta.min(self.max_step);
        self.game_time += delta;
        delta
    }

    /// Move the reference timestamp to "now" without advancing game time
    pub fn rebase(&mut self) {
        self.last_wall_timestamp = self.source.now_secs();
    }

    pub fn game_time(&self) -> f64 {
        self.game_time
    }

    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    pub fn last_wall_timestamp(&self) -> f64 {
        self.last_wall_timestamp
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("game_time", &self.game_time)
            .field("last_wall_timestamp", &self.last_wall_timestamp)
            .field("max_step", &self.max_step)
            .finish()
    }
}
