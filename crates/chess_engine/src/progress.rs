//! Time-stepped progression plans for transits and cooldowns.
//!
//! A [`Progression`] is the pure description of one cancelable process: a
//! fixed step period and a per-step ratio delta. [`Progression::ratios`]
//! yields the strictly increasing ratio sequence, ending exactly at 1.0.
//! The async driver that actually sleeps between steps, feeds ticks back
//! to a board, and honors cancellation lives in the server crate; keeping
//! the math here lets the whole move pipeline run synchronously in tests.

use std::time::Duration;

use crate::constants::{COOLDOWN_SPEED, COOLDOWN_TICK_MS, PIECE_SPEED, TRANSIT_TICK_MS};
use crate::square::Square;

/// Duration policy for one transit or cooldown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progression {
    delta: f32,
    period: Duration,
}

impl Progression {
    /// Transit plan: duration proportional to Chebyshev distance, so a
    /// diagonal move covers each axis as fast as a straight one.
    pub fn transit(from: Square, to: Square) -> Self {
        let len = from.chebyshev(to).max(1);
        Progression {
            delta: PIECE_SPEED / len as f32,
            period: Duration::from_millis(TRANSIT_TICK_MS),
        }
    }

    /// Cooldown plan: fixed length regardless of the move that caused it.
    pub fn cooldown() -> Self {
        Progression {
            delta: COOLDOWN_SPEED,
            period: Duration::from_millis(COOLDOWN_TICK_MS),
        }
    }

    /// Time to sleep between steps.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// The ratio after each step: strictly increasing, last value exactly 1.0.
    pub fn ratios(&self) -> Ratios {
        Ratios {
            delta: self.delta,
            current: 0.0,
            done: false,
        }
    }
}

/// Iterator over a progression's step ratios.
#[derive(Debug, Clone)]
pub struct Ratios {
    delta: f32,
    current: f32,
    done: bool,
}

impl Iterator for Ratios {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.done {
            return None;
        }
        self.current = (self.current + self.delta).min(1.0);
        if self.current >= 1.0 {
            self.done = true;
            Some(1.0)
        } else {
            Some(self.current)
        }
    }
}
