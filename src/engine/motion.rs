//! Drift velocity and spawn cadence.
//!
//! Plain state containers. The interpreter is the only writer; the frame step
//! only reads them.

use serde::{Deserialize, Serialize};

/// Per-frame displacement shared by every shape. Unbounded in both axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Velocity {
    pub dx: i64,
    pub dy: i64,
}

impl Velocity {
    pub fn new(dx: i64, dy: i64) -> Self {
        Self { dx, dy }
    }
}

/// Delay between spawns.
///
/// Stored in whole milliseconds so repeated steps do not accumulate
/// floating point drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    delay_ms: u64,
    step_ms: u64,
    floor_ms: u64,
}

impl Cadence {
    pub fn new(delay_seconds: f64, step_seconds: f64, floor_seconds: f64) -> Self {
        let floor_ms = to_millis(floor_seconds);
        Self {
            delay_ms: to_millis(delay_seconds).max(floor_ms),
            step_ms: to_millis(step_seconds),
            floor_ms,
        }
    }

    pub fn delay_seconds(&self) -> f64 {
        self.delay_ms as f64 / 1000.0
    }

    pub fn floor_seconds(&self) -> f64 {
        self.floor_ms as f64 / 1000.0
    }

    pub fn increase(&mut self) {
        self.delay_ms = self.delay_ms.saturating_add(self.step_ms);
    }

    /// Shorten the delay by one step. No-op if that would go below the floor.
    pub fn decrease(&mut self) -> bool {
        match self.delay_ms.checked_sub(self.step_ms) {
            Some(next) if next >= self.floor_ms && next != self.delay_ms => {
                self.delay_ms = next;
                true
            }
            _ => false,
        }
    }

    /// Number of accepted frames between spawns, never less than one.
    pub fn frames_per_spawn(&self, frame_period_seconds: f64) -> u64 {
        // Small bias so 0.3 / 0.1 lands on 3 rather than 2.999...
        let ratio = self.delay_seconds() / frame_period_seconds + 1e-9;
        if ratio.is_finite() && ratio >= 1.0 {
            ratio.floor() as u64
        } else {
            1
        }
    }
}

fn to_millis(seconds: f64) -> u64 {
    (seconds * 1000.0).round().max(0.0) as u64
}
