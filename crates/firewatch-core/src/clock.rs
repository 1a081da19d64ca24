//! Monotonic simulation clock.
//!
//! Event timestamps are the wall-clock start of the simulation plus the
//! monotonic time elapsed since, so they never run backwards even if the
//! system clock is adjusted mid-run.

use chrono::{DateTime, Duration, Utc};
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct SimulationClock {
    started_at: DateTime<Utc>,
    origin: Instant,
}

impl SimulationClock {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            origin: Instant::now(),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn now(&self) -> DateTime<Utc> {
        let elapsed = Duration::from_std(self.origin.elapsed()).unwrap_or(Duration::zero());
        self.started_at + elapsed
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::start()
    }
}
