//! Simulation and fire-spread configuration.
//!
//! Both structs deserialize from partial tables: any missing field takes
//! its default, so a scenario file only needs to name what it changes.

use firewatch_core::error::{FirewatchError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Pacing and logging parameters for agent tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Divides the pause between agent cycles (default: 1).
    pub speed_factor: u32,
    /// Pause between agent cycles at speed factor 1, in milliseconds (default: 1000).
    pub base_cycle_ms: u64,
    /// Record successful moves in the agent log (default: false).
    pub record_moves: bool,
    /// Record aborted move attempts in the agent log (default: false).
    pub record_aborts: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed_factor: 1,
            base_cycle_ms: 1000,
            record_moves: false,
            record_aborts: false,
        }
    }
}

impl SimulationConfig {
    pub fn base_cycle(&self) -> Duration {
        Duration::from_millis(self.base_cycle_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.speed_factor == 0 {
            return Err(FirewatchError::InvalidSpeedFactor(0));
        }
        if self.base_cycle_ms == 0 {
            return Err(FirewatchError::config("base_cycle_ms must be positive"));
        }
        Ok(())
    }
}

/// Parameters of the fire-spread engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireConfig {
    /// Time between two spread steps, in milliseconds (default: 3000).
    pub spread_interval_ms: u64,
    /// Chance that a burning node ignites a given neighbor per step (default: 0.5).
    pub ignition_probability: f64,
    /// RNG seed; a fresh one is drawn when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            spread_interval_ms: 3000,
            ignition_probability: 0.5,
            seed: None,
        }
    }
}

impl FireConfig {
    pub fn spread_interval(&self) -> Duration {
        Duration::from_millis(self.spread_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.spread_interval_ms == 0 {
            return Err(FirewatchError::config("spread_interval_ms must be positive"));
        }
        if !(0.0..=1.0).contains(&self.ignition_probability) {
            return Err(FirewatchError::config(format!(
                "ignition_probability must be within [0, 1], got {}",
                self.ignition_probability
            )));
        }
        Ok(())
    }
}
