//! AgentHost - what a running agent needs from its orchestrator.
//!
//! Agents never talk to each other. Everything they share goes through the
//! sensor graph or through this trait: id issuance, task submission for
//! clones, the simulation gate, pacing, the event sink and the clock.

use crate::agent::MobileAgent;
use chrono::{DateTime, Utc};
use firewatch_core::event::EventSink;
use firewatch_core::types::AgentId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Default pause between two agent cycles at speed factor 1.
pub const DEFAULT_BASE_CYCLE: Duration = Duration::from_millis(1000);

/// The orchestrator as seen from inside an agent task.
pub trait AgentHost: Send + Sync {
    /// Issue a fresh agent id. Strictly increasing, never reused.
    fn next_agent_id(&self) -> AgentId;

    /// Start `agent` as an independent task and return immediately.
    fn submit_agent_task(&self, agent: Arc<MobileAgent>);

    /// The simulation-wide gate, read once per cycle.
    fn is_simulation_active(&self) -> bool;

    /// Watch channel carrying the simulation gate, so sleeping agents wake
    /// as soon as it flips.
    fn activity(&self) -> watch::Receiver<bool>;

    /// Current speed factor (at least 1).
    fn speed_factor(&self) -> u32;

    /// Pause between cycles at speed factor 1.
    fn base_cycle(&self) -> Duration {
        DEFAULT_BASE_CYCLE
    }

    /// Where agents report lifecycle and movement events.
    fn event_sink(&self) -> &dyn EventSink;

    /// Timestamp for new event records.
    fn now(&self) -> DateTime<Utc>;
}

/// The pause between two cycles: the base interval divided by the speed
/// factor. A zero factor is treated as 1.
pub fn cycle_interval(base: Duration, speed_factor: u32) -> Duration {
    base / speed_factor.max(1)
}
