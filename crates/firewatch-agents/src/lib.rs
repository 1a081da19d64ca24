//! # Firewatch Agents
//!
//! Mobile sensor agents and the two protocols they run over the shared
//! sensor graph:
//!
//! - **Movement** - pick a free neighbor (fire-adjacent first), lock source
//!   and destination in key order without waiting, re-check, hand off.
//! - **Cloning** - next to the fire, claim every free neighbor for a new
//!   agent and submit it as its own task.
//!
//! Agents reach their orchestrator only through the [`AgentHost`] trait.

pub mod agent;
pub mod cloning;
pub mod host;
pub mod movement;
pub mod prelude;

pub use agent::{AgentStatus, CycleOutcome, MobileAgent};
pub use cloning::{ClaimOutcome, CloneReport};
pub use host::{cycle_interval, AgentHost, DEFAULT_BASE_CYCLE};
pub use movement::{select_destination, MoveOutcome};
