//! Point-in-time views of a running simulation.

use firewatch_agents::agent::{AgentStatus, MobileAgent};
use firewatch_core::types::{AgentId, Location};
use serde::Serialize;
use std::fmt;

/// Aggregate counters, computed on demand.
///
/// Values are read without stopping the simulation and may be slightly out
/// of date with respect to each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationStats {
    pub active_agents: usize,
    pub total_agents: usize,
    pub burned_nodes: usize,
    pub near_fire_nodes: usize,
    pub total_nodes: usize,
    pub events_logged: usize,
}

impl fmt::Display for SimulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "agents {}/{} active, burned {}/{}, near fire {}, events {}",
            self.active_agents,
            self.total_agents,
            self.burned_nodes,
            self.total_nodes,
            self.near_fire_nodes,
            self.events_logged
        )
    }
}

/// A serializable snapshot of one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub location: Location,
    pub active: bool,
    pub status: AgentStatus,
}

impl From<&MobileAgent> for AgentSnapshot {
    fn from(agent: &MobileAgent) -> Self {
        Self {
            id: agent.id(),
            location: agent.location(),
            active: agent.is_active(),
            status: agent.status(),
        }
    }
}
