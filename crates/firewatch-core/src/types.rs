//! Shared types used across all firewatch crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a mobile agent.
///
/// Issued by the orchestrator from a monotonic counter. Never reused within
/// a simulation, whether the agent was deployed or cloned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

/// Grid coordinate of a sensor node. This is the graph key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Location {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Permanent sequence number assigned to a node when the topology is built.
///
/// Agents acquire occupancy locks in ascending `NodeKey` order, which gives
/// every pair of nodes the same lock order no matter who is moving where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey(pub u32);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Fire state of a sensor node.
///
/// Ordered by severity so that escalation can be expressed as a max.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum NodeState {
    Normal = 0,
    NearFire = 1,
    OnFire = 2,
}

impl NodeState {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => NodeState::Normal,
            1 => NodeState::NearFire,
            _ => NodeState::OnFire,
        }
    }

    /// Whether an agent may stand on (or be cloned onto) a node in this state.
    pub fn is_habitable(&self) -> bool {
        !matches!(self, NodeState::OnFire)
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeState::Normal => "NORMAL",
            NodeState::NearFire => "NEAR_FIRE",
            NodeState::OnFire => "ON_FIRE",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_state_orders_by_severity() {
        assert!(NodeState::Normal < NodeState::NearFire);
        assert!(NodeState::NearFire < NodeState::OnFire);
        assert_eq!(NodeState::from_u8(NodeState::NearFire as u8), NodeState::NearFire);
    }

    #[test]
    fn node_state_serializes_screaming_case() {
        let json = serde_json::to_string(&NodeState::NearFire).unwrap();
        assert_eq!(json, "\"NEAR_FIRE\"");
    }

    #[test]
    fn location_from_tuple() {
        let loc: Location = (3, -2).into();
        assert_eq!(loc, Location::new(3, -2));
        assert_eq!(loc.to_string(), "(3, -2)");
    }
}
