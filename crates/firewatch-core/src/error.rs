//! Error types for firewatch operations.
//!
//! Lock contention, lost occupancy claims and stale move decisions are not
//! errors; the agent protocols report those as outcome values. Everything
//! here is a genuine misuse or an external failure.

use crate::types::{AgentId, Location, NodeKey};
use thiserror::Error;

/// Result type for firewatch operations.
pub type Result<T> = std::result::Result<T, FirewatchError>;

/// Errors that can occur in firewatch operations.
#[derive(Error, Debug, Clone)]
pub enum FirewatchError {
    #[error("No sensor node at {0}")]
    UnknownLocation(Location),

    #[error("Sensor node at {0} is already occupied")]
    LocationOccupied(Location),

    #[error("Sensor node at {0} is on fire")]
    LocationOnFire(Location),

    #[error("Duplicate sensor node at {0}")]
    DuplicateLocation(Location),

    #[error("Edge endpoint {0} is not a sensor node")]
    UnknownEndpoint(Location),

    #[error("Sensor node at {0} cannot neighbor itself")]
    SelfLoop(Location),

    #[error("Neighbors of {0} were already linked")]
    NeighborsAlreadyLinked(NodeKey),

    #[error("Topology has no sensor nodes")]
    EmptyTopology,

    #[error("Invalid speed factor {0} (must be at least 1)")]
    InvalidSpeedFactor(u32),

    #[error("Agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("Simulation is not active")]
    SimulationInactive,

    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for FirewatchError {
    fn from(e: std::io::Error) -> Self {
        FirewatchError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for FirewatchError {
    fn from(e: serde_json::Error) -> Self {
        FirewatchError::Serialization(e.to_string())
    }
}

impl FirewatchError {
    pub fn config(msg: impl Into<String>) -> Self {
        FirewatchError::Config(msg.into())
    }
}
