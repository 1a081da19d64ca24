//! Scenario description: network shape, where the first agent lands, and
//! where the fire starts.
//!
//! Scenarios are plain serde data. The CLI reads them from TOML; tests
//! build them in code.

use crate::config::{FireConfig, SimulationConfig};
use crate::topology::{Topology, TopologyBuilder};
use firewatch_core::error::{FirewatchError, Result};
use firewatch_core::types::Location;
use serde::{Deserialize, Serialize};

/// Shape of the sensor network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologySpec {
    /// A 4-connected rectangular grid.
    Grid { width: u32, height: u32 },
    /// Hand-listed nodes and undirected edges.
    Explicit {
        nodes: Vec<Location>,
        #[serde(default)]
        edges: Vec<(Location, Location)>,
    },
}

impl TopologySpec {
    pub fn build(&self) -> Result<Topology> {
        match self {
            TopologySpec::Grid { width, height } => Topology::grid(*width, *height),
            TopologySpec::Explicit { nodes, edges } => {
                let mut builder = TopologyBuilder::new();
                for &node in nodes {
                    builder.add_node(node)?;
                }
                for &(a, b) in edges {
                    builder.connect(a, b)?;
                }
                builder.build()
            }
        }
    }
}

/// A complete, runnable simulation setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub fire: FireConfig,
    pub topology: TopologySpec,
    /// Where the initial agent is deployed.
    pub base_station: Location,
    /// Nodes set on fire when the simulation starts.
    pub fire_origins: Vec<Location>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            fire: FireConfig::default(),
            topology: TopologySpec::Grid {
                width: 10,
                height: 10,
            },
            base_station: Location::new(0, 0),
            fire_origins: vec![Location::new(7, 7)],
        }
    }
}

impl Scenario {
    /// Check the configuration tables and build the topology, verifying the
    /// base station and fire origins are nodes of it.
    pub fn build_topology(&self) -> Result<Topology> {
        self.simulation.validate()?;
        self.fire.validate()?;

        let topology = self.topology.build()?;
        topology.require(self.base_station)?;
        if self.fire_origins.is_empty() {
            return Err(FirewatchError::config("at least one fire origin is required"));
        }
        for &origin in &self.fire_origins {
            topology.require(origin)?;
            if origin == self.base_station {
                return Err(FirewatchError::LocationOnFire(origin));
            }
        }
        Ok(topology)
    }
}
