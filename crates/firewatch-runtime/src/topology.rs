//! Sensor network topology.
//!
//! The builder collects locations and edges in a petgraph undirected graph,
//! validates them, then materializes one `SensorNode` per vertex with a
//! permanent `NodeKey` (insertion order) and links every neighbor set
//! exactly once. After `build` the shape of the network never changes;
//! only node fire states and occupancy do.

use firewatch_core::error::{FirewatchError, Result};
use firewatch_core::node::SensorNode;
use firewatch_core::types::{Location, NodeKey, NodeState};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Incremental, validating topology builder.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    graph: UnGraph<Location, ()>,
    index: HashMap<Location, NodeIndex>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sensor node at `location`.
    pub fn add_node(&mut self, location: Location) -> Result<&mut Self> {
        if self.index.contains_key(&location) {
            return Err(FirewatchError::DuplicateLocation(location));
        }
        let idx = self.graph.add_node(location);
        self.index.insert(location, idx);
        Ok(self)
    }

    /// Make `a` and `b` neighbors. Repeating an existing edge is a no-op.
    pub fn connect(&mut self, a: Location, b: Location) -> Result<&mut Self> {
        if a == b {
            return Err(FirewatchError::SelfLoop(a));
        }
        let ia = *self.index.get(&a).ok_or(FirewatchError::UnknownEndpoint(a))?;
        let ib = *self.index.get(&b).ok_or(FirewatchError::UnknownEndpoint(b))?;
        if self.graph.find_edge(ia, ib).is_none() {
            self.graph.add_edge(ia, ib, ());
        }
        Ok(self)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Materialize the sensor nodes and link their neighbor sets.
    pub fn build(&self) -> Result<Topology> {
        if self.graph.node_count() == 0 {
            return Err(FirewatchError::EmptyTopology);
        }

        let nodes: Vec<Arc<SensorNode>> = self
            .graph
            .node_indices()
            .map(|idx| Arc::new(SensorNode::new(NodeKey(idx.index() as u32), self.graph[idx])))
            .collect();

        for idx in self.graph.node_indices() {
            let neighbors = self
                .graph
                .neighbors(idx)
                .map(|n| Arc::downgrade(&nodes[n.index()]))
                .collect();
            nodes[idx.index()].link_neighbors(neighbors)?;
        }

        let components = connected_components(&self.graph);
        if components > 1 {
            warn!(components, "sensor network is not connected");
        }
        debug!(
            nodes = nodes.len(),
            edges = self.graph.edge_count(),
            components,
            "topology built"
        );

        let by_location = nodes
            .iter()
            .map(|node| (node.location(), Arc::clone(node)))
            .collect();

        Ok(Topology {
            nodes,
            by_location,
            edge_count: self.graph.edge_count(),
            components,
        })
    }
}

/// The immutable sensor network shared by agents and the fire engine.
#[derive(Debug)]
pub struct Topology {
    nodes: Vec<Arc<SensorNode>>,
    by_location: HashMap<Location, Arc<SensorNode>>,
    edge_count: usize,
    components: usize,
}

impl Topology {
    /// A `width` x `height` 4-connected grid with corners at (0, 0) and
    /// (width - 1, height - 1). Keys are assigned row by row.
    pub fn grid(width: u32, height: u32) -> Result<Self> {
        let mut builder = TopologyBuilder::new();
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                builder.add_node(Location::new(x, y))?;
            }
        }
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let here = Location::new(x, y);
                if x + 1 < width as i32 {
                    builder.connect(here, Location::new(x + 1, y))?;
                }
                if y + 1 < height as i32 {
                    builder.connect(here, Location::new(x, y + 1))?;
                }
            }
        }
        builder.build()
    }

    pub fn node(&self, location: Location) -> Option<&Arc<SensorNode>> {
        self.by_location.get(&location)
    }

    /// Like [`node`](Self::node) but an unknown location is an error.
    pub fn require(&self, location: Location) -> Result<&Arc<SensorNode>> {
        self.node(location)
            .ok_or(FirewatchError::UnknownLocation(location))
    }

    /// All nodes, ordered by key.
    pub fn nodes(&self) -> &[Arc<SensorNode>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn component_count(&self) -> usize {
        self.components
    }

    pub fn count_in_state(&self, state: NodeState) -> usize {
        self.nodes.iter().filter(|n| n.state() == state).count()
    }
}
