//! Fire-spread engine.
//!
//! The engine is the only writer of node fire states. Each step every
//! burning node ignites each of its non-burning neighbors with a fixed
//! probability; igniting a node also marks its `NORMAL` neighbors
//! `NEAR_FIRE`. States only ever escalate.
//!
//! An agent caught on a node that catches fire is destroyed. Eviction needs
//! the node's occupancy lock; the engine only ever tries it, so a node whose
//! lock is busy (typically its occupant escaping right now) is queued and
//! retried after a yield.

use crate::config::FireConfig;
use crate::topology::Topology;
use chrono::{DateTime, Utc};
use firewatch_core::event::{AgentEvent, EventKind, EventSink};
use firewatch_core::node::SensorNode;
use firewatch_core::types::{AgentId, Location, NodeState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What one spread step changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpreadReport {
    pub ignited: Vec<Location>,
    pub casualties: Vec<AgentId>,
}

impl SpreadReport {
    pub fn is_quiet(&self) -> bool {
        self.ignited.is_empty() && self.casualties.is_empty()
    }
}

pub struct FireSpread {
    topology: Arc<Topology>,
    ignition_probability: f64,
    rng: StdRng,
    /// Burning nodes whose occupant has not been dealt with yet.
    unchecked: Vec<Arc<SensorNode>>,
}

impl FireSpread {
    pub fn new(topology: Arc<Topology>, config: &FireConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            topology,
            ignition_probability: config.ignition_probability,
            rng,
            unchecked: Vec::new(),
        }
    }

    /// Set `node` on fire. Returns `false` if it was already burning.
    pub fn ignite(&mut self, node: &Arc<SensorNode>) -> bool {
        if !node.escalate(NodeState::OnFire) {
            return false;
        }
        for neighbor in node.neighbors() {
            neighbor.escalate(NodeState::NearFire);
        }
        info!(location = %node.location(), "node ignited");
        self.unchecked.push(Arc::clone(node));
        true
    }

    /// Advance the fire by one step and evict whatever occupants can be
    /// reached without waiting.
    pub fn step(&mut self, sink: &dyn EventSink, now: DateTime<Utc>) -> SpreadReport {
        let burning: Vec<Arc<SensorNode>> = self
            .topology
            .nodes()
            .iter()
            .filter(|n| n.state() == NodeState::OnFire)
            .cloned()
            .collect();

        let mut report = SpreadReport::default();
        for node in &burning {
            for neighbor in node.neighbors() {
                if neighbor.state() == NodeState::OnFire {
                    continue;
                }
                if self.rng.gen_bool(self.ignition_probability) && self.ignite(&neighbor) {
                    report.ignited.push(neighbor.location());
                }
            }
        }
        report.casualties = self.sweep(sink, now);
        report
    }

    /// Try once to evict the occupant of every queued burning node.
    ///
    /// Nodes whose lock is busy stay queued.
    pub fn sweep(&mut self, sink: &dyn EventSink, now: DateTime<Utc>) -> Vec<AgentId> {
        let mut casualties = Vec::new();
        self.unchecked.retain(|node| {
            let Some(mut guard) = node.try_occupancy() else {
                debug!(location = %node.location(), "eviction deferred, node busy");
                return true;
            };
            let occupant = guard.occupant();
            let Some(id) = guard.clear_occupant() else {
                return false;
            };
            // An occupant already destroyed elsewhere has had its record.
            if occupant.map_or(false, |agent| agent.destroy()) {
                sink.record(AgentEvent::new(
                    now,
                    id,
                    node.location(),
                    EventKind::Destroyed,
                    "consumed by fire",
                ));
                warn!(agent = %id, location = %node.location(), "agent lost to fire");
                casualties.push(id);
            }
            false
        });
        casualties
    }

    /// Burning nodes still waiting for eviction.
    pub fn pending_evictions(&self) -> usize {
        self.unchecked.len()
    }

    /// True once no further step can change anything: every burning node's
    /// neighbors are burning too and no eviction is pending.
    pub fn is_exhausted(&self) -> bool {
        self.unchecked.is_empty()
            && self
                .topology
                .nodes()
                .iter()
                .filter(|n| n.state() == NodeState::OnFire)
                .all(|n| n.neighbors().iter().all(|m| m.state() == NodeState::OnFire))
    }

    pub fn burned(&self) -> usize {
        self.topology.count_in_state(NodeState::OnFire)
    }
}
