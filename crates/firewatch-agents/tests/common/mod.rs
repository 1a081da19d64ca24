//! Shared fixtures for agent integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use firewatch_agents::prelude::*;
use firewatch_core::clock::SimulationClock;
use firewatch_core::event::{AgentEvent, EventKind, EventSink};
use firewatch_core::node::SensorNode;
use firewatch_core::types::{AgentId, Location, NodeKey, NodeState};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Sink that keeps every event it accepts.
pub struct RecordingSink {
    events: Mutex<Vec<AgentEvent>>,
    optional: bool,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.lock().clone()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: AgentEvent) {
        self.events.lock().push(event);
    }

    fn accepts(&self, kind: EventKind) -> bool {
        kind.is_mandatory() || self.optional
    }
}

/// Minimal orchestrator: issues ids and remembers submitted clones
/// without running them.
pub struct TestHost {
    next_id: AtomicU64,
    gate: watch::Sender<bool>,
    speed: AtomicU32,
    base_cycle: Duration,
    pub sink: RecordingSink,
    submitted: Mutex<Vec<Arc<MobileAgent>>>,
    clock: SimulationClock,
}

impl TestHost {
    pub fn new() -> Arc<Self> {
        Self::with_cycle(Duration::from_millis(20), false)
    }

    pub fn with_cycle(base_cycle: Duration, record_optional: bool) -> Arc<Self> {
        let (gate, _) = watch::channel(true);
        Arc::new(Self {
            next_id: AtomicU64::new(100),
            gate,
            speed: AtomicU32::new(1),
            base_cycle,
            sink: RecordingSink {
                events: Mutex::new(Vec::new()),
                optional: record_optional,
            },
            submitted: Mutex::new(Vec::new()),
            clock: SimulationClock::start(),
        })
    }

    pub fn deactivate(&self) {
        self.gate.send_replace(false);
    }

    pub fn submitted(&self) -> Vec<Arc<MobileAgent>> {
        self.submitted.lock().clone()
    }
}

impl AgentHost for TestHost {
    fn next_agent_id(&self) -> AgentId {
        AgentId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn submit_agent_task(&self, agent: Arc<MobileAgent>) {
        self.submitted.lock().push(agent);
    }

    fn is_simulation_active(&self) -> bool {
        *self.gate.borrow()
    }

    fn activity(&self) -> watch::Receiver<bool> {
        self.gate.subscribe()
    }

    fn speed_factor(&self) -> u32 {
        self.speed.load(Ordering::Relaxed)
    }

    fn base_cycle(&self) -> Duration {
        self.base_cycle
    }

    fn event_sink(&self) -> &dyn EventSink {
        &self.sink
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// Build a linked graph from coordinates and index pairs.
pub fn graph(locations: &[(i32, i32)], edges: &[(usize, usize)]) -> Vec<Arc<SensorNode>> {
    let nodes: Vec<Arc<SensorNode>> = locations
        .iter()
        .enumerate()
        .map(|(i, &loc)| Arc::new(SensorNode::new(NodeKey(i as u32), Location::from(loc))))
        .collect();

    let mut adjacency = vec![Vec::new(); nodes.len()];
    for &(a, b) in edges {
        adjacency[a].push(Arc::downgrade(&nodes[b]));
        adjacency[b].push(Arc::downgrade(&nodes[a]));
    }
    for (node, neighbors) in nodes.iter().zip(adjacency) {
        node.link_neighbors(neighbors).unwrap();
    }
    nodes
}

/// A `width` x `height` 4-connected grid, row-major.
pub fn grid(width: i32, height: i32) -> Vec<Arc<SensorNode>> {
    let mut locations = Vec::new();
    let mut edges = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            locations.push((x, y));
            if x + 1 < width {
                edges.push((idx, idx + 1));
            }
            if y + 1 < height {
                edges.push((idx, idx + width as usize));
            }
        }
    }
    graph(&locations, &edges)
}

/// Put a new agent on `node` and claim it.
pub fn station(id: u64, node: &Arc<SensorNode>) -> Arc<MobileAgent> {
    let agent = MobileAgent::new(AgentId(id), Arc::clone(node));
    assert_eq!(agent.claim_position(), ClaimOutcome::Claimed);
    agent
}

pub fn set_state(node: &SensorNode, state: NodeState) {
    node.escalate(state);
}
