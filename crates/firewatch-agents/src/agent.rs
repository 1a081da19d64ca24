//! MobileAgent - a sensor agent patrolling the graph.
//!
//! Each agent runs as its own task. Every cycle it reads the state of the
//! node it stands on: next to a fire it clones itself onto every free
//! neighbor, anywhere else it tries to move. Then it pauses for
//! `base_cycle / speed_factor` and repeats until it is destroyed or the
//! simulation is switched off. Both conditions are checked at the top of
//! each cycle, so an agent never stops halfway through a critical section.

use crate::cloning::CloneReport;
use crate::host::{cycle_interval, AgentHost};
use crate::movement::MoveOutcome;
use firewatch_core::node::{Occupant, SensorNode};
use firewatch_core::types::{AgentId, Location, NodeState};
use parking_lot::RwLock;
use rand::Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, trace};

/// Lifecycle of an agent task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgentStatus {
    /// Constructed, task not started yet.
    Pending,
    /// Task is cycling.
    Running,
    /// Task has returned. Terminal.
    Terminated,
}

impl AgentStatus {
    fn to_u8(self) -> u8 {
        match self {
            AgentStatus::Pending => 0,
            AgentStatus::Running => 1,
            AgentStatus::Terminated => 2,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => AgentStatus::Pending,
            1 => AgentStatus::Running,
            _ => AgentStatus::Terminated,
        }
    }
}

/// What one cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The agent stood on a `NORMAL` or `ON_FIRE` node and ran the
    /// movement protocol.
    Movement(MoveOutcome),
    /// The agent stood on a `NEAR_FIRE` node and ran the cloning protocol.
    Cloning(CloneReport),
}

/// A mobile sensor agent.
pub struct MobileAgent {
    id: AgentId,
    /// Written only by this agent's own task, and only while it holds the
    /// occupancy locks of both the old and the new node.
    position: RwLock<Arc<SensorNode>>,
    active: AtomicBool,
    status: AtomicU8,
    wake: Notify,
}

impl MobileAgent {
    /// Create an agent whose starting position is `start`.
    ///
    /// The node is not claimed here; see [`MobileAgent::claim_position`].
    pub fn new(id: AgentId, start: Arc<SensorNode>) -> Arc<Self> {
        Arc::new(Self {
            id,
            position: RwLock::new(start),
            active: AtomicBool::new(true),
            status: AtomicU8::new(AgentStatus::Pending.to_u8()),
            wake: Notify::new(),
        })
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    /// The node the agent currently stands on.
    pub fn position(&self) -> Arc<SensorNode> {
        Arc::clone(&self.position.read())
    }

    pub fn location(&self) -> Location {
        self.position.read().location()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn status(&self) -> AgentStatus {
        AgentStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Clear the active flag. The task exits at its next cycle boundary,
    /// or straight away if it is currently pausing.
    ///
    /// Returns `true` for the one call that cleared the flag; callers
    /// record the destruction only then.
    pub fn destroy(&self) -> bool {
        let was_active = self.active.swap(false, Ordering::AcqRel);
        if was_active {
            debug!(agent = %self.id, "agent destroyed");
        }
        self.wake.notify_one();
        was_active
    }

    pub(crate) fn move_to(&self, destination: &Arc<SensorNode>) {
        *self.position.write() = Arc::clone(destination);
    }

    fn set_status(&self, status: AgentStatus) {
        self.status.store(status.to_u8(), Ordering::Release);
    }

    /// Run one decide-act step without pausing.
    pub fn cycle<R: Rng + ?Sized>(
        self: &Arc<Self>,
        host: &dyn AgentHost,
        rng: &mut R,
    ) -> CycleOutcome {
        let position = self.position();
        match position.state() {
            NodeState::NearFire => CycleOutcome::Cloning(self.cloning_protocol(host)),
            NodeState::Normal | NodeState::OnFire => {
                CycleOutcome::Movement(self.movement_protocol(host, rng))
            }
        }
    }

    /// The agent task: cycle and pause until destroyed or the simulation
    /// goes inactive.
    pub async fn run(self: Arc<Self>, host: Arc<dyn AgentHost>) {
        let mut activity = host.activity();
        self.set_status(AgentStatus::Running);
        debug!(agent = %self.id, location = %self.location(), "agent started");

        loop {
            if !self.is_active() || !host.is_simulation_active() {
                break;
            }

            let outcome = {
                let mut rng = rand::thread_rng();
                self.cycle(host.as_ref(), &mut rng)
            };
            trace!(agent = %self.id, ?outcome, "cycle complete");

            let pause = cycle_interval(host.base_cycle(), host.speed_factor());
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = self.wake.notified() => {}
                changed = activity.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.set_status(AgentStatus::Terminated);
        debug!(agent = %self.id, location = %self.location(), "agent terminated");
    }
}

impl Occupant for MobileAgent {
    fn agent_id(&self) -> AgentId {
        self.id
    }

    fn destroy(&self) -> bool {
        MobileAgent::destroy(self)
    }
}

impl std::fmt::Debug for MobileAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MobileAgent")
            .field("id", &self.id)
            .field("location", &self.location())
            .field("active", &self.is_active())
            .field("status", &self.status())
            .finish()
    }
}
