//! Orchestrator - agent population, id issuance and task scheduling.
//!
//! The orchestrator owns the simulation gate, the speed factor, the event
//! log and the registry of every agent ever created. Agent tasks and the
//! fire-spread task run on a tokio runtime; the orchestrator keeps their
//! join handles so that `shutdown` can drain them after flipping the gate.
//!
//! Nothing here ever waits on an agent: stopping is a flag flip, and tasks
//! observe it at their next cycle boundary (or immediately if pausing).

use crate::config::{FireConfig, SimulationConfig};
use crate::fire::FireSpread;
use crate::log::AgentLog;
use crate::stats::{AgentSnapshot, SimulationStats};
use crate::topology::Topology;
use chrono::{DateTime, Utc};
use firewatch_agents::agent::{AgentStatus, MobileAgent};
use firewatch_agents::cloning::ClaimOutcome;
use firewatch_agents::host::AgentHost;
use firewatch_core::clock::SimulationClock;
use firewatch_core::error::{FirewatchError, Result};
use firewatch_core::event::{AgentEvent, EventKind, EventSink};
use firewatch_core::types::{AgentId, Location, NodeState};
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Reason recorded for the initial agent.
pub const DEPLOY_REASON: &str = "deployed at base station";

/// Handle to a running simulation. Cheap to clone; all clones share state.
///
/// Dropping the last handle stops the simulation as [`Orchestrator::stop`]
/// does. Agent tasks do not count as handles.
#[derive(Clone)]
pub struct Orchestrator {
    host: TaskHost,
    _lifeline: Arc<Lifeline>,
}

/// What agent tasks see of the orchestrator.
#[derive(Clone)]
struct TaskHost {
    inner: Arc<Inner>,
}

/// Shared by every `Orchestrator` handle; flips the gate when the last
/// one goes away.
struct Lifeline {
    inner: Arc<Inner>,
}

impl Drop for Lifeline {
    fn drop(&mut self) {
        if self.inner.gate.send_replace(false) {
            info!("last orchestrator handle dropped, simulation stopping");
        }
    }
}

struct Inner {
    runtime: Handle,
    topology: Arc<Topology>,
    base_cycle: Duration,
    speed_factor: AtomicU32,
    next_id: AtomicU64,
    gate: watch::Sender<bool>,
    log: Arc<AgentLog>,
    clock: SimulationClock,
    agents: RwLock<BTreeMap<AgentId, Arc<MobileAgent>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Inner {
    fn track(&self, task: JoinHandle<()>) {
        let mut tasks = self.tasks.lock();
        tasks.retain(|t| !t.is_finished());
        tasks.push(task);
    }
}

impl Orchestrator {
    /// Create an orchestrator on the current tokio runtime.
    pub fn new(topology: Topology, config: SimulationConfig) -> Result<Self> {
        let runtime =
            Handle::try_current().map_err(|e| FirewatchError::NoRuntime(e.to_string()))?;
        Self::with_handle(topology, config, runtime)
    }

    /// Create an orchestrator that spawns its tasks on `runtime`.
    pub fn with_handle(
        topology: Topology,
        config: SimulationConfig,
        runtime: Handle,
    ) -> Result<Self> {
        config.validate()?;
        let (gate, _) = watch::channel(true);
        info!(
            nodes = topology.len(),
            speed_factor = config.speed_factor,
            base_cycle_ms = config.base_cycle_ms,
            "simulation created"
        );
        let inner = Arc::new(Inner {
            runtime,
            topology: Arc::new(topology),
            base_cycle: config.base_cycle(),
            speed_factor: AtomicU32::new(config.speed_factor),
            next_id: AtomicU64::new(1),
            gate,
            log: Arc::new(AgentLog::from_config(&config)),
            clock: SimulationClock::start(),
            agents: RwLock::new(BTreeMap::new()),
            tasks: Mutex::new(Vec::new()),
        });
        Ok(Self {
            host: TaskHost {
                inner: Arc::clone(&inner),
            },
            _lifeline: Arc::new(Lifeline { inner }),
        })
    }

    pub fn topology(&self) -> &Arc<Topology> {
        &self.inner().topology
    }

    pub fn log(&self) -> &Arc<AgentLog> {
        &self.inner().log
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner().clock.started_at()
    }

    /// Place the initial agent at `location` and start its task.
    pub fn deploy_agent(&self, location: Location) -> Result<AgentId> {
        if !self.is_simulation_active() {
            return Err(FirewatchError::SimulationInactive);
        }
        let node = Arc::clone(self.inner().topology.require(location)?);
        let agent = MobileAgent::new(self.next_agent_id(), node);
        match agent.claim_position() {
            ClaimOutcome::Claimed => {}
            ClaimOutcome::OnFire => return Err(FirewatchError::LocationOnFire(location)),
            ClaimOutcome::Occupied | ClaimOutcome::Contended => {
                return Err(FirewatchError::LocationOccupied(location))
            }
        }

        let id = agent.id();
        self.inner().log.record(AgentEvent::new(
            self.now(),
            id,
            location,
            EventKind::Created,
            DEPLOY_REASON,
        ));
        info!(agent = %id, %location, "agent deployed");
        self.submit_agent_task(agent);
        Ok(id)
    }

    /// Clear an agent's active flag.
    ///
    /// The agent stops at its next cycle boundary and leaves its node
    /// recorded as occupied; it performs no further mutation.
    pub fn destroy_agent(&self, id: AgentId) -> Result<()> {
        let agent = self
            .inner()
            .agents
            .read()
            .get(&id)
            .cloned()
            .ok_or(FirewatchError::AgentNotFound(id))?;
        if agent.destroy() {
            self.inner().log.record(AgentEvent::new(
                self.now(),
                id,
                agent.location(),
                EventKind::Destroyed,
                "destroyed on request",
            ));
        }
        Ok(())
    }

    /// Change the pause divisor. Applies from each agent's next pause.
    pub fn set_speed_factor(&self, factor: u32) -> Result<()> {
        if factor == 0 {
            return Err(FirewatchError::InvalidSpeedFactor(factor));
        }
        let previous = self.inner().speed_factor.swap(factor, Ordering::Relaxed);
        info!(from = previous, to = factor, "speed factor changed");
        Ok(())
    }

    /// Set fire to `origins` and start the spread task.
    pub fn start_fire(&self, origins: &[Location], config: &FireConfig) -> Result<()> {
        config.validate()?;
        if !self.is_simulation_active() {
            return Err(FirewatchError::SimulationInactive);
        }
        let nodes = origins
            .iter()
            .map(|&location| self.inner().topology.require(location).cloned())
            .collect::<Result<Vec<_>>>()?;

        let mut fire = FireSpread::new(Arc::clone(&self.inner().topology), config);
        for node in &nodes {
            fire.ignite(node);
        }
        fire.sweep(&*self.inner().log, self.now());

        let task = self.inner().runtime.spawn(spread_fire(
            fire,
            Arc::clone(&self.inner().log),
            self.inner().clock,
            self.inner().gate.subscribe(),
            config.spread_interval(),
        ));
        self.inner().track(task);
        Ok(())
    }

    /// Flip the simulation gate. Returns immediately.
    pub fn stop(&self) {
        if self.inner().gate.send_replace(false) {
            info!("simulation stopping");
        }
    }

    /// Stop, then wait for every agent task and the fire task to finish.
    pub async fn shutdown(&self) {
        self.stop();
        loop {
            // Clones submitted while draining land in a fresh batch.
            let batch = std::mem::take(&mut *self.inner().tasks.lock());
            if batch.is_empty() {
                break;
            }
            for result in join_all(batch).await {
                if let Err(e) = result {
                    warn!(error = %e, "task ended abnormally");
                }
            }
        }
        info!(stats = %self.stats(), "simulation shut down");
    }

    /// Agents not yet destroyed whose task has not terminated.
    pub fn active_agent_count(&self) -> usize {
        self.inner()
            .agents
            .read()
            .values()
            .filter(|a| a.is_active() && a.status() != AgentStatus::Terminated)
            .count()
    }

    pub fn burned_node_count(&self) -> usize {
        self.inner().topology.count_in_state(NodeState::OnFire)
    }

    pub fn stats(&self) -> SimulationStats {
        SimulationStats {
            active_agents: self.active_agent_count(),
            total_agents: self.inner().agents.read().len(),
            burned_nodes: self.burned_node_count(),
            near_fire_nodes: self.inner().topology.count_in_state(NodeState::NearFire),
            total_nodes: self.inner().topology.len(),
            events_logged: self.inner().log.len(),
        }
    }

    pub fn agent(&self, id: AgentId) -> Option<AgentSnapshot> {
        self.inner()
            .agents
            .read()
            .get(&id)
            .map(|agent| AgentSnapshot::from(&**agent))
    }

    /// Every agent ever created, ordered by id.
    pub fn agents(&self) -> Vec<AgentSnapshot> {
        self.inner()
            .agents
            .read()
            .values()
            .map(|agent| AgentSnapshot::from(&**agent))
            .collect()
    }

    fn inner(&self) -> &Inner {
        &self.host.inner
    }
}

impl AgentHost for Orchestrator {
    fn next_agent_id(&self) -> AgentId {
        self.host.next_agent_id()
    }

    fn submit_agent_task(&self, agent: Arc<MobileAgent>) {
        self.host.submit_agent_task(agent)
    }

    fn is_simulation_active(&self) -> bool {
        self.host.is_simulation_active()
    }

    fn activity(&self) -> watch::Receiver<bool> {
        self.host.activity()
    }

    fn speed_factor(&self) -> u32 {
        self.host.speed_factor()
    }

    fn base_cycle(&self) -> Duration {
        self.host.base_cycle()
    }

    fn event_sink(&self) -> &dyn EventSink {
        self.host.event_sink()
    }

    fn now(&self) -> DateTime<Utc> {
        self.host.now()
    }
}

impl AgentHost for TaskHost {
    fn next_agent_id(&self) -> AgentId {
        AgentId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn submit_agent_task(&self, agent: Arc<MobileAgent>) {
        debug!(agent = %agent.id(), "agent submitted");
        self.inner
            .agents
            .write()
            .insert(agent.id(), Arc::clone(&agent));
        let host: Arc<dyn AgentHost> = Arc::new(self.clone());
        let task = self.inner.runtime.spawn(agent.run(host));
        self.inner.track(task);
    }

    fn is_simulation_active(&self) -> bool {
        *self.inner.gate.borrow()
    }

    fn activity(&self) -> watch::Receiver<bool> {
        self.inner.gate.subscribe()
    }

    fn speed_factor(&self) -> u32 {
        self.inner.speed_factor.load(Ordering::Relaxed)
    }

    fn base_cycle(&self) -> Duration {
        self.inner.base_cycle
    }

    fn event_sink(&self) -> &dyn EventSink {
        &*self.inner.log
    }

    fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("active", &self.is_simulation_active())
            .field("speed_factor", &self.speed_factor())
            .field("stats", &self.stats())
            .finish()
    }
}

/// The fire task: step on a fixed interval until the fire can no longer
/// change anything or the simulation stops.
async fn spread_fire(
    mut fire: FireSpread,
    log: Arc<AgentLog>,
    clock: SimulationClock,
    mut activity: watch::Receiver<bool>,
    interval: Duration,
) {
    info!(interval_ms = interval.as_millis() as u64, "fire spread started");
    loop {
        while fire.pending_evictions() > 0 {
            let active = *activity.borrow();
            if !active {
                break;
            }
            fire.sweep(&*log, clock.now());
            if fire.pending_evictions() > 0 {
                tokio::task::yield_now().await;
            }
        }
        if fire.is_exhausted() {
            info!(burned = fire.burned(), "fire burned out");
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = activity.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        let active = *activity.borrow();
        if !active {
            break;
        }

        let report = fire.step(&*log, clock.now());
        debug!(
            ignited = report.ignited.len(),
            casualties = report.casualties.len(),
            burned = fire.burned(),
            "fire step"
        );
    }
    debug!("fire spread stopped");
}
