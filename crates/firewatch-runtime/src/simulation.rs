//! One-call scenario runner.
//!
//! Builds the topology, deploys the initial agent, lights the fire and lets
//! everything run for a wall-clock duration, reporting progress on a fixed
//! tick. Ends early once no agent is left alive.

use crate::log::AgentLog;
use crate::orchestrator::Orchestrator;
use crate::scenario::Scenario;
use crate::stats::SimulationStats;
use chrono::{DateTime, Utc};
use firewatch_core::error::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Outcome of [`run_scenario`].
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Wall-clock start; every logged timestamp is at or after it.
    pub started_at: DateTime<Utc>,
    pub stats: SimulationStats,
    pub elapsed: Duration,
    pub log: Arc<AgentLog>,
}

/// How often `run_scenario` samples statistics.
pub const PROGRESS_TICK: Duration = Duration::from_millis(100);

/// Run `scenario` for `duration`, calling `on_progress` with the elapsed
/// time and fresh statistics every [`PROGRESS_TICK`].
pub async fn run_scenario<F>(
    scenario: &Scenario,
    duration: Duration,
    mut on_progress: F,
) -> Result<SimulationReport>
where
    F: FnMut(Duration, &SimulationStats),
{
    let topology = scenario.build_topology()?;
    let orchestrator = Orchestrator::new(topology, scenario.simulation.clone())?;
    orchestrator.deploy_agent(scenario.base_station)?;
    orchestrator.start_fire(&scenario.fire_origins, &scenario.fire)?;

    let started = Instant::now();
    let mut ticker = tokio::time::interval(PROGRESS_TICK);
    loop {
        ticker.tick().await;
        let elapsed = started.elapsed();
        let stats = orchestrator.stats();
        on_progress(elapsed.min(duration), &stats);
        if elapsed >= duration {
            break;
        }
        if stats.active_agents == 0 {
            info!("no agents left, ending early");
            break;
        }
    }

    orchestrator.shutdown().await;
    Ok(SimulationReport {
        started_at: orchestrator.started_at(),
        stats: orchestrator.stats(),
        elapsed: started.elapsed(),
        log: Arc::clone(orchestrator.log()),
    })
}
