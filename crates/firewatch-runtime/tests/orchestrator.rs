//! Orchestrator behavior on a live tokio runtime.

use firewatch_runtime::prelude::*;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};

fn fast(base_cycle_ms: u64) -> SimulationConfig {
    SimulationConfig {
        base_cycle_ms,
        ..Default::default()
    }
}

/// Poll `check` until it holds or `limit` passes.
async fn eventually(limit: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        sleep(Duration::from_millis(10)).await;
    }
    check()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_during_pause_ends_agents_without_side_effects() {
    let orchestrator = Orchestrator::new(Topology::grid(3, 3).unwrap(), fast(60_000)).unwrap();
    let id = orchestrator.deploy_agent(Location::new(1, 1)).unwrap();

    assert!(
        eventually(Duration::from_secs(2), || {
            orchestrator.agent(id).map(|a| a.status) == Some(AgentStatus::Running)
        })
        .await
    );
    // Let the first cycle finish; the agent is then in its long pause.
    sleep(Duration::from_millis(100)).await;
    let before = orchestrator.agent(id).unwrap().location;
    let events_before = orchestrator.log().len();

    timeout(Duration::from_secs(2), orchestrator.shutdown())
        .await
        .expect("shutdown did not drain");

    let after = orchestrator.agent(id).unwrap();
    assert_eq!(after.status, AgentStatus::Terminated);
    assert_eq!(after.location, before);
    assert_eq!(orchestrator.log().len(), events_before);
    assert!(orchestrator.topology().node(before).unwrap().has_agent());
    assert_eq!(orchestrator.active_agent_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cloning_fills_a_fire_ringed_grid_with_unique_ids() {
    let topology = Topology::grid(5, 5).unwrap();
    for node in topology.nodes() {
        node.escalate(NodeState::NearFire);
    }
    let orchestrator = Orchestrator::new(topology, fast(5)).unwrap();
    orchestrator.deploy_agent(Location::new(2, 2)).unwrap();

    assert!(
        eventually(Duration::from_secs(3), || orchestrator.stats().total_agents == 25).await,
        "grid never filled: {}",
        orchestrator.stats()
    );
    orchestrator.shutdown().await;

    let agents = orchestrator.agents();
    assert_eq!(agents.len(), 25);
    let ids: HashSet<_> = agents.iter().map(|a| a.id).collect();
    let locations: HashSet<_> = agents.iter().map(|a| a.location).collect();
    assert_eq!(ids.len(), 25);
    assert_eq!(locations.len(), 25);

    let log = orchestrator.log();
    assert_eq!(log.count(EventKind::Created), 25);
    let deployed = &log.entries()[0];
    assert_eq!(deployed.reason, DEPLOY_REASON);
    for event in log.entries().iter().skip(1) {
        assert!(event.reason.starts_with("cloned from agent-"));
    }
    for agent in &agents {
        let own = log.for_agent(agent.id);
        assert!(own.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fire_consumes_a_trapped_agent() {
    // A - B, agent on A, fire starts on B: A can only burn next.
    let mut builder = TopologyBuilder::new();
    builder.add_node(Location::new(0, 0)).unwrap();
    builder.add_node(Location::new(1, 0)).unwrap();
    builder.connect(Location::new(0, 0), Location::new(1, 0)).unwrap();
    let orchestrator = Orchestrator::new(builder.build().unwrap(), fast(10)).unwrap();

    let id = orchestrator.deploy_agent(Location::new(0, 0)).unwrap();
    let fire = FireConfig {
        spread_interval_ms: 20,
        ignition_probability: 1.0,
        seed: Some(7),
    };
    orchestrator.start_fire(&[Location::new(1, 0)], &fire).unwrap();
    assert_eq!(orchestrator.burned_node_count(), 1);

    assert!(
        eventually(Duration::from_secs(3), || {
            orchestrator.log().count(EventKind::Destroyed) == 1
        })
        .await
    );
    orchestrator.shutdown().await;

    let destroyed = orchestrator.log().for_agent(id);
    assert_eq!(destroyed.last().unwrap().kind, EventKind::Destroyed);
    assert_eq!(destroyed.last().unwrap().reason, "consumed by fire");
    let stats = orchestrator.stats();
    assert_eq!(stats.burned_nodes, 2);
    assert_eq!(stats.active_agents, 0);
    assert!(!orchestrator.agent(id).unwrap().active);
}

#[tokio::test]
async fn deploy_rejects_bad_locations() {
    // Isolated nodes: a deployed agent never leaves its node.
    let mut builder = TopologyBuilder::new();
    for x in 0..3 {
        builder.add_node(Location::new(x, 0)).unwrap();
    }
    let orchestrator = Orchestrator::new(builder.build().unwrap(), fast(50)).unwrap();
    assert!(matches!(
        orchestrator.deploy_agent(Location::new(9, 9)),
        Err(FirewatchError::UnknownLocation(_))
    ));

    orchestrator.deploy_agent(Location::new(0, 0)).unwrap();
    assert!(matches!(
        orchestrator.deploy_agent(Location::new(0, 0)),
        Err(FirewatchError::LocationOccupied(_))
    ));

    orchestrator.topology().node(Location::new(2, 0)).unwrap().escalate(NodeState::OnFire);
    assert!(matches!(
        orchestrator.deploy_agent(Location::new(2, 0)),
        Err(FirewatchError::LocationOnFire(_))
    ));

    orchestrator.shutdown().await;
    assert!(matches!(
        orchestrator.deploy_agent(Location::new(1, 0)),
        Err(FirewatchError::SimulationInactive)
    ));
}

#[tokio::test]
async fn speed_factor_and_destroy() {
    let orchestrator = Orchestrator::new(Topology::grid(2, 1).unwrap(), fast(50)).unwrap();
    assert!(matches!(
        orchestrator.set_speed_factor(0),
        Err(FirewatchError::InvalidSpeedFactor(0))
    ));
    orchestrator.set_speed_factor(4).unwrap();
    assert_eq!(orchestrator.speed_factor(), 4);

    assert!(matches!(
        orchestrator.destroy_agent(AgentId(42)),
        Err(FirewatchError::AgentNotFound(_))
    ));
    let id = orchestrator.deploy_agent(Location::new(0, 0)).unwrap();
    orchestrator.destroy_agent(id).unwrap();
    orchestrator.destroy_agent(id).unwrap();
    assert_eq!(orchestrator.log().count(EventKind::Destroyed), 1);

    orchestrator.shutdown().await;
    assert_eq!(orchestrator.agent(id).unwrap().status, AgentStatus::Terminated);
}

#[tokio::test]
async fn destroyed_agent_is_not_recorded_again_by_the_fire() {
    let orchestrator = Orchestrator::new(Topology::grid(1, 1).unwrap(), fast(50)).unwrap();
    let id = orchestrator.deploy_agent(Location::new(0, 0)).unwrap();
    orchestrator.destroy_agent(id).unwrap();

    let fire = FireConfig {
        seed: Some(1),
        ..Default::default()
    };
    orchestrator.start_fire(&[Location::new(0, 0)], &fire).unwrap();
    orchestrator.shutdown().await;

    let destroyed: Vec<_> = orchestrator
        .log()
        .for_agent(id)
        .into_iter()
        .filter(|e| e.kind == EventKind::Destroyed)
        .collect();
    assert_eq!(destroyed.len(), 1);
    assert_eq!(destroyed[0].reason, "destroyed on request");
}

#[tokio::test]
async fn dropping_the_last_handle_stops_the_simulation() {
    let orchestrator = Orchestrator::new(Topology::grid(2, 2).unwrap(), fast(20)).unwrap();
    orchestrator.deploy_agent(Location::new(0, 0)).unwrap();
    let gate = orchestrator.activity();

    let other = orchestrator.clone();
    drop(orchestrator);
    assert!(*gate.borrow());
    assert!(other.is_simulation_active());

    drop(other);
    assert!(!*gate.borrow());
}

#[tokio::test]
async fn event_log_exports_to_json() {
    let orchestrator = Orchestrator::new(Topology::grid(2, 2).unwrap(), fast(50)).unwrap();
    orchestrator.deploy_agent(Location::new(0, 0)).unwrap();
    orchestrator.shutdown().await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.json");
    orchestrator.log().write_json(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let events: Vec<AgentEvent> = serde_json::from_str(&text).unwrap();
    assert_eq!(events, orchestrator.log().entries());
    assert_eq!(events[0].kind, EventKind::Created);
}

#[tokio::test]
async fn run_scenario_reports_progress() {
    let scenario = Scenario {
        simulation: fast(10),
        fire: FireConfig {
            spread_interval_ms: 50,
            seed: Some(3),
            ..Default::default()
        },
        topology: TopologySpec::Grid {
            width: 4,
            height: 4,
        },
        base_station: Location::new(0, 0),
        fire_origins: vec![Location::new(3, 3)],
    };

    let mut ticks = 0;
    let report = run_scenario(&scenario, Duration::from_millis(300), |_, stats| {
        assert_eq!(stats.total_nodes, 16);
        ticks += 1;
    })
    .await
    .unwrap();

    assert!(ticks >= 1);
    assert!(report.stats.burned_nodes >= 1);
    assert_eq!(report.stats.active_agents, 0);
    let first = &report.log.entries()[0];
    assert_eq!(first.reason, DEPLOY_REASON);
    assert!(report.started_at <= first.timestamp);
}

#[test]
fn new_requires_a_runtime() {
    let result = Orchestrator::new(Topology::grid(1, 1).unwrap(), SimulationConfig::default());
    assert!(matches!(result, Err(FirewatchError::NoRuntime(_))));
}

#[test]
fn with_handle_runs_outside_the_runtime_context() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()
        .unwrap();
    let orchestrator = Orchestrator::with_handle(
        Topology::grid(2, 2).unwrap(),
        fast(20),
        runtime.handle().clone(),
    )
    .unwrap();
    orchestrator.deploy_agent(Location::new(0, 0)).unwrap();
    runtime.block_on(orchestrator.shutdown());
    assert_eq!(orchestrator.active_agent_count(), 0);
}
