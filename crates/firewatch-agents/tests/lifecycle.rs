//! Agent task lifecycle on a tokio runtime.

mod common;

use common::*;
use firewatch_agents::prelude::*;
use firewatch_core::types::Location;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deactivation_stops_a_sleeping_agent() {
    // An isolated node: the agent has nothing to do but sleep.
    let nodes = graph(&[(0, 0)], &[]);
    let host = TestHost::with_cycle(Duration::from_secs(30), true);
    let agent = station(1, &nodes[0]);

    let task = tokio::spawn(Arc::clone(&agent).run(host.clone()));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(agent.status(), AgentStatus::Running);

    host.deactivate();
    timeout(Duration::from_secs(2), task)
        .await
        .expect("agent did not observe deactivation")
        .unwrap();

    assert_eq!(agent.status(), AgentStatus::Terminated);
    assert!(host.sink.events().is_empty());
    assert_eq!(
        nodes[0].try_occupancy().unwrap().occupant_id(),
        Some(agent.id())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn destroy_stops_a_sleeping_agent() {
    let nodes = graph(&[(0, 0)], &[]);
    let host = TestHost::with_cycle(Duration::from_secs(30), false);
    let agent = station(1, &nodes[0]);

    let task = tokio::spawn(Arc::clone(&agent).run(host.clone()));
    tokio::time::sleep(Duration::from_millis(50)).await;

    agent.destroy();
    timeout(Duration::from_secs(2), task)
        .await
        .expect("agent did not observe destroy")
        .unwrap();
    assert_eq!(agent.status(), AgentStatus::Terminated);
}

#[tokio::test]
async fn destroyed_agent_never_starts_cycling() {
    let nodes = graph(&[(0, 0), (1, 0)], &[(0, 1)]);
    let host = TestHost::with_cycle(Duration::from_millis(5), true);
    let agent = station(1, &nodes[0]);
    agent.destroy();

    Arc::clone(&agent).run(host.clone()).await;

    assert_eq!(agent.location(), Location::new(0, 0));
    assert!(host.sink.events().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn running_agents_patrol_without_collisions() {
    let nodes = grid(3, 3);
    let host = TestHost::with_cycle(Duration::from_millis(2), false);
    let agents: Vec<_> = (0..4).map(|i| station(i + 1, &nodes[i as usize * 2])).collect();

    let tasks: Vec<_> = agents
        .iter()
        .map(|a| tokio::spawn(Arc::clone(a).run(host.clone())))
        .collect();

    tokio::time::sleep(Duration::from_millis(200)).await;
    host.deactivate();
    for task in tasks {
        timeout(Duration::from_secs(2), task).await.unwrap().unwrap();
    }

    let mut seen = std::collections::HashSet::new();
    for agent in &agents {
        assert!(seen.insert(agent.location()));
        let node = agent.position();
        assert_eq!(node.try_occupancy().unwrap().occupant_id(), Some(agent.id()));
    }
}
