//! Movement protocol.
//!
//! Candidate neighbors are picked without holding any lock, which makes the
//! choice a guess. The move itself happens only after both the source and
//! the destination occupancy locks are held (acquired lowest key first,
//! never waiting) and the guess has been re-checked under those locks.

use crate::agent::MobileAgent;
use crate::host::AgentHost;
use firewatch_core::event::{AgentEvent, EventKind};
use firewatch_core::node::{lock_pair, SensorNode};
use firewatch_core::types::{Location, NodeState};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Result of one pass of the movement protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The agent now stands on `to`; `from` is vacant.
    Moved { from: Location, to: Location },
    /// No neighbor was free and habitable.
    NoCandidate,
    /// One of the two occupancy locks was taken by someone else.
    Contended { target: Location },
    /// The locks were acquired but the destination had caught fire or been
    /// taken, or this agent no longer owned its source node.
    Stale { target: Location },
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// Pick a destination among `current`'s neighbors.
///
/// Free `NEAR_FIRE` neighbors win over free `NORMAL` ones; the choice within
/// a tier is uniform. Burning and occupied neighbors are never candidates.
/// Occupancy is read without the lock, so the answer may already be stale.
pub fn select_destination<R: Rng + ?Sized>(
    current: &SensorNode,
    rng: &mut R,
) -> Option<Arc<SensorNode>> {
    let mut near_fire = Vec::new();
    let mut normal = Vec::new();

    for neighbor in current.neighbors() {
        if neighbor.has_agent() {
            continue;
        }
        match neighbor.state() {
            NodeState::NearFire => near_fire.push(neighbor),
            NodeState::Normal => normal.push(neighbor),
            NodeState::OnFire => {}
        }
    }

    let tier = if near_fire.is_empty() { normal } else { near_fire };
    tier.choose(rng).cloned()
}

impl MobileAgent {
    /// Move this agent from its current node onto `destination`.
    ///
    /// Never waits for a lock. On success the destination records this
    /// agent, the source is vacated and the agent's position is updated, all
    /// while both locks are held.
    pub fn attempt_move(self: &Arc<Self>, destination: &Arc<SensorNode>) -> MoveOutcome {
        let source = self.position();
        let target = destination.location();

        let Some(mut pair) = lock_pair(&source, destination) else {
            return MoveOutcome::Contended { target };
        };
        let (source_guard, destination_guard) = pair.guards();

        if !destination.state().is_habitable()
            || destination_guard.is_occupied()
            || source_guard.occupant_id() != Some(self.id())
        {
            return MoveOutcome::Stale { target };
        }

        destination_guard.set_occupant(self);
        source_guard.clear_occupant();
        self.move_to(destination);
        drop(pair);

        MoveOutcome::Moved {
            from: source.location(),
            to: target,
        }
    }

    pub(crate) fn movement_protocol<R: Rng + ?Sized>(
        self: &Arc<Self>,
        host: &dyn AgentHost,
        rng: &mut R,
    ) -> MoveOutcome {
        let current = self.position();
        let Some(destination) = select_destination(&current, rng) else {
            return MoveOutcome::NoCandidate;
        };

        let outcome = self.attempt_move(&destination);
        self.report_move(host, outcome);
        outcome
    }

    fn report_move(&self, host: &dyn AgentHost, outcome: MoveOutcome) {
        let sink = host.event_sink();
        match outcome {
            MoveOutcome::Moved { from, to } => {
                if sink.accepts(EventKind::Moved) {
                    sink.record(AgentEvent::new(
                        host.now(),
                        self.id(),
                        to,
                        EventKind::Moved,
                        format!("moved from {}", from),
                    ));
                }
            }
            MoveOutcome::Contended { target } => {
                debug!(agent = %self.id(), %target, "move aborted: lock contention");
                if sink.accepts(EventKind::MoveAborted) {
                    sink.record(AgentEvent::new(
                        host.now(),
                        self.id(),
                        self.location(),
                        EventKind::MoveAborted,
                        format!("lock contention moving to {}", target),
                    ));
                }
            }
            MoveOutcome::Stale { target } => {
                debug!(agent = %self.id(), %target, "move aborted: destination changed");
                if sink.accepts(EventKind::MoveAborted) {
                    sink.record(AgentEvent::new(
                        host.now(),
                        self.id(),
                        self.location(),
                        EventKind::MoveAborted,
                        format!("{} changed before the move", target),
                    ));
                }
            }
            MoveOutcome::NoCandidate => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firewatch_core::types::{AgentId, NodeKey};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn star(center_state: NodeState, leaves: &[NodeState]) -> (Arc<SensorNode>, Vec<Arc<SensorNode>>) {
        let center = Arc::new(SensorNode::new(NodeKey(0), Location::new(0, 0)));
        center.escalate(center_state);
        let leaves: Vec<_> = leaves
            .iter()
            .enumerate()
            .map(|(i, state)| {
                let node = Arc::new(SensorNode::new(
                    NodeKey(i as u32 + 1),
                    Location::new(i as i32 + 1, 0),
                ));
                node.escalate(*state);
                node
            })
            .collect();
        center
            .link_neighbors(leaves.iter().map(Arc::downgrade).collect())
            .unwrap();
        for leaf in &leaves {
            leaf.link_neighbors(vec![Arc::downgrade(&center)]).unwrap();
        }
        (center, leaves)
    }

    #[test]
    fn near_fire_neighbors_take_priority() {
        let (center, leaves) = star(
            NodeState::Normal,
            &[NodeState::Normal, NodeState::NearFire, NodeState::Normal],
        );
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let pick = select_destination(&center, &mut rng).unwrap();
            assert_eq!(pick.key(), leaves[1].key());
        }
    }

    #[test]
    fn burning_and_occupied_neighbors_are_skipped() {
        let (center, leaves) = star(NodeState::Normal, &[NodeState::OnFire, NodeState::Normal]);
        let squatter = MobileAgent::new(AgentId(9), Arc::clone(&leaves[1]));
        leaves[1].try_occupancy().unwrap().set_occupant(&squatter);

        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_destination(&center, &mut rng).is_none());
    }

    #[test]
    fn normal_tier_is_uniform() {
        let (center, leaves) = star(NodeState::Normal, &[NodeState::Normal; 2]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut hits = [0usize; 2];
        for _ in 0..400 {
            let pick = select_destination(&center, &mut rng).unwrap();
            let idx = leaves.iter().position(|l| l.key() == pick.key()).unwrap();
            hits[idx] += 1;
        }
        assert!(hits[0] > 120 && hits[1] > 120, "skewed choice: {:?}", hits);
    }

    #[test]
    fn attempt_move_requires_owning_the_source() {
        let (center, leaves) = star(NodeState::Normal, &[NodeState::Normal]);
        // Agent was never recorded as the center's occupant.
        let agent = MobileAgent::new(AgentId(1), Arc::clone(&center));
        let outcome = agent.attempt_move(&leaves[0]);
        assert_eq!(outcome, MoveOutcome::Stale { target: leaves[0].location() });
        assert_eq!(agent.location(), center.location());
        assert!(!leaves[0].has_agent());
    }

    #[test]
    fn attempt_move_aborts_under_contention() {
        let (center, leaves) = star(NodeState::Normal, &[NodeState::Normal]);
        let agent = MobileAgent::new(AgentId(1), Arc::clone(&center));
        center.try_occupancy().unwrap().set_occupant(&agent);

        let held = leaves[0].try_occupancy().unwrap();
        let outcome = agent.attempt_move(&leaves[0]);
        assert_eq!(outcome, MoveOutcome::Contended { target: leaves[0].location() });
        drop(held);

        // Nothing changed and nothing is left locked.
        assert_eq!(agent.location(), center.location());
        assert!(center.try_occupancy().is_some());
        assert!(leaves[0].try_occupancy().is_some());
    }

    #[test]
    fn attempt_move_hands_off_occupancy() {
        let (center, leaves) = star(NodeState::Normal, &[NodeState::Normal]);
        let agent = MobileAgent::new(AgentId(1), Arc::clone(&center));
        center.try_occupancy().unwrap().set_occupant(&agent);

        let outcome = agent.attempt_move(&leaves[0]);
        assert!(outcome.is_moved());
        assert_eq!(agent.location(), leaves[0].location());
        assert_eq!(center.try_occupancy().unwrap().occupant_id(), None);
        assert_eq!(
            leaves[0].try_occupancy().unwrap().occupant_id(),
            Some(AgentId(1))
        );
    }
}
