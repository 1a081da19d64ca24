//! Cloning protocol.
//!
//! An agent standing next to the fire installs a fresh agent on every
//! neighbor that is neither burning nor occupied. Each new agent claims its
//! node with a single non-blocking lock; if another agent got there first
//! the neighbor is skipped. The parent itself never moves while cloning.

use crate::agent::MobileAgent;
use crate::host::AgentHost;
use firewatch_core::event::{AgentEvent, EventKind};
use firewatch_core::types::{AgentId, Location};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a single-node occupancy claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed,
    /// The node's lock was held by someone else.
    Contended,
    /// The node already had an occupant.
    Occupied,
    /// The node was burning.
    OnFire,
}

/// What one pass of the cloning protocol produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneReport {
    /// Clones installed and submitted, with their starting location.
    pub spawned: Vec<(AgentId, Location)>,
    /// Neighbors whose claim was lost to a concurrent agent.
    pub lost_claims: usize,
}

impl MobileAgent {
    /// Claim this agent's starting node.
    ///
    /// Used for freshly constructed agents (deployed or cloned) before their
    /// task is submitted.
    pub fn claim_position(self: &Arc<Self>) -> ClaimOutcome {
        let node = self.position();
        let Some(mut guard) = node.try_occupancy() else {
            return ClaimOutcome::Contended;
        };
        if !node.state().is_habitable() {
            return ClaimOutcome::OnFire;
        }
        if guard.is_occupied() {
            return ClaimOutcome::Occupied;
        }
        guard.set_occupant(self);
        ClaimOutcome::Claimed
    }

    pub(crate) fn cloning_protocol(&self, host: &dyn AgentHost) -> CloneReport {
        let mut report = CloneReport::default();
        let current = self.position();

        for neighbor in current.neighbors() {
            if !neighbor.state().is_habitable() || neighbor.has_agent() {
                continue;
            }

            let child = MobileAgent::new(host.next_agent_id(), Arc::clone(&neighbor));
            match child.claim_position() {
                ClaimOutcome::Claimed => {
                    let location = neighbor.location();
                    host.event_sink().record(AgentEvent::new(
                        host.now(),
                        child.id(),
                        location,
                        EventKind::Created,
                        format!("cloned from {}", self.id()),
                    ));
                    info!(parent = %self.id(), clone = %child.id(), %location, "agent cloned");
                    report.spawned.push((child.id(), location));
                    host.submit_agent_task(child);
                }
                outcome => {
                    debug!(parent = %self.id(), target = %neighbor.location(), ?outcome, "clone claim lost");
                    report.lost_claims += 1;
                }
            }
        }

        report
    }
}
