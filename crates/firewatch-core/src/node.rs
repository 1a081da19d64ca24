//! SensorNode - a vertex of the shared sensor graph.
//!
//! A node carries its fire state, a neighbor set that is linked once when
//! the topology is built, and an occupancy slot recording which agent (if
//! any) is stationed on it. The slot sits behind a per-node mutex that is
//! only ever exposed through `try_occupancy`: nobody waits on contention,
//! callers that lose the race simply skip their work for this cycle.
//!
//! Holding an [`OccupancyGuard`] is the only way to read or write the
//! occupant, so the "must hold the lock" precondition is enforced by the
//! type system rather than by convention.

use crate::error::{FirewatchError, Result};
use crate::types::{AgentId, Location, NodeKey, NodeState};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock, Weak};

/// Anything that can be stationed on a sensor node.
///
/// The node never owns its occupant; it keeps a weak reference plus the
/// occupant's id so that identity checks work even after the agent is gone.
pub trait Occupant: Send + Sync {
    /// The occupant's identity.
    fn agent_id(&self) -> AgentId;

    /// Ask the occupant to stop at its next opportunity.
    ///
    /// Returns `true` only for the call that actually deactivated it.
    fn destroy(&self) -> bool;
}

struct Slot {
    id: AgentId,
    agent: Weak<dyn Occupant>,
}

/// A vertex of the sensor graph.
pub struct SensorNode {
    key: NodeKey,
    location: Location,
    state: AtomicU8,
    neighbors: OnceLock<Vec<Weak<SensorNode>>>,
    occupant: Mutex<Option<Slot>>,
    /// Lock-free mirror of `occupant.is_some()`, written under the lock.
    occupied: AtomicBool,
}

impl SensorNode {
    /// Create an unlinked node in the `NORMAL` state.
    pub fn new(key: NodeKey, location: Location) -> Self {
        Self {
            key,
            location,
            state: AtomicU8::new(NodeState::Normal as u8),
            neighbors: OnceLock::new(),
            occupant: Mutex::new(None),
            occupied: AtomicBool::new(false),
        }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Current fire state. May change at any moment under the fire engine.
    pub fn state(&self) -> NodeState {
        NodeState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Raise the fire state to at least `to`.
    ///
    /// States never move backwards. Returns `true` if the state changed.
    pub fn escalate(&self, to: NodeState) -> bool {
        let previous = self.state.fetch_max(to as u8, Ordering::AcqRel);
        previous < to as u8
    }

    /// Link the neighbor set. Succeeds exactly once per node.
    pub fn link_neighbors(&self, neighbors: Vec<Weak<SensorNode>>) -> Result<()> {
        self.neighbors
            .set(neighbors)
            .map_err(|_| FirewatchError::NeighborsAlreadyLinked(self.key))
    }

    /// The fixed set of adjacent nodes.
    ///
    /// Empty until the topology links this node.
    pub fn neighbors(&self) -> Vec<Arc<SensorNode>> {
        self.neighbors
            .get()
            .map(|list| list.iter().filter_map(Weak::upgrade).collect())
            .unwrap_or_default()
    }

    /// Best-effort occupancy check without the lock. The answer may be
    /// stale by the time the caller acts on it.
    pub fn has_agent(&self) -> bool {
        self.occupied.load(Ordering::Acquire)
    }

    /// Try to take this node's occupancy lock without waiting.
    ///
    /// The lock is released when the returned guard is dropped.
    pub fn try_occupancy(&self) -> Option<OccupancyGuard<'_>> {
        self.occupant
            .try_lock()
            .map(|slot| OccupancyGuard { node: self, slot })
    }
}

impl fmt::Debug for SensorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorNode")
            .field("key", &self.key)
            .field("location", &self.location)
            .field("state", &self.state())
            .field("occupied", &self.has_agent())
            .finish()
    }
}

/// Exclusive access to one node's occupant slot.
pub struct OccupancyGuard<'a> {
    node: &'a SensorNode,
    slot: MutexGuard<'a, Option<Slot>>,
}

impl<'a> OccupancyGuard<'a> {
    /// The node this guard locks.
    pub fn node(&self) -> &'a SensorNode {
        self.node
    }

    pub fn is_occupied(&self) -> bool {
        self.slot.is_some()
    }

    /// Id of the agent recorded on this node, alive or not.
    pub fn occupant_id(&self) -> Option<AgentId> {
        self.slot.as_ref().map(|slot| slot.id)
    }

    /// The recorded agent, if it is still alive.
    pub fn occupant(&self) -> Option<Arc<dyn Occupant>> {
        self.slot.as_ref().and_then(|slot| slot.agent.upgrade())
    }

    /// Record `agent` as this node's occupant, replacing any previous one.
    pub fn set_occupant<A: Occupant + 'static>(&mut self, agent: &Arc<A>) {
        let weak: Weak<A> = Arc::downgrade(agent);
        let weak: Weak<dyn Occupant> = weak;
        *self.slot = Some(Slot {
            id: agent.agent_id(),
            agent: weak,
        });
        self.node.occupied.store(true, Ordering::Release);
    }

    /// Vacate the node, returning the id that was recorded.
    pub fn clear_occupant(&mut self) -> Option<AgentId> {
        let previous = self.slot.take().map(|slot| slot.id);
        self.node.occupied.store(false, Ordering::Release);
        previous
    }
}

/// Occupancy locks on two distinct nodes, taken in ascending key order.
pub struct LockedPair<'a> {
    // Fields drop in declaration order, so the later acquisition is
    // released first.
    later: OccupancyGuard<'a>,
    earlier: OccupancyGuard<'a>,
    swapped: bool,
}

impl<'a> LockedPair<'a> {
    /// Guards in the order the nodes were passed to [`lock_pair`].
    pub fn guards(&mut self) -> (&mut OccupancyGuard<'a>, &mut OccupancyGuard<'a>) {
        let LockedPair {
            later,
            earlier,
            swapped,
        } = self;
        if *swapped {
            (later, earlier)
        } else {
            (earlier, later)
        }
    }
}

/// Try to lock both nodes without waiting.
///
/// Locks are always attempted lowest `NodeKey` first, independent of the
/// argument order. If either attempt fails, anything already acquired is
/// released and `None` is returned. Returns `None` for the same node twice.
pub fn lock_pair<'a>(a: &'a SensorNode, b: &'a SensorNode) -> Option<LockedPair<'a>> {
    if a.key() == b.key() {
        return None;
    }
    let swapped = b.key() < a.key();
    let (low, high) = if swapped { (b, a) } else { (a, b) };

    let earlier = low.try_occupancy()?;
    let later = high.try_occupancy()?;
    Some(LockedPair {
        later,
        earlier,
        swapped,
    })
}
