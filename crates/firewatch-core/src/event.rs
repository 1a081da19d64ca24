//! Agent event records and the sink that consumes them.

use crate::types::{AgentId, Location};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What an event record reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// An agent was deployed or cloned onto a node.
    Created,
    /// An agent completed a move.
    Moved,
    /// An agent gave up a move attempt this cycle.
    MoveAborted,
    /// An agent was destroyed (for example by fire reaching its node).
    Destroyed,
}

impl EventKind {
    /// Kinds every sink must receive.
    pub fn is_mandatory(&self) -> bool {
        matches!(self, EventKind::Created | EventKind::Destroyed)
    }
}

/// An immutable record of something an agent did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEvent {
    pub timestamp: DateTime<Utc>,
    pub agent_id: AgentId,
    pub location: Location,
    pub kind: EventKind,
    pub reason: String,
}

impl AgentEvent {
    pub fn new(
        timestamp: DateTime<Utc>,
        agent_id: AgentId,
        location: Location,
        kind: EventKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            agent_id,
            location,
            kind,
            reason: reason.into(),
        }
    }
}

/// Consumer of the agent event stream.
///
/// Implementations must be safe to call from many agent tasks at once and
/// must append records atomically.
pub trait EventSink: Send + Sync {
    /// Append an event.
    fn record(&self, event: AgentEvent);

    /// Whether this sink wants events of `kind`.
    ///
    /// Agents skip building optional events the sink would discard.
    fn accepts(&self, kind: EventKind) -> bool {
        kind.is_mandatory()
    }
}
