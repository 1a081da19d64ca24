//! Firewatch Core Prelude - convenient imports for common usage.
//!
//! ```rust
//! use firewatch_core::prelude::*;
//! ```

pub use crate::types::{AgentId, Location, NodeKey, NodeState};

pub use crate::node::{lock_pair, LockedPair, Occupant, OccupancyGuard, SensorNode};

pub use crate::event::{AgentEvent, EventKind, EventSink};

pub use crate::clock::SimulationClock;

pub use crate::error::{FirewatchError, Result};
