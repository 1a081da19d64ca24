//! # Firewatch Core
//!
//! Shared building blocks for the firewatch simulation: identifiers and
//! fire states, the [`SensorNode`](node::SensorNode) graph vertex with its
//! non-blocking occupancy lock, event records with the
//! [`EventSink`](event::EventSink) seam, and the error type.
//!
//! ## Quick Start
//!
//! ```rust
//! use firewatch_core::prelude::*;
//!
//! let node = SensorNode::new(NodeKey(0), Location::new(0, 0));
//! assert_eq!(node.state(), NodeState::Normal);
//!
//! // Occupancy is only reachable through a non-blocking guard.
//! let guard = node.try_occupancy().expect("uncontended");
//! assert!(!guard.is_occupied());
//! ```

pub mod clock;
pub mod error;
pub mod event;
pub mod node;
pub mod prelude;
pub mod types;
