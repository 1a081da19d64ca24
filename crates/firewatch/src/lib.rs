//! # Firewatch
//!
//! A wildfire sensor network patrolled by autonomous mobile agents.
//!
//! Sensor nodes form a fixed graph. Each agent runs as its own tokio task,
//! wandering between free neighbors and preferring nodes next to the fire.
//! An agent that finds itself next to the fire clones itself onto every
//! free neighbor, so coverage grows where it is needed. A fire-spread
//! engine burns the graph over time and destroys agents it catches.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use firewatch::prelude::*;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let scenario = Scenario::default();
//! let report = run_scenario(&scenario, Duration::from_secs(10), |elapsed, stats| {
//!     println!("{:>5.1}s  {}", elapsed.as_secs_f64(), stats);
//! })
//! .await?;
//!
//! println!("{} events logged", report.log.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`firewatch_core`] - sensor nodes, occupancy locks, events, errors
//! - [`firewatch_agents`] - mobile agents and their movement and cloning protocols
//! - [`firewatch_runtime`] - orchestrator, topology, fire spread, agent log
//!
//! ## Locking discipline
//!
//! | Rule | Effect |
//! |------|--------|
//! | Try-lock only | an agent never waits for another agent |
//! | Lock by node key | two agents crossing paths cannot deadlock |
//! | Re-check under lock | decisions made on stale reads are dropped |
//! | No pause under lock | cancellation never lands mid hand-off |

pub use firewatch_agents as agents;
pub use firewatch_core as core;
pub use firewatch_runtime as runtime;

/// Prelude - import everything commonly needed.
///
/// ```rust
/// use firewatch::prelude::*;
/// ```
pub mod prelude {
    pub use firewatch_runtime::prelude::*;
}
