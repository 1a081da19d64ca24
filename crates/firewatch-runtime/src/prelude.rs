//! Firewatch Runtime Prelude - convenient imports for common usage.
//!
//! ```rust
//! use firewatch_runtime::prelude::*;
//! ```

pub use crate::config::{FireConfig, SimulationConfig};
pub use crate::fire::{FireSpread, SpreadReport};
pub use crate::log::AgentLog;
pub use crate::orchestrator::{Orchestrator, DEPLOY_REASON};
pub use crate::scenario::{Scenario, TopologySpec};
pub use crate::simulation::{run_scenario, SimulationReport, PROGRESS_TICK};
pub use crate::stats::{AgentSnapshot, SimulationStats};
pub use crate::topology::{Topology, TopologyBuilder};

pub use firewatch_agents::prelude::*;
pub use firewatch_core::prelude::*;
