//! # Firewatch Runtime
//!
//! Drives a simulation: the orchestrator that schedules agent tasks on
//! tokio, the topology and scenario loaders, the fire-spread engine and the
//! durable agent log.
//!
//! ```rust,no_run
//! use firewatch_runtime::prelude::*;
//!
//! # async fn demo() -> firewatch_core::error::Result<()> {
//! let orchestrator = Orchestrator::new(Topology::grid(5, 5)?, SimulationConfig::default())?;
//! orchestrator.deploy_agent(Location::new(0, 0))?;
//! orchestrator.start_fire(&[Location::new(4, 4)], &FireConfig::default())?;
//! tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//! orchestrator.shutdown().await;
//! println!("{}", orchestrator.stats());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod fire;
pub mod log;
pub mod orchestrator;
pub mod prelude;
pub mod scenario;
pub mod simulation;
pub mod stats;
pub mod topology;
