//! Firewatch Agents Prelude.

pub use crate::agent::{AgentStatus, CycleOutcome, MobileAgent};
pub use crate::cloning::{ClaimOutcome, CloneReport};
pub use crate::host::{AgentHost, DEFAULT_BASE_CYCLE};
pub use crate::movement::MoveOutcome;
