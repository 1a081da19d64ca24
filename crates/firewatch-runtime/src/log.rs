//! AgentLog - the durable, append-only agent event log.
//!
//! Every accepted record is appended under a single write lock, so the
//! insertion order is the event order, and mirrored to `tracing`.

use crate::config::SimulationConfig;
use firewatch_core::error::Result;
use firewatch_core::event::{AgentEvent, EventKind, EventSink};
use firewatch_core::types::AgentId;
use parking_lot::RwLock;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default)]
pub struct AgentLog {
    entries: RwLock<Vec<AgentEvent>>,
    record_moves: bool,
    record_aborts: bool,
}

impl AgentLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that keeps optional move records as configured.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            record_moves: config.record_moves,
            record_aborts: config.record_aborts,
        }
    }

    /// Snapshot of every record so far, in append order.
    pub fn entries(&self) -> Vec<AgentEvent> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Records concerning one agent, in append order.
    pub fn for_agent(&self, id: AgentId) -> Vec<AgentEvent> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.agent_id == id)
            .cloned()
            .collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.entries.read().iter().filter(|e| e.kind == kind).count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&*self.entries.read())?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl EventSink for AgentLog {
    fn record(&self, event: AgentEvent) {
        info!(
            agent = %event.agent_id,
            location = %event.location,
            kind = ?event.kind,
            reason = %event.reason,
            "agent event"
        );
        self.entries.write().push(event);
    }

    fn accepts(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Created | EventKind::Destroyed => true,
            EventKind::Moved => self.record_moves,
            EventKind::MoveAborted => self.record_aborts,
        }
    }
}
