use std::time::Duration;

use super::state::{RunStage, RunSummary};
use crate::probe::{ProbeKind, ProbeResult, Role};

/// Run events for real-time reporting
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStarted {
        run_id: String,
        base_url: String,
    },
    ProbeStarted {
        probe: ProbeKind,
        /// URL for health, account email for registration and login
        target: String,
    },
    ProbePassed {
        result: ProbeResult,
        /// Role requested at registration, for the dashboard hint
        role: Role,
    },
    ProbeFailed {
        result: ProbeResult,
    },
    ProbeSkipped {
        probe: ProbeKind,
        reason: String,
    },
    Waiting {
        duration: Duration,
    },
    RunFinished {
        stage: RunStage,
        failed_probe: Option<ProbeKind>,
        summary: RunSummary,
    },
}

/// Receives run events as they happen
pub trait EventSink {
    fn emit(&mut self, event: RunEvent);
}

/// Sink that keeps every event, for callers that inspect a run afterwards
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<RunEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probes that were actually sent, in order
    pub fn started_probes(&self) -> Vec<ProbeKind> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::ProbeStarted { probe, .. } => Some(*probe),
                _ => None,
            })
            .collect()
    }

    pub fn skipped_probes(&self) -> Vec<ProbeKind> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::ProbeSkipped { probe, .. } => Some(*probe),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: RunEvent) {
        self.events.push(event);
    }
}
