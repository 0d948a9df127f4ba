use std::fmt;
use std::time::Instant;

use crate::probe::{ProbeKind, ProbeResult};

/// Where the run is in `START → HEALTH_OK → REGISTERED → LOGGED_IN → DONE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Start,
    HealthOk,
    Registered,
    LoggedIn,
    Done,
    Aborted,
}

impl RunStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStage::Done | RunStage::Aborted)
    }

    /// Stage reached when the current one succeeds
    pub fn successor(&self) -> Option<RunStage> {
        match self {
            RunStage::Start => Some(RunStage::HealthOk),
            RunStage::HealthOk => Some(RunStage::Registered),
            RunStage::Registered => Some(RunStage::LoggedIn),
            RunStage::LoggedIn => Some(RunStage::Done),
            RunStage::Done | RunStage::Aborted => None,
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Start => "START",
            RunStage::HealthOk => "HEALTH_OK",
            RunStage::Registered => "REGISTERED",
            RunStage::LoggedIn => "LOGGED_IN",
            RunStage::Done => "DONE",
            RunStage::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}

/// Step execution status
#[derive(Debug, Clone, PartialEq)]
pub enum StepStatus {
    Pending,
    Running,
    Passed,
    Failed { error: String },
    Skipped { reason: String },
}

/// State for a single probe step
#[derive(Debug, Clone)]
pub struct StepState {
    pub probe: ProbeKind,
    pub status: StepStatus,
    pub http_status: Option<u16>,
    pub started_at: Option<Instant>,
    pub duration_ms: Option<u64>,
}

impl StepState {
    pub fn new(probe: ProbeKind) -> Self {
        Self {
            probe,
            status: StepStatus::Pending,
            http_status: None,
            started_at: None,
            duration_ms: None,
        }
    }

    pub fn start(&mut self) {
        self.status = StepStatus::Running;
        self.started_at = Some(Instant::now());
    }

    /// Settle the step from its probe result
    pub fn complete(&mut self, result: &ProbeResult) {
        self.http_status = result.status;
        self.status = if result.success {
            StepStatus::Passed
        } else {
            StepStatus::Failed {
                error: result
                    .error_message()
                    .unwrap_or_else(|| "unknown error".to_string()),
            }
        };
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    pub fn skip(&mut self, reason: String) {
        self.status = StepStatus::Skipped { reason };
    }
}

/// State for one smoke test run
#[derive(Debug, Clone)]
pub struct RunState {
    pub run_id: String,
    pub stage: RunStage,
    pub steps: Vec<StepState>,
    pub current_index: usize,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl RunState {
    pub fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            stage: RunStage::Start,
            steps: ProbeKind::SEQUENCE.iter().copied().map(StepState::new).collect(),
            current_index: 0,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn current_step(&mut self) -> Option<&mut StepState> {
        self.steps.get_mut(self.current_index)
    }

    /// Move to the next stage. Returns false once terminal.
    pub fn advance(&mut self) -> bool {
        match self.stage.successor() {
            Some(next) => {
                self.stage = next;
                true
            }
            None => false,
        }
    }

    pub fn abort(&mut self) {
        if !self.stage.is_terminal() {
            self.stage = RunStage::Aborted;
        }
    }

    /// Record the current step's result and move the stage accordingly
    pub fn complete_step(&mut self, result: &ProbeResult) -> bool {
        if let Some(step) = self.current_step() {
            step.complete(result);
        }
        self.current_index += 1;

        if result.success {
            self.advance();
        } else {
            self.abort();
        }
        result.success
    }

    /// Mark every pending step skipped; returns the probes affected
    pub fn skip_remaining(&mut self, reason: &str) -> Vec<ProbeKind> {
        let mut skipped = Vec::new();
        for step in &mut self.steps[self.current_index..] {
            if matches!(step.status, StepStatus::Pending) {
                step.skip(reason.to_string());
                skipped.push(step.probe);
            }
        }
        skipped
    }

    /// Close the run; a run whose last probe passed reaches `Done`
    pub fn finish(&mut self) {
        if self.stage == RunStage::LoggedIn {
            self.advance();
        }
        self.finished_at = Some(Instant::now());
    }

    /// First probe that failed, if any
    pub fn failed_probe(&self) -> Option<ProbeKind> {
        self.steps
            .iter()
            .find(|s| matches!(s.status, StepStatus::Failed { .. }))
            .map(|s| s.probe)
    }

    pub fn summary(&self) -> RunSummary {
        let (passed, failed, skipped) =
            self.steps
                .iter()
                .fold((0, 0, 0), |(p, f, s), step| match step.status {
                    StepStatus::Passed => (p + 1, f, s),
                    StepStatus::Failed { .. } => (p, f + 1, s),
                    StepStatus::Skipped { .. } => (p, f, s + 1),
                    _ => (p, f, s),
                });

        let total_duration_ms = self.started_at.map(|start| {
            self.finished_at
                .unwrap_or_else(Instant::now)
                .duration_since(start)
                .as_millis() as u64
        });

        RunSummary {
            run_id: self.run_id.clone(),
            total_steps: self.steps.len() as u32,
            passed,
            failed,
            skipped,
            total_duration_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: String,
    pub total_steps: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total_duration_ms: Option<u64>,
}

/// Everything a caller needs after a run
#[derive(Debug, Clone)]
pub struct SmokeReport {
    pub run_id: String,
    pub stage: RunStage,
    pub steps: Vec<StepState>,
    pub summary: RunSummary,
    /// Email the login probe was sent, as echoed by registration
    pub login_email: Option<String>,
    pub access_token: Option<String>,
}

impl SmokeReport {
    pub fn is_success(&self) -> bool {
        self.stage == RunStage::Done
    }

    pub fn step(&self, probe: ProbeKind) -> Option<&StepState> {
        self.steps.iter().find(|s| s.probe == probe)
    }
}
