pub mod events;
pub mod state;

use anyhow::Result;
use log::{info, warn};

use crate::probe::{AuthClient, ProbeError, ProbeKind, ProbeResult, RegistrationRequest, Role};
use crate::utils::config::Config;

pub use events::*;
pub use state::*;

/// Run health → registration → login once against `config.base_url`
pub async fn run_smoke_test(config: &Config, sink: &mut dyn EventSink) -> Result<SmokeReport> {
    let client = AuthClient::new(config)?;
    Ok(SmokeRunner::new(client, config.clone()).run(sink).await)
}

/// Run the full sequence once per role, one after another. A failed run
/// does not stop the next role.
pub async fn run_role_sweep(
    config: &Config,
    roles: &[Role],
    sink: &mut dyn EventSink,
) -> Result<Vec<(Role, SmokeReport)>> {
    let mut runs = Vec::with_capacity(roles.len());
    for &role in roles {
        let role_config = Config {
            role,
            ..config.clone()
        };
        let report = run_smoke_test(&role_config, sink).await?;
        runs.push((role, report));
    }
    Ok(runs)
}

/// Drives the probe sequence, stopping at the first failure
pub struct SmokeRunner {
    client: AuthClient,
    config: Config,
    state: RunState,
    login_email: Option<String>,
    access_token: Option<String>,
}

impl SmokeRunner {
    pub fn new(client: AuthClient, config: Config) -> Self {
        let run_id = uuid::Uuid::new_v4().to_string();
        Self {
            client,
            config,
            state: RunState::new(&run_id),
            login_email: None,
            access_token: None,
        }
    }

    pub async fn run(mut self, sink: &mut dyn EventSink) -> SmokeReport {
        self.state.start();
        info!(
            "run {} started against {}",
            self.state.run_id,
            self.client.base_url()
        );
        sink.emit(RunEvent::RunStarted {
            run_id: self.state.run_id.clone(),
            base_url: self.client.base_url().to_string(),
        });

        // 1. Health
        self.begin(ProbeKind::Health, self.client.health_url(), sink);
        let health = self.client.health().await;
        if !self.settle(health, sink) {
            return self.finish(sink);
        }

        // 2. Registration
        let payload = RegistrationRequest::for_role(self.config.role);
        self.begin(ProbeKind::Registration, payload.email.clone(), sink);
        let mut registration = self.client.register(&payload).await;
        let identity = if registration.success {
            match registration.registered_identity(&payload.password) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    registration.fail(e);
                    None
                }
            }
        } else {
            None
        };
        if !self.settle(registration, sink) {
            return self.finish(sink);
        }
        let Some(identity) = identity else {
            return self.finish(sink);
        };
        if identity.email != payload.email {
            warn!(
                "service echoed {} for submitted email {}",
                identity.email, payload.email
            );
        }

        sink.emit(RunEvent::Waiting {
            duration: self.config.login_delay,
        });
        tokio::time::sleep(self.config.login_delay).await;

        // 3. Login with the echoed email
        self.login_email = Some(identity.email.clone());
        self.begin(ProbeKind::Login, identity.email.clone(), sink);
        let login = self.client.login(&identity.email, &identity.password).await;
        self.access_token = login.access_token().map(str::to_string);
        self.settle(login, sink);

        self.finish(sink)
    }

    fn begin(&mut self, probe: ProbeKind, target: String, sink: &mut dyn EventSink) {
        if let Some(step) = self.state.current_step() {
            step.start();
        }
        sink.emit(RunEvent::ProbeStarted { probe, target });
    }

    /// Record a probe result; on failure the remaining steps are skipped
    fn settle(&mut self, result: ProbeResult, sink: &mut dyn EventSink) -> bool {
        let probe = result.probe;
        let passed = self.state.complete_step(&result);

        if passed {
            sink.emit(RunEvent::ProbePassed {
                result,
                role: self.config.role,
            });
            return true;
        }

        warn!(
            "{} probe failed: {}",
            probe,
            result
                .error
                .as_ref()
                .map(ProbeError::to_string)
                .unwrap_or_default()
        );
        sink.emit(RunEvent::ProbeFailed { result });

        let reason = format!("{} failed", probe.label());
        for skipped in self.state.skip_remaining(&reason) {
            sink.emit(RunEvent::ProbeSkipped {
                probe: skipped,
                reason: reason.clone(),
            });
        }
        false
    }

    fn finish(mut self, sink: &mut dyn EventSink) -> SmokeReport {
        self.state.finish();
        let summary = self.state.summary();
        info!(
            "run {} finished at {} ({} passed, {} failed, {} skipped)",
            self.state.run_id, self.state.stage, summary.passed, summary.failed, summary.skipped
        );

        sink.emit(RunEvent::RunFinished {
            stage: self.state.stage,
            failed_probe: self.state.failed_probe(),
            summary: summary.clone(),
        });

        SmokeReport {
            run_id: self.state.run_id,
            stage: self.state.stage,
            steps: self.state.steps,
            summary,
            login_email: self.login_email,
            access_token: self.access_token,
        }
    }
}
