use colored::Colorize;
use std::io::{self, Write};

use crate::probe::{ProbeKind, ProbeResult, Role};
use crate::runner::{EventSink, RunEvent, RunStage, RunSummary, SmokeReport, StepStatus};

/// Characters of the access token shown on screen
pub const TOKEN_PREVIEW_CHARS: usize = 20;

/// Shown when the login response carried no token
pub const NO_TOKEN: &str = "<no token>";

/// First [`TOKEN_PREVIEW_CHARS`] characters of the token plus an ellipsis
pub fn format_token(token: Option<&str>) -> String {
    match token {
        Some(t) if !t.is_empty() => {
            let preview: String = t.chars().take(TOKEN_PREVIEW_CHARS).collect();
            format!("{}...", preview)
        }
        _ => NO_TOKEN.to_string(),
    }
}

fn step_mark(report: &SmokeReport, probe: ProbeKind) -> &'static str {
    match report.step(probe).map(|s| &s.status) {
        Some(StepStatus::Passed) => "✅",
        Some(StepStatus::Failed { .. }) => "❌",
        Some(StepStatus::Skipped { .. }) => "⏭",
        _ => "-",
    }
}

/// Prints run events, to stdout unless another writer is given.
/// Write errors are dropped; a broken console must not fail the run.
pub struct ConsoleReporter<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Per-role result table and the role-to-dashboard map
    pub fn print_sweep(&mut self, runs: &[(Role, SmokeReport)]) {
        writeln!(self.out, "\n📊 Role summary:\n").ok();
        for (role, report) in runs {
            writeln!(
                self.out,
                "   {:<20} - Health: {} | Registration: {} | Login: {}",
                role.as_str(),
                step_mark(report, ProbeKind::Health),
                step_mark(report, ProbeKind::Registration),
                step_mark(report, ProbeKind::Login)
            )
            .ok();
        }

        let passed = runs.iter().filter(|(_, r)| r.is_success()).count();
        writeln!(
            self.out,
            "\n📈 Roles: {} passed, {} failed",
            passed.to_string().green(),
            (runs.len() - passed).to_string().red()
        )
        .ok();

        writeln!(self.out, "\n🗺️  Role-to-Dashboard Mapping:\n").ok();
        for role in Role::ALL {
            writeln!(self.out, "   {:<20} → {}", role.as_str(), role.dashboard()).ok();
        }
        writeln!(self.out).ok();
    }

    fn probe_started(&mut self, probe: ProbeKind, target: &str) {
        let (icon, action) = match probe {
            ProbeKind::Health => ("🩺", "Checking service health at"),
            ProbeKind::Registration => ("📝", "Registering"),
            ProbeKind::Login => ("🔐", "Logging in as"),
        };
        writeln!(
            self.out,
            "\n{} {} {}...",
            icon.to_string().blue(),
            action,
            target.cyan()
        )
        .ok();
    }

    fn probe_passed(&mut self, result: &ProbeResult, role: Role) {
        writeln!(
            self.out,
            "{} {} passed (HTTP {}, {}ms)",
            "✅".green(),
            result.probe.label(),
            result.status.unwrap_or_default(),
            result.duration_ms
        )
        .ok();

        match result.probe {
            ProbeKind::Health => {
                if let Some(body) = &result.body {
                    writeln!(self.out, "   Response: {}", body).ok();
                }
            }
            ProbeKind::Registration => {
                let echoed_role = result.user_role();
                let dashboard = echoed_role
                    .and_then(Role::from_tag)
                    .unwrap_or(role)
                    .dashboard();
                writeln!(
                    self.out,
                    "   User ID: {}",
                    result.user_id().unwrap_or_else(|| "None".to_string())
                )
                .ok();
                writeln!(
                    self.out,
                    "   Email: {}",
                    result.user_email().unwrap_or("None")
                )
                .ok();
                writeln!(
                    self.out,
                    "   Role: {}",
                    echoed_role.unwrap_or(role.as_str())
                )
                .ok();
                writeln!(self.out, "   Expected redirect: {}", dashboard.cyan()).ok();
            }
            ProbeKind::Login => {
                if let Some(role) = result.user_role() {
                    writeln!(self.out, "   Role: {}", role).ok();
                }
                writeln!(
                    self.out,
                    "   Access token: {}",
                    format_token(result.access_token()).dimmed()
                )
                .ok();
            }
        }
    }

    fn probe_failed(&mut self, result: &ProbeResult) {
        writeln!(self.out, "{} {} failed", "❌".red(), result.probe.label()).ok();
        if let Some(status) = result.status {
            writeln!(self.out, "   Status: {}", status.to_string().red()).ok();
        }
        if let Some(error) = result.error_message() {
            writeln!(self.out, "   Error: {}", error).ok();
        }
        if let Some(detail) = result.server_detail() {
            writeln!(self.out, "   Server: {}", detail).ok();
        }
        if let Some(body) = &result.body {
            writeln!(self.out, "   Response: {}", body).ok();
        }
    }

    fn run_finished(
        &mut self,
        stage: RunStage,
        failed_probe: Option<ProbeKind>,
        summary: &RunSummary,
    ) {
        writeln!(self.out, "\n{} Smoke test finished", "■".blue().bold()).ok();
        writeln!(
            self.out,
            "  {} passed, {} failed, {} skipped",
            summary.passed.to_string().green(),
            summary.failed.to_string().red(),
            summary.skipped.to_string().yellow()
        )
        .ok();
        if let Some(duration) = summary.total_duration_ms {
            writeln!(self.out, "  Duration: {}ms", duration).ok();
        }

        if stage == RunStage::Done {
            writeln!(self.out, "\n{} All auth probes passed!\n", "✨".green().bold()).ok();
        } else {
            let at = failed_probe
                .map(|p| p.label().to_lowercase())
                .unwrap_or_else(|| stage.to_string());
            writeln!(
                self.out,
                "\n{} Smoke test aborted at {}\n",
                "💥".red().bold(),
                at.red().bold()
            )
            .ok();
        }
    }
}

impl<W: Write> EventSink for ConsoleReporter<W> {
    fn emit(&mut self, event: RunEvent) {
        match event {
            RunEvent::RunStarted { run_id, base_url } => {
                writeln!(
                    self.out,
                    "{} Starting auth smoke test: {}",
                    "▶".green().bold(),
                    run_id.cyan()
                )
                .ok();
                writeln!(self.out, "  Backend: {}", base_url.cyan()).ok();
            }
            RunEvent::ProbeStarted { probe, target } => self.probe_started(probe, &target),
            RunEvent::ProbePassed { result, role } => self.probe_passed(&result, role),
            RunEvent::ProbeFailed { result } => self.probe_failed(&result),
            RunEvent::ProbeSkipped { probe, reason } => {
                writeln!(
                    self.out,
                    "   {} {} skipped: {}",
                    "⏭".yellow(),
                    probe.label(),
                    reason.yellow()
                )
                .ok();
            }
            RunEvent::Waiting { duration } => {
                writeln!(
                    self.out,
                    "\n{} Waiting {:?} before login...",
                    "⏳".to_string().blue(),
                    duration
                )
                .ok();
            }
            RunEvent::RunFinished {
                stage,
                failed_probe,
                summary,
            } => self.run_finished(stage, failed_probe, &summary),
        }
        self.out.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{run_role_sweep, run_smoke_test};
    use crate::test_support::{self, StubBehavior};
    use crate::utils::config::Config;
    use std::time::Duration;

    fn config_for(base_url: &str) -> Config {
        Config {
            base_url: base_url.to_string(),
            login_delay: Duration::ZERO,
            ..Config::default()
        }
    }

    fn captured(reporter: ConsoleReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_format_token_truncates() {
        let token = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.payload";
        assert_eq!(format_token(Some(token)), "eyJhbGciOiJIUzI1NiIs...");
        assert_eq!(format_token(Some(token)).len(), TOKEN_PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_format_token_exactly_twenty() {
        let token = "abcdefghijklmnopqrst";
        assert_eq!(format_token(Some(token)), "abcdefghijklmnopqrst...");
    }

    #[test]
    fn test_format_token_short() {
        assert_eq!(format_token(Some("abc")), "abc...");
    }

    #[test]
    fn test_format_token_absent() {
        assert_eq!(format_token(None), NO_TOKEN);
        assert_eq!(format_token(Some("")), NO_TOKEN);
    }

    #[tokio::test]
    async fn test_success_banner_and_missing_token() {
        let stub = test_support::spawn(StubBehavior {
            token: None,
            ..StubBehavior::default()
        })
        .await;
        let mut reporter = ConsoleReporter::with_writer(Vec::new());

        let report = run_smoke_test(&config_for(&stub.base_url), &mut reporter)
            .await
            .unwrap();
        let output = captured(reporter);

        assert!(report.is_success());
        assert!(output.contains("All auth probes passed!"));
        assert!(output.contains("Access token: "));
        assert!(output.contains(NO_TOKEN));
        assert!(output.contains("Expected redirect: "));
        assert!(output.contains("/landlord"));
        assert!(!output.contains("aborted"));
    }

    #[tokio::test]
    async fn test_failure_output_names_step_and_server_error() {
        let stub = test_support::spawn(StubBehavior {
            register_status: 409,
            ..StubBehavior::default()
        })
        .await;
        let mut reporter = ConsoleReporter::with_writer(Vec::new());

        run_smoke_test(&config_for(&stub.base_url), &mut reporter)
            .await
            .unwrap();
        let output = captured(reporter);

        assert!(output.contains("Registration failed"));
        assert!(output.contains("Email already registered"));
        assert!(output.contains("Login skipped"));
        assert!(output.contains("Smoke test aborted at"));
        assert!(!output.contains("All auth probes passed!"));
    }

    #[tokio::test]
    async fn test_sweep_table_and_dashboard_map() {
        let stub = test_support::spawn(StubBehavior::default()).await;
        let mut reporter = ConsoleReporter::with_writer(Vec::new());

        let runs = run_role_sweep(
            &config_for(&stub.base_url),
            &[Role::Landlord, Role::CompanyAdmin],
            &mut reporter,
        )
        .await
        .unwrap();
        reporter.print_sweep(&runs);
        let output = captured(reporter);

        assert!(output.contains(&format!(
            "{:<20} - Health: ✅ | Registration: ✅ | Login: ✅",
            "company_admin"
        )));
        assert!(output.contains(&format!("{:<20} → /management", "property_manager")));
        assert!(output.contains(&format!("{:<20} → /company", "company_admin")));
    }
}
