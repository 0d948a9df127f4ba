use clap::Parser;
use std::process::ExitCode;

use auth_smoke::{probe::Role, report::ConsoleReporter, runner, utils::config::Config};

#[derive(Parser)]
#[command(name = "auth-smoke")]
#[command(version)]
#[command(about = "Smoke test the auth service: health, register, login", long_about = None)]
struct Cli {
    /// Role tag sent with the registration request. Repeat to run the
    /// sequence once per role.
    #[arg(short, long, value_enum, default_values_t = vec![Role::Landlord])]
    role: Vec<Role>,

    /// Exit with status 1 when any run aborts (default: always exit 0)
    #[arg(long, default_value = "false")]
    strict_exit: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config {
        strict_exit: cli.strict_exit,
        ..Config::default()
    };

    let mut reporter = ConsoleReporter::new();
    let runs = runner::run_role_sweep(&config, &cli.role, &mut reporter).await?;
    reporter.print_sweep(&runs);

    let all_passed = runs.iter().all(|(_, report)| report.is_success());
    if config.strict_exit && !all_passed {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}
