pub mod probe;
pub mod report;
pub mod runner;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export common items
pub use probe::{AuthClient, ProbeKind, ProbeResult, Role};
pub use report::ConsoleReporter;
pub use runner::{run_smoke_test, SmokeReport};
pub use utils::config::Config;
