use std::time::Duration;

use crate::probe::Role;

/// Address of the auth service under test. Health lives at the root,
/// outside the `/api` prefix.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API base URL (registration and login hang off this)
    pub base_url: String,

    /// Timeout for the health probe
    pub health_timeout: Duration,

    /// Timeout for the registration and login probes
    pub request_timeout: Duration,

    /// Pause between registration and login
    pub login_delay: Duration,

    /// Role tag sent on registration
    pub role: Role,

    /// Exit non-zero when the run aborts
    pub strict_exit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            health_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            login_delay: Duration::from_secs(1),
            role: Role::Landlord,
            strict_exit: false,
        }
    }
}
