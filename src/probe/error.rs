use std::error::Error as _;
use std::time::Duration;
use thiserror::Error;

/// Why a probe did not pass
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    #[error("request timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("expected HTTP {expected}, got HTTP {actual}")]
    UnexpectedStatus { expected: u16, actual: u16 },

    #[error("response body is not valid JSON: {0}")]
    InvalidBody(String),

    #[error("response is missing `{path}`")]
    MissingField { path: String },
}

impl ProbeError {
    pub(crate) fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return ProbeError::Timeout { after: timeout };
        }

        // reqwest's top-level message hides the interesting part (refused, DNS)
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ProbeError::Transport(message)
    }
}
