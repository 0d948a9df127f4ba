//! HTTP probes against the auth service.
//!
//! Each probe is one request with a single accepted status code. Failures
//! never escape as `Err`; they come back inside a [`ProbeResult`].

pub mod client;
pub mod envelope;
pub mod error;
pub mod identity;

use serde_json::Value;
use std::fmt;
use std::time::Instant;

pub use client::AuthClient;
pub use error::ProbeError;
pub use identity::{LoginRequest, RegisteredIdentity, RegistrationRequest, Role, TEST_PASSWORD};

/// Which step of the smoke test a result belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Health,
    Registration,
    Login,
}

impl ProbeKind {
    /// All probes in execution order
    pub const SEQUENCE: [ProbeKind; 3] =
        [ProbeKind::Health, ProbeKind::Registration, ProbeKind::Login];

    /// Human label for console output
    pub fn label(&self) -> &'static str {
        match self {
            ProbeKind::Health => "Health check",
            ProbeKind::Registration => "Registration",
            ProbeKind::Login => "Login",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeKind::Health => "health",
            ProbeKind::Registration => "registration",
            ProbeKind::Login => "login",
        };
        f.write_str(name)
    }
}

/// Outcome of one probe
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub probe: ProbeKind,
    pub success: bool,
    /// HTTP status, absent when the request never got a response
    pub status: Option<u16>,
    /// Parsed JSON body, absent when the body was empty or not JSON
    pub body: Option<Value>,
    /// Raw body text, kept for diagnostics when it is not JSON
    pub raw_body: Option<String>,
    pub error: Option<ProbeError>,
    pub duration_ms: u64,
}

impl ProbeResult {
    pub(crate) fn passed(
        probe: ProbeKind,
        status: u16,
        body: Option<Value>,
        raw_body: String,
        started: Instant,
    ) -> Self {
        Self {
            probe,
            success: true,
            status: Some(status),
            body,
            raw_body: Some(raw_body),
            error: None,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    pub(crate) fn failed(
        probe: ProbeKind,
        status: Option<u16>,
        body: Option<Value>,
        raw_body: Option<String>,
        error: ProbeError,
        started: Instant,
    ) -> Self {
        Self {
            probe,
            success: false,
            status,
            body,
            raw_body,
            error: Some(error),
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    /// Downgrade a passed result, e.g. when a required field is missing
    pub fn fail(&mut self, error: ProbeError) {
        self.success = false;
        self.error = Some(error);
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// What the server said about the failure: `message`/`error` from the
    /// JSON body, else the raw body text
    pub fn server_detail(&self) -> Option<String> {
        self.body
            .as_ref()
            .and_then(envelope::error_message)
            .or_else(|| {
                self.raw_body
                    .as_deref()
                    .map(str::trim)
                    .filter(|b| !b.is_empty())
                    .map(str::to_string)
            })
    }

    pub fn field_str(&self, path: &str) -> Option<&str> {
        self.body.as_ref().and_then(|b| envelope::lookup_str(b, path))
    }

    pub fn field_display(&self, path: &str) -> Option<String> {
        self.body
            .as_ref()
            .and_then(|b| envelope::lookup_display(b, path))
    }

    /// `data.user.email` from a registration or login response
    pub fn user_email(&self) -> Option<&str> {
        self.field_str(envelope::USER_EMAIL)
    }

    /// `data.user.id`; numeric ids are rendered as text
    pub fn user_id(&self) -> Option<String> {
        self.field_display(envelope::USER_ID)
    }

    pub fn user_role(&self) -> Option<&str> {
        self.field_str(envelope::USER_ROLE)
    }

    /// `data.tokens.accessToken` from a login response
    pub fn access_token(&self) -> Option<&str> {
        self.field_str(envelope::ACCESS_TOKEN)
    }

    /// Identity confirmed by a successful registration
    pub fn registered_identity(&self, password: &str) -> Result<RegisteredIdentity, ProbeError> {
        let body = self.body.as_ref().ok_or_else(|| ProbeError::MissingField {
            path: envelope::USER_EMAIL.to_string(),
        })?;
        let email = envelope::require_str(body, envelope::USER_EMAIL)?;

        Ok(RegisteredIdentity {
            id: self.user_id(),
            email: email.to_string(),
            password: password.to_string(),
            role: self.user_role().map(str::to_string),
        })
    }
}
