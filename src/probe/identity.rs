//! Ephemeral test identity
//!
//! Each run registers a fresh account. The email carries a millisecond
//! timestamp so repeated runs never hit the service's uniqueness check.

use chrono::Utc;
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// Password used for every generated account
pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Role tag sent with the registration request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Role {
    #[default]
    Landlord,
    PropertyManager,
    CompanyAdmin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Landlord, Role::PropertyManager, Role::CompanyAdmin];

    /// Tag as the service spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Landlord => "landlord",
            Role::PropertyManager => "property_manager",
            Role::CompanyAdmin => "company_admin",
        }
    }

    /// Parse a role tag echoed back by the service
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "landlord" => Some(Role::Landlord),
            "property_manager" => Some(Role::PropertyManager),
            "company_admin" => Some(Role::CompanyAdmin),
            _ => None,
        }
    }

    /// Dashboard the frontend redirects this role to after login
    pub fn dashboard(&self) -> &'static str {
        match self {
            Role::Landlord => "/landlord",
            Role::PropertyManager => "/management",
            Role::CompanyAdmin => "/company",
        }
    }

    fn first_name(&self) -> &'static str {
        match self {
            Role::Landlord => "John",
            Role::PropertyManager => "Jane",
            Role::CompanyAdmin => "Bob",
        }
    }

    fn last_name(&self) -> &'static str {
        match self {
            Role::Landlord => "Landlord",
            Role::PropertyManager => "Manager",
            Role::CompanyAdmin => "Company",
        }
    }

    fn phone(&self) -> &'static str {
        match self {
            Role::Landlord => "+1234567890",
            Role::PropertyManager => "+1234567891",
            Role::CompanyAdmin => "+1234567892",
        }
    }

    fn email_prefix(&self) -> &'static str {
        match self {
            Role::Landlord => "landlord",
            Role::PropertyManager => "manager",
            Role::CompanyAdmin => "company",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build a collision-free email from a prefix and a millisecond timestamp
pub fn unique_email(prefix: &str, timestamp_ms: i64) -> String {
    format!("{}-{}@test.com", prefix, timestamp_ms)
}

/// Body of `POST /auth/register`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub role: String,
}

impl RegistrationRequest {
    /// Fresh registration for `role`, stamped with the current time
    pub fn for_role(role: Role) -> Self {
        Self::at(role, Utc::now().timestamp_millis())
    }

    /// Registration for `role` stamped with an explicit timestamp
    pub fn at(role: Role, timestamp_ms: i64) -> Self {
        Self {
            first_name: role.first_name().to_string(),
            last_name: role.last_name().to_string(),
            email: unique_email(role.email_prefix(), timestamp_ms),
            password: TEST_PASSWORD.to_string(),
            phone: role.phone().to_string(),
            role: role.as_str().to_string(),
        }
    }
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Account as confirmed by the registration response
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredIdentity {
    pub id: Option<String>,
    /// Email echoed by the service, which is what login must use
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}
