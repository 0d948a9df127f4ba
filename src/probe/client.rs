//! Auth service HTTP client
//!
//! Wraps the three endpoints the smoke test touches. Every request carries
//! `Content-Type: application/json` and its own timeout.

use anyhow::{Context, Result};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};

use super::identity::{LoginRequest, RegistrationRequest};
use super::{ProbeError, ProbeKind, ProbeResult};
use crate::utils::config::Config;

/// Suffix stripped from the base URL to reach the service root
const API_SUFFIX: &str = "/api";

/// Service root for a base URL: trailing slash and `/api` suffix removed
pub fn root_url(base_url: &str) -> &str {
    let trimmed = base_url.trim_end_matches('/');
    trimmed.strip_suffix(API_SUFFIX).unwrap_or(trimmed)
}

/// HTTP client for the auth service
pub struct AuthClient {
    /// API base URL (e.g., "http://localhost:5000/api")
    base_url: String,
    client: reqwest::Client,
    health_timeout: Duration,
    request_timeout: Duration,
}

impl AuthClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            health_timeout: config.health_timeout,
            request_timeout: config.request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Health lives at the service root, not under the API prefix
    pub fn health_url(&self) -> String {
        format!("{}/health", root_url(&self.base_url))
    }

    pub fn register_url(&self) -> String {
        format!("{}/auth/register", self.base_url)
    }

    pub fn login_url(&self) -> String {
        format!("{}/auth/login", self.base_url)
    }

    /// `GET /health`, passes on 200 with any body
    pub async fn health(&self) -> ProbeResult {
        let request = self.client.get(self.health_url());
        self.execute(
            ProbeKind::Health,
            request,
            StatusCode::OK,
            self.health_timeout,
            false,
        )
        .await
    }

    /// `POST /auth/register`, passes on 201 with a JSON body
    pub async fn register(&self, payload: &RegistrationRequest) -> ProbeResult {
        let request = self.client.post(self.register_url()).json(payload);
        self.execute(
            ProbeKind::Registration,
            request,
            StatusCode::CREATED,
            self.request_timeout,
            true,
        )
        .await
    }

    /// `POST /auth/login`, passes on 200 with a JSON body
    pub async fn login(&self, email: &str, password: &str) -> ProbeResult {
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = self.client.post(self.login_url()).json(&payload);
        self.execute(
            ProbeKind::Login,
            request,
            StatusCode::OK,
            self.request_timeout,
            true,
        )
        .await
    }

    async fn execute(
        &self,
        probe: ProbeKind,
        request: RequestBuilder,
        expected: StatusCode,
        timeout: Duration,
        require_json: bool,
    ) -> ProbeResult {
        let started = Instant::now();
        debug!("{} probe: sending request (timeout {:?})", probe, timeout);

        let response = match request.timeout(timeout).send().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!("{} probe: request failed: {}", probe, e);
                let error = ProbeError::from_reqwest(&e, timeout);
                return ProbeResult::failed(probe, None, None, None, error, started);
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                let error = ProbeError::from_reqwest(&e, timeout);
                return ProbeResult::failed(
                    probe,
                    Some(status.as_u16()),
                    None,
                    None,
                    error,
                    started,
                );
            }
        };
        debug!(
            "{} probe: HTTP {} in {}ms, body: {}",
            probe,
            status.as_u16(),
            started.elapsed().as_millis(),
            text
        );

        let parsed = serde_json::from_str::<Value>(&text);

        if status != expected {
            let error = ProbeError::UnexpectedStatus {
                expected: expected.as_u16(),
                actual: status.as_u16(),
            };
            return ProbeResult::failed(
                probe,
                Some(status.as_u16()),
                parsed.ok(),
                Some(text),
                error,
                started,
            );
        }

        match parsed {
            Ok(body) => ProbeResult::passed(probe, status.as_u16(), Some(body), text, started),
            Err(_) if !require_json => {
                ProbeResult::passed(probe, status.as_u16(), None, text, started)
            }
            Err(e) => ProbeResult::failed(
                probe,
                Some(status.as_u16()),
                None,
                Some(text),
                ProbeError::InvalidBody(e.to_string()),
                started,
            ),
        }
    }
}
