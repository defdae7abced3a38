//! API client for the Stack Auth CLI login endpoints.
//!
//! This module provides the `ApiClient` struct, which attaches the project
//! headers to each request and turns raw responses into typed results.

use std::fmt;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::transport::{ApiRequest, ApiResponse, Transport};
use super::CliAuthError;
use crate::config::ClientConfig;

// ============================================================================
// Constants
// ============================================================================

/// Path prefix shared by every endpoint
const API_PREFIX: &str = "/api/v1";

const START_SESSION_PATH: &str = "/auth/cli";
const POLL_PATH: &str = "/auth/cli/poll";
const COMPLETE_PATH: &str = "/auth/cli/complete";

const PROJECT_ID_HEADER: &str = "x-stack-project-id";
const ACCESS_TYPE_HEADER: &str = "x-stack-access-type";
const PUBLISHABLE_KEY_HEADER: &str = "x-stack-publishable-client-key";

/// The CLI flow always authenticates as a client app
const ACCESS_TYPE_CLIENT: &str = "client";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct StartSessionRequest {
    expires_in_millis: u64,
}

#[derive(Debug, Deserialize)]
struct StartSessionResponse {
    polling_code: Option<String>,
    login_code: Option<String>,
}

#[derive(Serialize)]
struct PollRequest<'a> {
    polling_code: &'a str,
}

#[derive(Serialize)]
struct CompleteRequest<'a> {
    login_code: &'a str,
    refresh_token: &'a str,
}

/// Codes issued for one pending CLI login.
#[derive(Clone, PartialEq, Eq)]
pub struct CliSession {
    /// Used by this process to poll; never shown to the user
    pub polling_code: String,
    /// Embedded in the confirmation URL opened in the browser
    pub login_code: String,
}

// Both codes are bearer secrets for the lifetime of the session
impl fmt::Debug for CliSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliSession")
            .field("polling_code", &"<redacted>")
            .field("login_code", &"<redacted>")
            .finish()
    }
}

/// Session state reported by the poll endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    /// The user has not confirmed yet
    Waiting,
    Success,
    Expired,
    /// The refresh token was already handed out to an earlier poll
    Used,
    Other(String),
}

impl From<&str> for PollStatus {
    fn from(status: &str) -> Self {
        match status {
            "waiting" | "pending" => PollStatus::Waiting,
            "success" => PollStatus::Success,
            "expired" => PollStatus::Expired,
            "used" => PollStatus::Used,
            other => PollStatus::Other(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for PollStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(PollStatus::from(raw.as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollResponse {
    pub status: PollStatus,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Client for the CLI auth endpoints of one project.
#[derive(Clone)]
pub struct ApiClient<T> {
    transport: T,
    base_url: String,
    headers: HeaderMap,
}

impl<T: Transport> ApiClient<T> {
    /// Create a client, failing before any network activity if the base URL
    /// or project credentials are missing.
    pub fn new(config: &ClientConfig, transport: T) -> Result<Self, CliAuthError> {
        config.validate_api()?;
        Ok(Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers: Self::project_headers(config)?,
        })
    }

    fn project_headers(config: &ClientConfig) -> Result<HeaderMap, CliAuthError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            PROJECT_ID_HEADER,
            HeaderValue::from_str(&config.project_id)
                .map_err(|_| CliAuthError::Configuration("project_id"))?,
        );
        headers.insert(ACCESS_TYPE_HEADER, HeaderValue::from_static(ACCESS_TYPE_CLIENT));
        let mut key = HeaderValue::from_str(&config.publishable_client_key)
            .map_err(|_| CliAuthError::Configuration("publishable_client_key"))?;
        key.set_sensitive(true);
        headers.insert(PUBLISHABLE_KEY_HEADER, key);
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// POST a JSON body and return the response if its status is one of `accepted`.
    async fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        accepted: &[StatusCode],
    ) -> Result<ApiResponse, CliAuthError> {
        let body = serde_json::to_value(body)
            .map_err(|e| CliAuthError::Protocol(format!("Failed to encode request body: {}", e)))?;
        let request = ApiRequest {
            method: Method::POST,
            url: self.url(path),
            headers: self.headers.clone(),
            body,
        };

        let response = self.transport.send(request).await?;
        Self::check_response(response, accepted)
    }

    /// Check that the status is accepted, returning an error with body if not.
    fn check_response(
        response: ApiResponse,
        accepted: &[StatusCode],
    ) -> Result<ApiResponse, CliAuthError> {
        if accepted.contains(&response.status) {
            Ok(response)
        } else {
            Err(CliAuthError::from_status(response.status, &response.body))
        }
    }

    fn parse<R: DeserializeOwned>(response: &ApiResponse, what: &str) -> Result<R, CliAuthError> {
        serde_json::from_str(&response.body)
            .map_err(|e| CliAuthError::Protocol(format!("Failed to parse {} response: {}", what, e)))
    }

    /// Register a pending CLI login and receive its polling and login codes.
    pub async fn start_session(&self, expires_in: Duration) -> Result<CliSession, CliAuthError> {
        let body = StartSessionRequest {
            expires_in_millis: u64::try_from(expires_in.as_millis()).unwrap_or(u64::MAX),
        };
        let response = self.post(START_SESSION_PATH, &body, &[StatusCode::OK]).await?;
        let parsed: StartSessionResponse = Self::parse(&response, "start session")?;

        let polling_code = parsed
            .polling_code
            .ok_or_else(|| CliAuthError::Protocol("missing polling_code".to_string()))?;
        let login_code = parsed
            .login_code
            .ok_or_else(|| CliAuthError::Protocol("missing login_code".to_string()))?;

        debug!(expires_in_millis = body.expires_in_millis, "CLI auth session started");
        Ok(CliSession {
            polling_code,
            login_code,
        })
    }

    /// Ask once whether the pending session has been confirmed.
    /// Both 200 and 201 count as a processed poll.
    pub async fn poll(&self, polling_code: &str) -> Result<PollResponse, CliAuthError> {
        let body = PollRequest { polling_code };
        let response = self
            .post(POLL_PATH, &body, &[StatusCode::OK, StatusCode::CREATED])
            .await?;
        Self::parse(&response, "poll")
    }

    /// Attach a refresh token to a pending session, as the confirmation page does.
    pub async fn complete_session(
        &self,
        login_code: &str,
        refresh_token: &str,
    ) -> Result<(), CliAuthError> {
        let body = CompleteRequest {
            login_code,
            refresh_token,
        };
        self.post(COMPLETE_PATH, &body, &[StatusCode::OK]).await?;
        debug!("CLI auth session completed");
        Ok(())
    }
}
