//! Client configuration for the CLI login flow.
//!
//! Everything here is supplied by the caller. The library never reads
//! environment variables or config files on its own.

use std::time::Duration;

use crate::api::CliAuthError;

/// Default Stack Auth API host
pub const DEFAULT_BASE_URL: &str = "https://api.stack-auth.com";

/// Default lifetime requested for a pending CLI session (2 hours)
const DEFAULT_EXPIRES_IN: Duration = Duration::from_secs(2 * 60 * 60);

/// Default wait between poll requests
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Project credentials and endpoints used by every request.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub app_url: String,
    pub project_id: String,
    pub publishable_client_key: String,
}

impl ClientConfig {
    pub fn new(
        app_url: impl Into<String>,
        project_id: impl Into<String>,
        publishable_client_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_url: app_url.into(),
            project_id: project_id.into(),
            publishable_client_key: publishable_client_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Check the fields needed to talk to the API (base URL and project credentials).
    pub fn validate_api(&self) -> Result<(), CliAuthError> {
        require("base_url", &self.base_url)?;
        require("project_id", &self.project_id)?;
        require("publishable_client_key", &self.publishable_client_key)?;
        Ok(())
    }

    /// Check everything the full login flow needs, including the app URL.
    pub fn validate(&self) -> Result<(), CliAuthError> {
        self.validate_api()?;
        require("app_url", &self.app_url)
    }
}

fn require(field: &'static str, value: &str) -> Result<(), CliAuthError> {
    if value.trim().is_empty() {
        return Err(CliAuthError::Configuration(field));
    }
    Ok(())
}

/// Tunables for a single login attempt.
#[derive(Debug, Clone)]
pub struct LoginOptions {
    /// Lifetime requested for the pending session on the server
    pub expires_in: Duration,
    /// Wait between poll requests
    pub poll_interval: Duration,
    /// Optional client-side cap on poll requests. `None` polls until the
    /// server reports a terminal status.
    pub max_attempts: Option<u32>,
}

impl Default for LoginOptions {
    fn default() -> Self {
        Self {
            expires_in: DEFAULT_EXPIRES_IN,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ClientConfig {
        ClientConfig::new("https://app.example.com", "proj", "pck_123")
    }

    #[test]
    fn defaults_to_hosted_api() {
        assert_eq!(valid().base_url, DEFAULT_BASE_URL);
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn rejects_each_missing_field() {
        let cases: [(&str, fn(&mut ClientConfig)); 4] = [
            ("base_url", |c| c.base_url.clear()),
            ("project_id", |c| c.project_id.clear()),
            ("publishable_client_key", |c| c.publishable_client_key = "   ".into()),
            ("app_url", |c| c.app_url.clear()),
        ];

        for (field, mutate) in cases {
            let mut config = valid();
            mutate(&mut config);
            match config.validate() {
                Err(CliAuthError::Configuration(name)) => assert_eq!(name, field),
                other => panic!("expected configuration error for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn api_validation_ignores_app_url() {
        let mut config = valid();
        config.app_url.clear();
        assert!(config.validate_api().is_ok());
    }

    #[test]
    fn login_option_defaults() {
        let options = LoginOptions::default();
        assert_eq!(options.expires_in, Duration::from_millis(7_200_000));
        assert_eq!(options.poll_interval, Duration::from_secs(2));
        assert!(options.max_attempts.is_none());
    }
}
