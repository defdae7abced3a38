//! The browser-confirmed CLI login flow.
//!
//! 1. Start a CLI auth session and receive a polling code and a login code.
//! 2. Send the user to the app's confirmation page with the login code.
//! 3. Poll with the polling code until the session yields a refresh token.

use std::io::{self, Write};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::Opener;
use crate::api::{ApiClient, CliAuthError, CliSession, PollStatus, Transport};
use crate::config::{ClientConfig, LoginOptions};

/// Path of the confirmation page served by the app
const CONFIRM_PATH: &str = "/handler/cli-auth-confirm";

/// Build the URL the user opens to approve the login.
/// The login code is percent-encoded as a query value.
pub fn build_confirmation_url(app_url: &str, login_code: &str) -> String {
    format!(
        "{}{}?login_code={}",
        app_url.trim_end_matches('/'),
        CONFIRM_PATH,
        urlencoding::encode(login_code)
    )
}

pub struct CliLogin<T, O> {
    api: ApiClient<T>,
    app_url: String,
    opener: O,
    options: LoginOptions,
}

impl<T: Transport, O: Opener> CliLogin<T, O> {
    /// Validates the whole configuration up front, so a missing app URL or
    /// project credential fails before any request is sent.
    pub fn new(config: &ClientConfig, transport: T, opener: O) -> Result<Self, CliAuthError> {
        config.validate()?;
        Ok(Self {
            api: ApiClient::new(config, transport)?,
            app_url: config.app_url.clone(),
            opener,
            options: LoginOptions::default(),
        })
    }

    pub fn with_options(mut self, options: LoginOptions) -> Self {
        self.options = options;
        self
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    pub fn options(&self) -> &LoginOptions {
        &self.options
    }

    /// Run the full flow and return the refresh token.
    /// The confirmation URL is printed to stderr.
    pub async fn login(&self) -> Result<String, CliAuthError> {
        let session = self.start_session().await?;
        let url = self.confirmation_url(&session);
        self.request_user_confirmation(&url, &mut io::stderr());
        self.poll_until_resolved(&session.polling_code).await
    }

    pub async fn start_session(&self) -> Result<CliSession, CliAuthError> {
        let session = self.api.start_session(self.options.expires_in).await?;
        info!("CLI login session started");
        Ok(session)
    }

    pub fn confirmation_url(&self, session: &CliSession) -> String {
        build_confirmation_url(&self.app_url, &session.login_code)
    }

    /// Try to open the browser and always print the URL as a fallback.
    /// Nothing here can fail the login; the poll loop runs either way.
    pub fn request_user_confirmation<W: Write>(&self, url: &str, out: &mut W) {
        if let Err(e) = self.opener.open(url) {
            warn!(error = %e, "Could not open browser");
        }
        if let Err(e) = writeln!(
            out,
            "Please visit the following URL to authenticate:\n{}",
            url
        ) {
            warn!(error = %e, "Could not print confirmation URL");
        }
    }

    /// Poll until the session resolves.
    ///
    /// `waiting`/`pending` and unrecognized statuses wait one poll interval and
    /// try again. `expired` and `used` are terminal. Any HTTP status other than
    /// 200/201 ends the loop immediately.
    pub async fn poll_until_resolved(&self, polling_code: &str) -> Result<String, CliAuthError> {
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let polled = self.api.poll(polling_code).await?;

            match polled.status {
                PollStatus::Success => {
                    info!(attempts, "CLI login confirmed");
                    return polled.refresh_token.ok_or_else(|| {
                        CliAuthError::Protocol("missing refresh_token in success response".to_string())
                    });
                }
                PollStatus::Expired => return Err(CliAuthError::Expired),
                PollStatus::Used => return Err(CliAuthError::AlreadyUsed),
                PollStatus::Waiting => {
                    debug!(attempts, "CLI login still waiting for confirmation");
                }
                PollStatus::Other(status) => {
                    debug!(attempts, status = %status, "Unrecognized poll status, continuing");
                }
            }

            if self.options.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(CliAuthError::TimedOut { attempts });
            }

            sleep(self.options.poll_interval).await;
        }
    }
}
