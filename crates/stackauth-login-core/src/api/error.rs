use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliAuthError {
    #[error("Missing required configuration: {0}")]
    Configuration(&'static str),

    #[error("Unexpected response from auth service (status {status}): {body}")]
    Remote { status: StatusCode, body: String },

    #[error("Invalid response from auth service: {0}")]
    Protocol(String),

    #[error("CLI authentication request expired. Please try again.")]
    Expired,

    #[error("This authentication token has already been used.")]
    AlreadyUsed,

    #[error("Timed out waiting for CLI authentication after {attempts} attempts")]
    TimedOut { attempts: u32 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl CliAuthError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        CliAuthError::Remote {
            status,
            body: Self::truncate_body(body),
        }
    }

    /// HTTP status carried by a remote error, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CliAuthError::Remote { status, .. } => Some(*status),
            CliAuthError::Network(e) => e.status(),
            _ => None,
        }
    }
}
