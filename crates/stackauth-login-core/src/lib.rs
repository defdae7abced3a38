//! Stack Auth CLI login.
//!
//! This crate implements the browser-confirmed polling login used by
//! command-line tools: start a CLI auth session, send the user to the
//! confirmation page, and poll until the session hands back a refresh token.
//!
//! The HTTP layer sits behind [`Transport`] and the browser launch behind
//! [`Opener`], so the flow can run against fakes in tests.

pub mod api;
pub mod auth;
pub mod config;

pub use api::{ApiClient, CliAuthError, HttpTransport, Transport};
pub use auth::{build_confirmation_url, BrowserOpener, CliLogin, NoopOpener, Opener};
pub use config::{ClientConfig, LoginOptions, DEFAULT_BASE_URL};
