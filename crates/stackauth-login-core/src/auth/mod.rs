//! CLI login flow and the browser launch it relies on.
//!
//! This module provides:
//! - `CliLogin`: start a session, send the user to confirm, poll for the token
//! - `Opener`: how the confirmation URL reaches a browser
//!
//! Tokens are returned to the caller and never stored here.

pub mod login;
pub mod opener;

pub use login::{build_confirmation_url, CliLogin};
pub use opener::{BrowserOpener, NoopOpener, Opener};
