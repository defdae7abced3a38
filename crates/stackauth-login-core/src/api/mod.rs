//! REST API client module for the Stack Auth CLI login endpoints.
//!
//! This module provides the `ApiClient` for the three endpoints the CLI
//! flow touches (start, poll, complete), the `Transport` seam it sends
//! through, and the `CliAuthError` type shared by the whole crate.
//!
//! Requests authenticate as a client app using the project ID and the
//! publishable client key.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{ApiClient, CliSession, PollResponse, PollStatus};
pub use error::CliAuthError;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
