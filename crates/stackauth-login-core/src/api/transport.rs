//! HTTP transport seam.
//!
//! The login flow only needs "send this JSON, give me status and body",
//! so that is all [`Transport`] exposes. [`HttpTransport`] is the reqwest
//! implementation used outside of tests.

use std::future::Future;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use tracing::debug;

use super::CliAuthError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

pub trait Transport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, CliAuthError>> + Send;
}

/// Transport backed by `reqwest`.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, CliAuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one with custom proxy settings
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, CliAuthError> {
        let response = self
            .client
            .request(request.method.clone(), request.url.as_str())
            .headers(request.headers)
            .json(&request.body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(method = %request.method, url = %request.url, status = %status, "Auth service responded");

        Ok(ApiResponse { status, body })
    }
}
