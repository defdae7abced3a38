//! Integration tests for the CLI login flow over real HTTP

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;
use stackauth_login_core::{
    ApiClient, CliAuthError, CliLogin, ClientConfig, HttpTransport, LoginOptions, NoopOpener,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new("https://app.example.com", "proj-1", "pck_abc").with_base_url(server.uri())
}

fn fast_options() -> LoginOptions {
    LoginOptions {
        poll_interval: Duration::from_millis(10),
        ..LoginOptions::default()
    }
}

#[tokio::test]
async fn test_full_login_against_mock_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/cli"))
        .and(header("x-stack-project-id", "proj-1"))
        .and(header("x-stack-access-type", "client"))
        .and(header("x-stack-publishable-client-key", "pck_abc"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "expires_in_millis": 7_200_000 })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "polling_code": "p1", "login_code": "l1" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let poll_count = Arc::new(AtomicUsize::new(0));
    let counter = poll_count.clone();

    // Two waiting responses, then the token
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/cli/poll"))
        .and(body_json(json!({ "polling_code": "p1" })))
        .respond_with(move |_req: &wiremock::Request| {
            let count = counter.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                ResponseTemplate::new(200).set_body_json(json!({ "status": "waiting" }))
            } else {
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "status": "success", "refresh_token": "rt-1" }))
            }
        })
        .expect(3)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().expect("transport");
    let login = CliLogin::new(&config_for(&mock_server), transport, NoopOpener)
        .expect("valid config")
        .with_options(fast_options());

    let token = login.login().await.expect("login succeeds");

    assert_eq!(token, "rt-1");
    assert_eq!(poll_count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_start_session_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/cli"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&config_for(&mock_server), HttpTransport::new().unwrap()).unwrap();
    let err = client
        .start_session(Duration::from_secs(60))
        .await
        .unwrap_err();

    match err {
        CliAuthError::Remote { status, body } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "database unavailable");
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_poll_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/cli/poll"))
        .respond_with(ResponseTemplate::new(404).set_body_string("unknown polling code"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let login = CliLogin::new(
        &config_for(&mock_server),
        HttpTransport::new().unwrap(),
        NoopOpener,
    )
    .unwrap()
    .with_options(fast_options());

    let err = login.poll_until_resolved("p1").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_complete_then_poll_hands_out_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/cli/complete"))
        .and(body_json(json!({ "login_code": "l1", "refresh_token": "rt-7" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/cli/poll"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "status": "success", "refresh_token": "rt-7" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&config_for(&mock_server), HttpTransport::new().unwrap()).unwrap();
    client.complete_session("l1", "rt-7").await.unwrap();

    let polled = client.poll("p1").await.unwrap();
    assert_eq!(polled.refresh_token.as_deref(), Some("rt-7"));
}

#[tokio::test]
async fn test_non_json_success_body_is_protocol_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/cli"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&config_for(&mock_server), HttpTransport::new().unwrap()).unwrap();
    let err = client
        .start_session(Duration::from_secs(60))
        .await
        .unwrap_err();

    assert!(matches!(err, CliAuthError::Protocol(_)));
}
