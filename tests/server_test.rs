use std::sync::Arc;

use mindbeat::config::Settings;
use mindbeat::server::start_api_server;
use mindbeat::spotify::SpotifyAuthClient;
use mindbeat::types::AuthSession;
use serde_json::json;
use tokio::{net::TcpListener, sync::Mutex};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type SharedSession = Arc<Mutex<Option<AuthSession>>>;

// Starts the callback server on a random port and returns its base URL
async fn start(token_server: &MockServer, session: SharedSession) -> String {
    let client = Arc::new(SpotifyAuthClient::new(Settings::for_base_url(&token_server.uri())).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(start_api_server(listener, session, client));
    format!("http://{}", addr)
}

fn pending_session() -> SharedSession {
    Arc::new(Mutex::new(Some(AuthSession {
        code_verifier: "verifier".to_string(),
        state: "expected-state".to_string(),
        credential: None,
        error: None,
    })))
}

#[tokio::test]
async fn test_health() {
    let token_server = MockServer::start().await;
    let base = start(&token_server, Arc::new(Mutex::new(None))).await;

    let body: serde_json::Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["service"], "mindbeat");
    assert_eq!(body["login_pending"], false);
}

#[tokio::test]
async fn test_health_reports_pending_login() {
    let token_server = MockServer::start().await;
    let base = start(&token_server, pending_session()).await;

    let body: serde_json::Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["login_pending"], true);
}

#[tokio::test]
async fn test_callback_rejects_state_mismatch() {
    let token_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&token_server)
        .await;

    let session = pending_session();
    let base = start(&token_server, session.clone()).await;

    let body = reqwest::get(format!("{}/callback?code=abc&state=forged", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Invalid state parameter."));
    let lock = session.lock().await;
    let session = lock.as_ref().unwrap();
    assert!(session.credential.is_none());
}

#[tokio::test]
async fn test_callback_reports_denied_authorization() {
    let token_server = MockServer::start().await;
    let session = pending_session();
    let base = start(&token_server, session.clone()).await;

    reqwest::get(format!("{}/callback?error=access_denied&state=expected-state", base))
        .await
        .unwrap();

    let lock = session.lock().await;
    let error = lock.as_ref().and_then(|s| s.error.clone()).unwrap();
    assert!(error.contains("access_denied"));
}

#[tokio::test]
async fn test_callback_exchanges_code_for_credential() {
    let token_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("code=abc"))
        .and(body_string_contains("code_verifier=verifier"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A1",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "R1"
        })))
        .expect(1)
        .mount(&token_server)
        .await;

    let session = pending_session();
    let base = start(&token_server, session.clone()).await;

    let body = reqwest::get(format!("{}/callback?code=abc&state=expected-state", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Authentication successful"));
    let lock = session.lock().await;
    let credential = lock.as_ref().and_then(|s| s.credential.clone()).unwrap();
    assert_eq!(credential.access_token, "A1");
    assert_eq!(credential.refresh_token, "R1");
}
