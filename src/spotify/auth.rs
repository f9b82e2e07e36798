use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    Res,
    config::Settings,
    error::UpstreamError,
    management::RefreshExchange,
    server::start_api_server,
    types::{AuthSession, Credential, TokenResponse},
    utils, warning,
};

/// Maximum time `auth` waits for the browser round trip.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the Spotify accounts service (authorize URL and token endpoint).
pub struct SpotifyAuthClient {
    http: Client,
    settings: Settings,
}

impl SpotifyAuthClient {
    /// Builds the HTTP client with `request_timeout` and a `mindbeat/<version>`
    /// user agent.
    pub fn new(settings: Settings) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(format!("mindbeat/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(SpotifyAuthClient { http, settings })
    }

    /// Settings the client was built from.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Authorization URL for the PKCE code flow.
    pub fn authorize_url(&self, code_challenge: &str, state: &str) -> Result<Url, UpstreamError> {
        Url::parse_with_params(
            &self.settings.auth_url,
            &[
                ("client_id", self.settings.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "S256"),
                ("scope", self.settings.scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| UpstreamError::Unavailable(format!("invalid auth url: {}", e)))
    }

    /// Exchanges an authorization code and PKCE verifier for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
    ) -> Result<TokenResponse, UpstreamError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
        ])
        .await
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, UpstreamError> {
        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push(("client_id", self.settings.client_id.as_str()));
        if let Some(secret) = &self.settings.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        debug!(url = %self.settings.token_url, grant_type = ?params.first().map(|p| p.1), "Token request");

        let response = self
            .http
            .post(&self.settings.token_url)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json::<TokenResponse>().await?)
        } else {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, "Token endpoint rejected the request");
            Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl RefreshExchange for SpotifyAuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, UpstreamError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }
}

/// Runs the OAuth 2.0 authorization-code flow with PKCE.
///
/// 1. Generates the PKCE verifier/challenge and a random `state`
/// 2. Starts the local callback server
/// 3. Opens the authorization URL in the default browser
/// 4. Waits for the callback handler to exchange the code
///
/// Returns the acquired credential; storing it is up to the caller.
///
/// # Errors
///
/// Fails when the callback server cannot bind, when the callback reports an
/// error, or when no callback arrives within [`LOGIN_TIMEOUT`].
pub async fn auth(
    client: Arc<SpotifyAuthClient>,
    shared_state: Arc<Mutex<Option<AuthSession>>>,
) -> Res<Credential> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let state = utils::generate_state();

    // Store verifier in shared state before redirect
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(AuthSession {
            code_verifier,
            state: state.clone(),
            credential: None,
            error: None,
        });
    }

    let listener = tokio::net::TcpListener::bind(&client.settings().server_address).await?;
    let server_state = Arc::clone(&shared_state);
    let server_client = Arc::clone(&client);
    let server = tokio::spawn(async move {
        if let Err(e) = start_api_server(listener, server_state, server_client).await {
            warn!(error = %e, "Callback server stopped");
        }
    });

    let auth_url = client.authorize_url(&code_challenge, &state)?;
    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let outcome = wait_for_credential(shared_state, LOGIN_TIMEOUT).await;
    server.abort();
    outcome
}

/// Polls the shared state until the callback stored a credential or an error.
async fn wait_for_credential(
    shared_state: Arc<Mutex<Option<AuthSession>>>,
    max_wait: Duration,
) -> Res<Credential> {
    let start = std::time::Instant::now();

    while start.elapsed() < max_wait {
        {
            let lock = shared_state.lock().await;
            if let Some(session) = lock.as_ref() {
                if let Some(credential) = &session.credential {
                    return Ok(credential.clone());
                }
                if let Some(error) = &session.error {
                    return Err(error.clone().into());
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    Err("Authentication timed out.".into())
}
