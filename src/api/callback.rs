use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::warn;

use crate::{
    spotify::SpotifyAuthClient,
    types::{AuthSession, Credential},
};

/// OAuth redirect target (`GET /callback`).
///
/// Rejects a `state` that does not match the login in progress, records an
/// `error` parameter on the session, and otherwise exchanges `code` with the
/// session's PKCE verifier. The outcome is written to the shared
/// [`AuthSession`], where the waiting login flow picks it up.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<AuthSession>>>>,
    Extension(client): Extension<Arc<SpotifyAuthClient>>,
) -> Html<&'static str> {
    let mut state = shared_state.lock().await;
    let Some(session) = state.as_mut() else {
        return Html("<h4>No login in progress.</h4>");
    };

    if let Some(error) = params.get("error") {
        session.error = Some(format!("Authorization denied: {}", error));
        return Html("<h4>Login cancelled.</h4>");
    }

    if params.get("state") != Some(&session.state) {
        warn!("Callback state mismatch");
        return Html("<h4>Invalid state parameter.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let credential = match client.exchange_code(code, &session.code_verifier).await {
        Ok(response) => Credential::from_token_response(&response, Utc::now()),
        Err(e) => Err(e),
    };

    match credential {
        Ok(credential) => {
            session.credential = Some(credential);
            Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>")
        }
        Err(e) => {
            warn!(error = %e, "Token exchange failed");
            session.error = Some(format!("Token exchange failed: {}", e));
            Html("<h4>Login failed.</h4>")
        }
    }
}
