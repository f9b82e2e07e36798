use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{cli, config::Settings, error, info, management::CredentialState, spotify, success};

/// Runs the browser login and stores the resulting credential.
pub async fn auth(settings: &Settings) {
    let session = match cli::Session::open(settings) {
        Ok(s) => s,
        Err(e) => error!("Cannot initialise Spotify client. Err: {}", e),
    };

    info!("Waiting for Spotify authorization in your browser...");
    let shared_state = Arc::new(Mutex::new(None));
    let credential = match spotify::auth::auth(Arc::clone(&session.auth_client), shared_state).await
    {
        Ok(c) => c,
        Err(e) => error!("Authentication failed. Err: {}", e),
    };

    if let Err(e) = session.credentials.sign_in(&credential).await {
        error!("Failed to save credential. Err: {}", e);
    }

    success!("Authentication successful!");
}

pub async fn logout(settings: &Settings) {
    let session = match cli::Session::open(settings) {
        Ok(s) => s,
        Err(e) => error!("Cannot initialise Spotify client. Err: {}", e),
    };

    match session.credentials.logout().await {
        Ok(()) => success!("Logged out."),
        Err(e) => error!("Failed to remove credential. Err: {}", e),
    }
}

/// Reports the credential state. Never triggers a refresh.
pub async fn status(settings: &Settings) {
    let session = match cli::Session::open(settings) {
        Ok(s) => s,
        Err(e) => error!("Cannot initialise Spotify client. Err: {}", e),
    };

    match session.credentials.state().await {
        Ok(Some(CredentialState::Valid)) => {
            info!("Credential state: {:?}", CredentialState::Valid);
            if let Some(profile) = session.profile().await {
                info!("Signed in as {}", profile.name());
            }
        }
        Ok(Some(state)) => info!("Credential state: {:?}", state),
        Ok(None) => info!("Not authenticated. Run mindbeat auth."),
        Err(e) => error!("Cannot read credential. Err: {}", e),
    }
}
