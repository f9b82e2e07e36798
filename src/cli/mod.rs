//! # CLI Module
//!
//! User-facing commands. Each command builds the components it needs from
//! [`Settings`], runs, and reports through the console macros.
//!
//! - [`auth`] - log in with Spotify (PKCE) and store the credential
//! - [`logout`] - delete the stored credential
//! - [`status`] - show the credential state without refreshing it, and the
//!   signed-in user while the credential is valid
//! - [`mood`] - full mood report (summary, 7-day trend, tracks, recommendations)
//! - [`recommend`] - recommendations only
//!
//! A refresh failure or a missing credential ends the command with a hint to
//! run `mindbeat auth`.

mod auth;
mod mood;

use std::sync::Arc;

pub use auth::auth;
pub use auth::logout;
pub use auth::status;
pub use mood::mood;
pub use mood::recommend;

use tracing::warn;

use crate::{
    Res,
    config::Settings,
    management::{CredentialManager, FileCredentialStore},
    pipeline::MoodPipeline,
    spotify::{SpotifyApiClient, SpotifyAuthClient},
    types::UserProfile,
};

/// Components shared by the commands for one invocation: the accounts and
/// Web API clients, and the credential manager over the on-disk store.
pub(crate) struct Session {
    pub auth_client: Arc<SpotifyAuthClient>,
    pub api: Arc<SpotifyApiClient>,
    pub credentials: Arc<CredentialManager>,
}

impl Session {
    pub fn open(settings: &Settings) -> Res<Self> {
        let auth_client = Arc::new(SpotifyAuthClient::new(settings.clone())?);
        let api = Arc::new(SpotifyApiClient::new(settings)?);
        let store = Arc::new(FileCredentialStore::default_location());
        let credentials = Arc::new(CredentialManager::new(
            settings,
            store,
            auth_client.clone(),
        ));

        Ok(Session {
            auth_client,
            api,
            credentials,
        })
    }

    pub fn pipeline(&self, settings: &Settings) -> MoodPipeline {
        MoodPipeline::new(
            settings,
            Arc::clone(&self.credentials),
            self.api.clone(),
        )
    }

    /// Profile of the signed-in user. Display only, so failures are logged
    /// and yield `None`.
    pub async fn profile(&self) -> Option<UserProfile> {
        let credential = self.credentials.ensure_valid().await.ok()?;
        match self.api.get_current_user(&credential.access_token).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "Cannot fetch user profile");
                None
            }
        }
    }
}
