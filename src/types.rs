use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::error::UpstreamError;

/// The OAuth credential of the current session.
///
/// Only [`crate::management::CredentialManager`] replaces a stored credential
/// after login; the login flow creates it and logout deletes it.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Credential {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
        }
    }

    /// Builds the credential returned by the authorization-code exchange.
    ///
    /// # Errors
    ///
    /// [`UpstreamError::Decode`] when the upstream did not issue a refresh
    /// token or sent an `expires_in` that does not fit a timestamp.
    pub fn from_token_response(
        response: &TokenResponse,
        now: DateTime<Utc>,
    ) -> Result<Self, UpstreamError> {
        let refresh_token = response.refresh_token.clone().ok_or_else(|| {
            UpstreamError::Decode("token response did not include a refresh token".to_string())
        })?;
        Ok(Credential {
            access_token: response.access_token.clone(),
            refresh_token,
            expires_at: expiry(now, response.expires_in)?,
        })
    }

    /// Applies a refresh response. The refresh token is only replaced when the
    /// upstream rotated it.
    pub fn refreshed(
        &self,
        response: TokenResponse,
        now: DateTime<Utc>,
    ) -> Result<Self, UpstreamError> {
        Ok(Credential {
            expires_at: expiry(now, response.expires_in)?,
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .unwrap_or_else(|| self.refresh_token.clone()),
        })
    }

    /// `true` while `now + leeway` is strictly before `expires_at`.
    pub fn is_valid_at(&self, now: DateTime<Utc>, leeway: std::time::Duration) -> bool {
        let leeway = Duration::from_std(leeway).unwrap_or_else(|_| Duration::zero());
        now + leeway < self.expires_at
    }
}

/// `now + expires_in` seconds, rejecting lifetimes chrono cannot represent.
fn expiry(now: DateTime<Utc>, expires_in: u64) -> Result<DateTime<Utc>, UpstreamError> {
    i64::try_from(expires_in)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| UpstreamError::Decode(format!("expires_in out of range: {}", expires_in)))
}

// Tokens stay out of logs and panic messages.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Body of a successful response from the token endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

fn default_expires_in() -> u64 {
    3600
}

/// Shared state between the login flow and the callback handler.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub code_verifier: String,
    pub state: String,
    pub credential: Option<Credential>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyPlayedResponse {
    pub items: Vec<PlayHistoryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistoryItem {
    pub track: SpotifyTrack,
    #[serde(default)]
    pub played_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrack {
    /// `null` for local files.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeaturesObject>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesObject {
    pub id: String,
    pub valence: f64,
    pub energy: f64,
    pub danceability: f64,
    pub instrumentalness: f64,
    pub tempo: f64,
    pub mode: u8,
}

/// Response of `GET /me`. Email and country need the `user-read-email` and
/// `user-read-private` scopes and are absent without them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
}

impl UserProfile {
    /// Display name, falling back to the user id.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.id)
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub played: String,
    pub name: String,
    pub artist: String,
    pub mood: String,
    pub energy: String,
    pub valence: String,
}

#[derive(Tabled)]
pub struct TrendTableRow {
    pub day: String,
    pub mood: String,
}

#[derive(Tabled)]
pub struct RecommendationTableRow {
    pub title: String,
    pub description: String,
    pub confidence: String,
}
