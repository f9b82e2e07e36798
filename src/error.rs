//! Error types shared by the credential lifecycle and the mood pipeline.
//!
//! [`CoreError`] is the only error a caller of [`crate::pipeline::MoodPipeline`]
//! ever sees. Everything a collaborator can fail with is translated into one of
//! its variants at the boundary where the collaborator is called.

use thiserror::Error;

/// Failures surfaced to the caller of the mood pipeline.
///
/// An empty listening history is deliberately absent: it resolves to the
/// neutral [`crate::mood::MoodAnalysis`] instead of an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// The upstream rejected the access token even after a refresh.
    #[error("Spotify credential expired")]
    CredentialExpired,

    /// The refresh exchange failed. The session is invalid and the user
    /// has to authenticate again.
    #[error("Credential refresh failed: {0}")]
    CredentialRefreshFailed(String),

    /// No credential is stored for this session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Network failure or a non-success upstream response. The caller may retry.
    #[error("Spotify unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The credential store could not be read or written.
    #[error("Credential storage failed: {0}")]
    Storage(String),
}

impl CoreError {
    /// Whether the user has to log in again before anything else can succeed.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            CoreError::CredentialRefreshFailed(_)
                | CoreError::NotAuthenticated
                | CoreError::CredentialExpired
        )
    }
}

/// Errors reported by the upstream collaborators (track source, token endpoint).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    /// 401 from the upstream API.
    #[error("Access token rejected")]
    Unauthorized,

    /// The request never produced a response (connect, timeout, transport).
    #[error("Upstream unreachable: {0}")]
    Unavailable(String),

    /// The upstream answered with a non-success status.
    #[error("Upstream error ({status}): {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

/// Transport and body errors from `reqwest`. Status codes are mapped by the
/// callers before a body is read, so they never reach this conversion.
impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            UpstreamError::Unavailable(err.to_string())
        }
    }
}

impl From<UpstreamError> for CoreError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Unauthorized => CoreError::CredentialExpired,
            other => CoreError::UpstreamUnavailable(other.to_string()),
        }
    }
}

/// Errors from a [`crate::management::CredentialStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid credential file: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::Storage(err.to_string())
    }
}

/// Errors raised while building [`crate::config::Settings`].
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}
