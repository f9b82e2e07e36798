use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::{
    config::{MAX_TRACK_LIMIT, Settings},
    error::UpstreamError,
    mood::{AudioFeatures, Track},
    pipeline::TrackSource,
    types::{AudioFeaturesResponse, Credential, RecentlyPlayedResponse, UserProfile},
};

/// Longest `Retry-After` the client is willing to sleep through.
pub const MAX_RETRY_AFTER_SECS: u64 = 120;

const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(1);

/// Client for the Spotify Web API: listening history, audio features and the
/// current user's profile.
///
/// Every public call gets `request_timeout` as its total budget, retries
/// included. [`TrackSource::fetch_recent`] shares one budget across the
/// history and audio-features requests, matching the timeout the pipeline
/// puts around it. A `Retry-After` that does not fit into what is left of the
/// budget fails right away instead of sleeping into the caller's timeout.
pub struct SpotifyApiClient {
    http: Client,
    api_url: String,
    budget: Duration,
}

impl SpotifyApiClient {
    /// Client for `settings.api_url`; `request_timeout` bounds each request
    /// and each public call as a whole.
    pub fn new(settings: &Settings) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(format!("mindbeat/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(SpotifyApiClient {
            http,
            api_url: settings.api_url.clone(),
            budget: settings.request_timeout,
        })
    }

    /// `GET /me/player/recently-played`, at most 50 plays.
    pub async fn get_recently_played(
        &self,
        token: &str,
        limit: u32,
    ) -> Result<RecentlyPlayedResponse, UpstreamError> {
        self.recently_played(token, limit, self.deadline()).await
    }

    /// `GET /audio-features?ids=...` for up to 100 ids.
    ///
    /// Ids the upstream has no features for are missing from the map.
    pub async fn get_audio_features(
        &self,
        token: &str,
        ids: &[&str],
    ) -> Result<HashMap<String, AudioFeatures>, UpstreamError> {
        self.audio_features(token, ids, self.deadline()).await
    }

    /// `GET /me`: the profile of the user the token belongs to.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let profile = client.get_current_user(&credential.access_token).await?;
    /// println!("Signed in as {}", profile.name());
    /// ```
    pub async fn get_current_user(&self, token: &str) -> Result<UserProfile, UpstreamError> {
        let url = format!("{uri}/me", uri = self.api_url);
        self.get_json(&url, token, self.deadline()).await
    }

    fn deadline(&self) -> Instant {
        Instant::now() + self.budget
    }

    async fn recently_played(
        &self,
        token: &str,
        limit: u32,
        deadline: Instant,
    ) -> Result<RecentlyPlayedResponse, UpstreamError> {
        let url = format!(
            "{uri}/me/player/recently-played?limit={limit}",
            uri = self.api_url,
            limit = limit.clamp(1, MAX_TRACK_LIMIT)
        );
        self.get_json(&url, token, deadline).await
    }

    async fn audio_features(
        &self,
        token: &str,
        ids: &[&str],
        deadline: Instant,
    ) -> Result<HashMap<String, AudioFeatures>, UpstreamError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!(
            "{uri}/audio-features?ids={ids}",
            uri = self.api_url,
            ids = ids.join(",")
        );
        let response: AudioFeaturesResponse = self.get_json(&url, token, deadline).await?;

        Ok(response
            .audio_features
            .into_iter()
            .flatten()
            .map(|obj| (obj.id.clone(), AudioFeatures::from(obj)))
            .collect())
    }

    /// Sends a GET and decodes the body.
    ///
    /// A 429 is retried once if `Retry-After` is at most
    /// [`MAX_RETRY_AFTER_SECS`] and the wait ends before `deadline`; a 502 is
    /// retried once after a short pause under the same condition.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        deadline: Instant,
    ) -> Result<T, UpstreamError> {
        let mut retried = false;

        loop {
            let response = self.http.get(url).bearer_auth(token).send().await?;

            let status = response.status();
            if status.is_success() {
                return Ok(response.json::<T>().await?);
            }

            match status {
                StatusCode::UNAUTHORIZED => return Err(UpstreamError::Unauthorized),
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.trim().parse::<u64>().ok())
                        .unwrap_or(0);
                    let wait = Duration::from_secs(retry_after);

                    if retried {
                        debug!("Still rate limited after one retry");
                    } else if retry_after > MAX_RETRY_AFTER_SECS {
                        warn!(retry_after, "Retry-After is abnormally high, giving up");
                    } else if Instant::now() + wait >= deadline {
                        warn!(retry_after, "Retry-After does not fit the request budget, giving up");
                    } else {
                        debug!(retry_after, "Rate limited, waiting");
                        sleep(wait).await;
                        retried = true;
                        continue;
                    }

                    return Err(UpstreamError::Status {
                        status: status.as_u16(),
                        message: format!("rate limited, retry after {}s", retry_after),
                    });
                }
                StatusCode::BAD_GATEWAY
                    if !retried && Instant::now() + BAD_GATEWAY_DELAY < deadline =>
                {
                    sleep(BAD_GATEWAY_DELAY).await;
                    retried = true;
                    continue;
                }
                _ => {}
            }

            let message = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }
    }
}

#[async_trait]
impl TrackSource for SpotifyApiClient {
    async fn fetch_recent(
        &self,
        credential: &Credential,
        limit: u32,
    ) -> Result<Vec<Track>, UpstreamError> {
        let deadline = self.deadline();
        let token = credential.access_token.as_str();
        let history = self.recently_played(token, limit, deadline).await?;
        if history.items.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<&str> = history
            .items
            .iter()
            .filter_map(|item| item.track.id.as_deref())
            .collect();
        ids.sort_unstable();
        ids.dedup();

        // Missing features only make tracks unscorable; an expired token
        // still has to reach the caller.
        let features = match self.audio_features(token, &ids, deadline).await {
            Ok(features) => features,
            Err(UpstreamError::Unauthorized) => return Err(UpstreamError::Unauthorized),
            Err(e) => {
                warn!(error = %e, "Audio features unavailable, continuing without them");
                HashMap::new()
            }
        };

        info!(
            plays = history.items.len(),
            with_features = features.len(),
            "Fetched recent plays"
        );

        Ok(history
            .items
            .into_iter()
            .map(|item| {
                let id = item.track.id.unwrap_or_default();
                Track {
                    features: features.get(&id).copied(),
                    id,
                    name: item.track.name,
                    artist: item
                        .track
                        .artists
                        .iter()
                        .map(|a| a.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    played_at: item.played_at,
                }
            })
            .collect())
    }
}
