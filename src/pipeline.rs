//! Orchestration of one mood analysis.
//!
//! Stages run strictly in order: credential validation, then the fetch, then
//! scoring, aggregation and recommendations. Credential problems are the only
//! failures returned as distinct errors; an empty history or tracks without
//! audio features resolve to neutral values.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local};
use tracing::{debug, warn};

use crate::{
    config::{MAX_TRACK_LIMIT, Settings},
    error::{CoreError, UpstreamError},
    management::CredentialManager,
    mood::{self, MoodAnalysis, Recommendation, Track, recommend},
    types::Credential,
};

/// Source of recently played tracks with their audio features.
///
/// Implementations return an empty list when there is no history, and
/// [`UpstreamError::Unauthorized`] when the access token was rejected.
#[async_trait]
pub trait TrackSource: Send + Sync {
    async fn fetch_recent(
        &self,
        credential: &Credential,
        limit: u32,
    ) -> Result<Vec<Track>, UpstreamError>;
}

/// One fetch of the listening history together with its analysis.
///
/// `plays` keeps every fetched play, including the ones without audio
/// features that the analysis could not score.
#[derive(Debug, Clone, PartialEq)]
pub struct ListeningHistory {
    pub plays: Vec<Track>,
    pub analysis: MoodAnalysis,
}

/// Runs credential validation, the fetch and the analysis for one session.
///
/// # Example
///
/// ```ignore
/// let pipeline = MoodPipeline::new(&settings, credentials, source).with_limit(20);
/// let analysis = pipeline.analyze_mood().await?;
/// let recommendations = MoodPipeline::get_recommendations(&analysis);
/// ```
pub struct MoodPipeline {
    credentials: Arc<CredentialManager>,
    source: Arc<dyn TrackSource>,
    limit: u32,
    timeout: Duration,
}

impl MoodPipeline {
    pub fn new(
        settings: &Settings,
        credentials: Arc<CredentialManager>,
        source: Arc<dyn TrackSource>,
    ) -> Self {
        MoodPipeline {
            credentials,
            source,
            limit: settings.track_limit,
            timeout: settings.request_timeout,
        }
    }

    /// Overrides the number of plays fetched, clamped to `1..=50`.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_TRACK_LIMIT);
        self
    }

    /// Analyses the session's recent listening, bucketing the trend by the
    /// local calendar date.
    ///
    /// # Errors
    ///
    /// Credential failures come back as the [`CoreError`] variants that
    /// require a new login; upstream failures as
    /// [`CoreError::UpstreamUnavailable`]. An empty history is not an error.
    pub async fn analyze_mood(&self) -> Result<MoodAnalysis, CoreError> {
        self.analyze_mood_at(Local::now().fixed_offset()).await
    }

    /// Same as [`analyze_mood`](Self::analyze_mood) with an explicit "now".
    pub async fn analyze_mood_at(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<MoodAnalysis, CoreError> {
        Ok(self.analyze_history_at(now).await?.analysis)
    }

    /// Like [`analyze_mood_at`](Self::analyze_mood_at), but also returns the
    /// raw plays for display.
    pub async fn analyze_history_at(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<ListeningHistory, CoreError> {
        let plays = self.fetch().await?;
        let analysis = mood::analyze(&plays, &now);
        Ok(ListeningHistory { plays, analysis })
    }

    /// Recommendations for `analysis`: the mood tier first, then the energy
    /// tier. Never empty.
    pub fn get_recommendations(analysis: &MoodAnalysis) -> Vec<Recommendation> {
        recommend::for_analysis(analysis)
    }

    async fn fetch(&self) -> Result<Vec<Track>, CoreError> {
        let credential = self.credentials.ensure_valid().await?;

        let tracks = match self.fetch_once(&credential).await {
            Err(UpstreamError::Unauthorized) => {
                warn!("Access token rejected, refreshing once");
                let refreshed = self.credentials.force_refresh(&credential).await?;
                self.fetch_once(&refreshed).await?
            }
            other => other?,
        };

        debug!(count = tracks.len(), "Tracks fetched");
        Ok(tracks)
    }

    async fn fetch_once(&self, credential: &Credential) -> Result<Vec<Track>, UpstreamError> {
        match tokio::time::timeout(self.timeout, self.source.fetch_recent(credential, self.limit))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Unavailable(format!(
                "fetch timed out after {:?}",
                self.timeout
            ))),
        }
    }
}
