//! # Spotify Integration Module
//!
//! HTTP adapters for the two Spotify services MindBeat talks to.
//!
//! - [`auth`] - accounts service: the PKCE login flow, the authorization-code
//!   exchange and the refresh exchange used by
//!   [`crate::management::CredentialManager`].
//! - [`api`] - Web API: recently played tracks and their audio features,
//!   exposed as a [`crate::pipeline::TrackSource`], and the user profile.
//!
//! ## Error mapping
//!
//! Transport failures become [`crate::error::UpstreamError::Unavailable`], a
//! 401 from the Web API becomes `Unauthorized` (which the pipeline answers
//! with one forced refresh), every other non-success status becomes `Status`.
//! Rate limiting (429 with `Retry-After`) and 502 responses are retried once.
//!
//! ## Endpoints
//!
//! - `POST /api/token` - authorization-code and refresh-token grants
//! - `GET /me/player/recently-played` - up to 50 most recent plays
//! - `GET /audio-features` - batched audio descriptors
//! - `GET /me` - display name and account details

pub mod api;
pub mod auth;

pub use api::SpotifyApiClient;
pub use auth::SpotifyAuthClient;
