//! MindBeat library
//!
//! Scores a user's recent Spotify listening history for mood, aggregates the
//! scores into a seven-day trend and derives rule-based recommendations. The
//! OAuth credential every fetch depends on is managed here as well.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Settings and `.env` loading
//! - `error` - Error taxonomy shared by the pipeline and its collaborators
//! - `management` - Credential lifecycle and credential stores
//! - `mood` - Scoring, trend aggregation and recommendations
//! - `pipeline` - Orchestration of one mood analysis
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify accounts and Web API adapters
//! - `types` - Credential and upstream wire types
//! - `utils` - PKCE helpers and display formatting
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mindbeat::{config::Settings, management::*, pipeline::MoodPipeline, spotify::*};
//!
//! let settings = Settings::from_env()?;
//! let auth = Arc::new(SpotifyAuthClient::new(settings.clone())?);
//! let store = Arc::new(FileCredentialStore::default_location());
//! let credentials = Arc::new(CredentialManager::new(&settings, store, auth));
//! let source = Arc::new(SpotifyApiClient::new(&settings)?);
//!
//! let analysis = MoodPipeline::new(&settings, credentials, source)
//!     .analyze_mood()
//!     .await?;
//! let recommendations = MoodPipeline::get_recommendations(&analysis);
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod mood;
pub mod pipeline;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for the command layer.
///
/// Boxes any error that is `Send + Sync`, so the typed errors of the library
/// ([`error::CoreError`], [`error::UpstreamError`], ...) can be propagated with
/// `?` and recovered with `downcast_ref`.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Found {} recent plays", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal errors in the command layer; library code returns errors.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
