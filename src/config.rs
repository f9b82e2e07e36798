//! Configuration management for MindBeat.
//!
//! Configuration is read from environment variables, which may be seeded from a
//! `.env` file in the local data directory. The values are collected once into
//! a [`Settings`] value that is handed to the components that need it; nothing
//! reads the environment after start-up.
//!
//! The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use crate::error::ConfigError;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_SCOPE: &str =
    "user-read-recently-played user-read-private user-read-email user-top-read";

/// Upstream caps recently-played at 50 items per request.
pub const MAX_TRACK_LIMIT: u32 = 50;

/// Returns the application directory inside the platform local data dir.
///
/// - Linux: `~/.local/share/mindbeat`
/// - macOS: `~/Library/Application Support/mindbeat`
/// - Windows: `%LOCALAPPDATA%/mindbeat`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("mindbeat");
    path
}

/// Loads environment variables from `<data_dir>/.env`.
///
/// Creates the directory if needed. A missing `.env` file is not an error,
/// the process environment may already carry everything.
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or the file
/// exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| e.to_string())?;

    let path = dir.join(".env");
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Runtime settings for the OAuth client, the Spotify adapters and the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub client_id: String,
    /// Sent on token requests when the app is registered as a confidential client.
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub server_address: String,
    /// Number of recent plays fetched per analysis, `1..=50`.
    pub track_limit: u32,
    /// Timeout applied to every upstream call (refresh and fetch).
    pub request_timeout: Duration,
    /// A credential is treated as expired this long before `expires_at`.
    pub refresh_leeway: Duration,
}

impl Settings {
    /// Builds settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let or_default = |name: &str, default: &str| get(name).unwrap_or_else(|| default.into());

        let client_id =
            get("SPOTIFY_API_AUTH_CLIENT_ID").ok_or(ConfigError::Missing("SPOTIFY_API_AUTH_CLIENT_ID"))?;

        let track_limit = parse_u64(&get, "MINDBEAT_TRACK_LIMIT", MAX_TRACK_LIMIT as u64)?
            .clamp(1, MAX_TRACK_LIMIT as u64) as u32;
        let request_timeout = parse_u64(&get, "MINDBEAT_REQUEST_TIMEOUT_SECS", 15)?;
        let refresh_leeway = parse_u64(&get, "MINDBEAT_REFRESH_LEEWAY_SECS", 0)?;

        Ok(Settings {
            client_id,
            client_secret: get("SPOTIFY_API_AUTH_CLIENT_SECRET"),
            redirect_uri: or_default("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            scope: or_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            auth_url: or_default("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: or_default("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: or_default("SPOTIFY_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            server_address: or_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            track_limit,
            request_timeout: Duration::from_secs(request_timeout),
            refresh_leeway: Duration::from_secs(refresh_leeway),
        })
    }

    /// Settings pointing every endpoint at `base_url`, used against mock servers.
    pub fn for_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Settings {
            client_id: "mindbeat-client".to_string(),
            client_secret: None,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            auth_url: format!("{base}/authorize"),
            token_url: format!("{base}/api/token"),
            api_url: format!("{base}/v1"),
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            track_limit: MAX_TRACK_LIMIT,
            request_timeout: Duration::from_secs(5),
            refresh_leeway: Duration::ZERO,
        }
    }
}

fn parse_u64<G>(get: &G, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn client_id_is_required() {
        let err = Settings::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("SPOTIFY_API_AUTH_CLIENT_ID"));
    }

    #[test]
    fn defaults_are_applied() {
        let settings = Settings::from_lookup(lookup(&[("SPOTIFY_API_AUTH_CLIENT_ID", "abc")])).unwrap();
        assert_eq!(settings.client_id, "abc");
        assert_eq!(settings.client_secret, None);
        assert_eq!(settings.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.track_limit, 50);
        assert_eq!(settings.request_timeout, Duration::from_secs(15));
        assert_eq!(settings.refresh_leeway, Duration::ZERO);
    }

    #[test]
    fn track_limit_is_clamped() {
        let settings = Settings::from_lookup(lookup(&[
            ("SPOTIFY_API_AUTH_CLIENT_ID", "abc"),
            ("MINDBEAT_TRACK_LIMIT", "500"),
        ]))
        .unwrap();
        assert_eq!(settings.track_limit, 50);

        let settings = Settings::from_lookup(lookup(&[
            ("SPOTIFY_API_AUTH_CLIENT_ID", "abc"),
            ("MINDBEAT_TRACK_LIMIT", "0"),
        ]))
        .unwrap();
        assert_eq!(settings.track_limit, 1);
    }

    #[test]
    fn invalid_number_is_rejected() {
        let err = Settings::from_lookup(lookup(&[
            ("SPOTIFY_API_AUTH_CLIENT_ID", "abc"),
            ("MINDBEAT_REQUEST_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { name: "MINDBEAT_REQUEST_TIMEOUT_SECS", .. }
        ));
    }

    #[test]
    fn blank_secret_counts_as_unset() {
        let settings = Settings::from_lookup(lookup(&[
            ("SPOTIFY_API_AUTH_CLIENT_ID", "abc"),
            ("SPOTIFY_API_AUTH_CLIENT_SECRET", "  "),
            ("SPOTIFY_API_URL", "https://api.example.com/v1/"),
        ]))
        .unwrap();
        assert_eq!(settings.client_secret, None);
        assert_eq!(settings.api_url, "https://api.example.com/v1");
    }
}
