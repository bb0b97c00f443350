//! Configuration management for echostats.
//!
//! Values come from the process environment, optionally seeded from `.env`
//! files. The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the local data directory (`echostats/.env`)
//! 3. `.env` in the working directory
//! 4. Application defaults (where applicable)
//!
//! Client credentials are deliberately optional here. A server started
//! without them still serves `/health`; token operations report a
//! configuration error when they are first attempted.

use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use chrono::{FixedOffset, Offset, Utc};

use crate::{spotify::snapshot::FetchPolicy, stats::RecencyWindow};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_RECENT_WINDOW_HOURS: u32 = 48;

/// Loads environment variables from `.env` files.
///
/// Creates the `echostats` folder in the platform-specific local data
/// directory on first use, then loads `echostats/.env` from there followed
/// by `.env` in the working directory. Variables that are already set are
/// never overwritten. Missing files are skipped.
///
/// # Directory Structure
///
/// The data directory file lives in:
/// - Linux: `~/.local/share/echostats/.env`
/// - macOS: `~/Library/Application Support/echostats/.env`
/// - Windows: `%LOCALAPPDATA%/echostats/.env`
///
/// # Returns
///
/// Returns `Ok(())` once every existing file has been loaded, or an error
/// string describing the first failure.
///
/// # Errors
///
/// This function will return an error if:
/// - The data directory cannot be created
/// - An existing `.env` file cannot be read or parsed
///
/// # Example
///
/// ```no_run
/// use echostats::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("echostats/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    for candidate in [path, PathBuf::from(".env")] {
        if candidate.is_file() {
            dotenv::from_path(&candidate).map_err(|e| {
                format!("failed to load {}: {}", candidate.display(), e)
            })?;
        }
    }
    Ok(())
}

/// Client id and secret registered with the provider.
///
/// Read from `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET`. Both must be
/// present and non-blank, otherwise no credentials are configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Runtime settings, shared read-only behind an `Arc`.
///
/// Every field has a default so a partially configured environment still
/// yields usable settings. See [`Settings::from_env`] for the variable names.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `None` until both client id and secret are set.
    pub credentials: Option<ClientCredentials>,
    /// Redirect uri used by the `token exchange` command when none is passed.
    pub redirect_uri: Option<String>,
    pub server_address: String,
    pub port: u16,
    /// Base url of the Web API, without a trailing slash.
    pub api_url: String,
    /// Accounts service token endpoint.
    pub token_url: String,
    /// Upper bound for every outbound request.
    pub request_timeout: Duration,
    /// Lookback span for the recent listening minutes.
    pub recent_window: RecencyWindow,
    /// Offset used for hourly and daily buckets when a request names none.
    pub utc_offset: FixedOffset,
    pub fetch_policy: FetchPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials: None,
            redirect_uri: None,
            server_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            api_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            recent_window: RecencyWindow::Hours(DEFAULT_RECENT_WINDOW_HOURS),
            utc_offset: utc(),
            fetch_policy: FetchPolicy::AllOrNothing,
        }
    }
}

impl Settings {
    /// Builds settings from the current environment.
    ///
    /// Blank or malformed values fall back to their defaults. Call
    /// [`load_env`] first to pick up `.env` files.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET` | unset |
    /// | `SPOTIFY_REDIRECT_URI` | unset |
    /// | `SERVER_ADDRESS` | `0.0.0.0` |
    /// | `PORT` | `3001` |
    /// | `SPOTIFY_API_URL` | `https://api.spotify.com/v1` |
    /// | `SPOTIFY_API_TOKEN_URL` | `https://accounts.spotify.com/api/token` |
    /// | `STATS_REQUEST_TIMEOUT_SECS` | `10` |
    /// | `STATS_RECENT_WINDOW_HOURS` | `48` (must be positive) |
    /// | `STATS_UTC_OFFSET_MINUTES` | `0` (within ±840) |
    /// | `STATS_FETCH_POLICY` | `all_or_nothing` |
    ///
    /// # Returns
    ///
    /// The resolved settings. This never fails; missing client credentials
    /// surface later as a configuration error on the first token operation.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use echostats::config::Settings;
    ///
    /// let settings = Settings::from_env().shared();
    /// println!("listening on {}:{}", settings.server_address, settings.port);
    /// ```
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        Self {
            credentials: client_credentials(),
            redirect_uri: non_empty_var("SPOTIFY_REDIRECT_URI"),
            server_address: non_empty_var("SERVER_ADDRESS").unwrap_or(defaults.server_address),
            port: parsed_var("PORT").unwrap_or(defaults.port),
            api_url: non_empty_var("SPOTIFY_API_URL").unwrap_or(defaults.api_url),
            token_url: non_empty_var("SPOTIFY_API_TOKEN_URL").unwrap_or(defaults.token_url),
            request_timeout: parsed_var("STATS_REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            recent_window: parsed_var::<u32>("STATS_RECENT_WINDOW_HOURS")
                .filter(|hours| *hours > 0)
                .map(RecencyWindow::Hours)
                .unwrap_or(defaults.recent_window),
            utc_offset: parsed_var::<i32>("STATS_UTC_OFFSET_MINUTES")
                .and_then(offset_from_minutes)
                .unwrap_or(defaults.utc_offset),
            fetch_policy: parsed_var("STATS_FETCH_POLICY").unwrap_or(defaults.fetch_policy),
        }
    }

    pub fn shared(self) -> Arc<Settings> {
        Arc::new(self)
    }
}

/// Converts a minute offset into a `FixedOffset`.
///
/// # Arguments
///
/// * `minutes` - Minutes east of UTC, negative for zones west of it
///
/// # Returns
///
/// `None` for anything outside the real-world range of UTC-14:00 to
/// UTC+14:00.
///
/// # Example
///
/// ```
/// use echostats::config::offset_from_minutes;
///
/// assert_eq!(offset_from_minutes(120).unwrap().local_minus_utc(), 7200);
/// assert!(offset_from_minutes(-900).is_none());
/// ```
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    if !(-840..=840).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(minutes * 60)
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn client_credentials() -> Option<ClientCredentials> {
    Some(ClientCredentials {
        client_id: non_empty_var("SPOTIFY_CLIENT_ID")?,
        client_secret: non_empty_var("SPOTIFY_CLIENT_SECRET")?,
    })
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: FromStr>(key: &str) -> Option<T> {
    non_empty_var(key).and_then(|v| v.trim().parse().ok())
}
