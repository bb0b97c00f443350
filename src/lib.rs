//! Listening statistics for the Spotify Web API.
//!
//! This library exchanges and refreshes Spotify credentials, fetches the
//! upstream data a listening summary needs in one concurrent fan-out, and
//! aggregates it into derived statistics: top genres, audio-feature mood,
//! recency-window totals, session counts, hourly and daily histograms and
//! top albums. The `echostats` binary serves these over HTTP or prints them
//! from the command line.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the auth and stats endpoints
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy shared across the crate
//! - `management` - Credential store and token lifecycle
//! - `server` - HTTP router and listener
//! - `spotify` - Spotify Web API client and fan-out fetcher
//! - `stats` - Pure aggregation of a fetched snapshot
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```no_run
//! use echostats::{config, stats};
//!
//! #[tokio::main]
//! async fn main() -> echostats::Res<()> {
//!     config::load_env().await?;
//!     let settings = config::Settings::from_env();
//!     let options = stats::AggregateOptions::from_settings(&settings);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod stats;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the CLI and server entry points, where any error simply ends the
/// command. Library operations return [`error::StatsError`] instead.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
///
/// # Example
///
/// ```
/// use echostats::Res;
///
/// fn port(raw: &str) -> Res<u16> {
///     Ok(raw.parse()?)
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints a console status line prefixed with a blue `o`.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`.
///
/// # Example
///
/// ```
/// use echostats::info;
///
/// let range = "short_term";
/// info!("Fetching listening summary...");
/// info!("Time range: {}", range);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a console line prefixed with a green checkmark.
///
/// ```
/// use echostats::success;
///
/// success!("Received access token");
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line and exits with status 1.
///
/// Only for CLI paths where nothing sensible can continue; the expression
/// has type `!` so it can end any match arm.
///
/// # Arguments
///
/// The macro accepts the same arguments as `eprintln!`.
///
/// # Example
///
/// ```no_run
/// use echostats::error;
///
/// let port: u16 = match "x".parse() {
///     Ok(port) => port,
///     Err(e) => error!("Invalid port. Err: {}", e),
/// };
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a console line prefixed with a yellow `!`.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
