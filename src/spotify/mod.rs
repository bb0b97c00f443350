//! # Spotify Integration Module
//!
//! Everything that talks to the provider lives here:
//!
//! ```text
//! HTTP handlers / CLI
//!          ↓
//! Token lifecycle (management::TokenManager)
//!          ↓
//! Spotify Integration Layer
//!     ├── auth      token endpoint (authorization_code, refresh_token grants)
//!     ├── client    bearer-authenticated GETs with status mapping
//!     └── snapshot  concurrent fan-out for one summary request
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## API Coverage
//!
//! - `POST /api/token` - code exchange and refresh
//! - `GET /me` - profile
//! - `GET /me/top/tracks`, `GET /me/top/artists` - top items for a time range
//! - `GET /me/player/recently-played` - last 50 plays
//! - `GET /me/playlists` - first 20 playlists
//! - `GET /audio-features` - batch lookup for the top track ids
//!
//! ## Error Handling
//!
//! All functions return [`crate::error::StatsError`]. A 401 on a data call
//! becomes `UpstreamAuth`, which the fetcher recovers from once by refreshing.
//! Rate limiting (429) and server errors are not retried here; they fail the
//! request like any other non-2xx response.

pub mod auth;
pub mod client;
pub mod snapshot;
