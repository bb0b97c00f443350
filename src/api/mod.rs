//! # API Module
//!
//! HTTP endpoints served by `echostats serve`.
//!
//! ## Endpoints
//!
//! - [`callback`] - `POST /auth/callback`, exchanges `{code, redirectUri}` for
//!   the provider's token response
//! - [`refresh`] - `POST /auth/refresh`, refreshes `{refresh_token}`
//! - [`summary`] - `GET /stats/summary`, fetches and aggregates the caller's
//!   listening summary
//! - [`health`] - `GET /health`, status and version
//!
//! Every failure answers with a JSON body of the form `{"error": "..."}`.
//! Upstream status codes and bodies are logged, never echoed back.

mod auth;
mod health;
mod summary;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub use auth::{callback, refresh};
pub use health::health;
pub use summary::summary;

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
