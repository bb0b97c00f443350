//! Error taxonomy shared by the token lifecycle, the fan-out fetcher and the
//! HTTP layer.
//!
//! Every variant carries owned strings only, so the type is `Clone`. A
//! coalesced token refresh hands the same result to every waiter, which
//! requires a cloneable error.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatsError {
    /// Malformed or missing caller input. Never retried.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Server-side credentials are missing. Operator actionable.
    #[error("server configuration error: {0}")]
    Configuration(String),

    /// The provider rejected a token operation, or a data call still
    /// returned 401 after one refresh. The remedy is re-authentication.
    #[error("upstream rejected credentials (status {status}): {body}")]
    UpstreamAuth { status: u16, body: String },

    /// Any other upstream failure: non-2xx (429 and 5xx included), timeouts,
    /// transport errors and undecodable bodies.
    #[error("upstream request failed (status {status:?}): {body}")]
    Upstream { status: Option<u16>, body: String },

    /// Only raised for inputs the aggregation cannot degrade gracefully.
    #[error("aggregation failed: {0}")]
    Aggregation(String),
}

impl StatsError {
    pub fn is_auth(&self) -> bool {
        matches!(self, StatsError::UpstreamAuth { .. })
    }
}

impl From<reqwest::Error> for StatsError {
    fn from(err: reqwest::Error) -> Self {
        StatsError::Upstream {
            status: err.status().map(|s| s.as_u16()),
            body: err.to_string(),
        }
    }
}
