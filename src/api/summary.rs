use axum::{
    Extension, Json,
    extract::Query,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    api::error_response,
    config,
    error::StatsError,
    management::CredentialStore,
    server::AppState,
    spotify::snapshot,
    stats::{self, AggregateOptions},
    types::{CredentialPair, DerivedSummary, TimeRange},
    utils,
};

pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

#[derive(Debug, Default)]
pub struct SummaryQuery {
    pub time_range: Option<String>,
    /// Minutes east of UTC used for the hourly and daily buckets.
    pub utc_offset: Option<String>,
}

impl SummaryQuery {
    /// Picks the known keys out of raw query pairs. The first occurrence of
    /// a key wins and unknown keys are ignored, so no query string is ever
    /// rejected.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = SummaryQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "time_range" => &mut query.time_range,
                "utc_offset" => &mut query.utc_offset,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

pub async fn summary(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let query = SummaryQuery::from_pairs(pairs);
    let Some(access_token) = utils::bearer_token(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "Missing Bearer token");
    };

    let store = CredentialStore::new(CredentialPair {
        access_token,
        refresh_token: utils::header_string(&headers, REFRESH_TOKEN_HEADER),
    });
    let time_range = query
        .time_range
        .as_deref()
        .map(TimeRange::parse_lenient)
        .unwrap_or_default();
    let utc_offset = query
        .utc_offset
        .as_deref()
        .and_then(|v| v.trim().parse::<i32>().ok())
        .and_then(config::offset_from_minutes)
        .unwrap_or(state.settings.utc_offset);
    let options = AggregateOptions::from_settings(&state.settings).with_utc_offset(utc_offset);

    match build_summary(&state, &store, time_range, &options).await {
        Ok(summary) => {
            let mut response = Json(summary).into_response();
            if store.was_refreshed().await {
                attach_rotated_credentials(&mut response, store.pair().await);
            }
            response
        }
        Err(e) if e.is_auth() => {
            tracing::warn!(error = %e, "access token rejected after refresh, client must re-authenticate");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch stats")
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to build listening summary");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch stats")
        }
    }
}

async fn build_summary(
    state: &AppState,
    store: &CredentialStore,
    time_range: TimeRange,
    options: &AggregateOptions,
) -> Result<DerivedSummary, StatsError> {
    let snapshot = snapshot::fetch_snapshot(
        &state.spotify,
        &state.tokens,
        store,
        time_range,
        state.settings.fetch_policy,
    )
    .await?;

    stats::aggregate(&snapshot, Utc::now(), options)
}

fn attach_rotated_credentials(response: &mut Response, pair: CredentialPair) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&pair.access_token) {
        headers.insert(ACCESS_TOKEN_HEADER, value);
    }
    if let Some(value) = pair
        .refresh_token
        .and_then(|token| HeaderValue::from_str(&token).ok())
    {
        headers.insert(REFRESH_TOKEN_HEADER, value);
    }
}
