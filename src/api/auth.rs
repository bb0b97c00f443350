use axum::{
    Extension, Json,
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{api::error_response, error::StatsError, server::AppState, utils};

const CONFIGURATION_ERROR: &str = "Server configuration error: Missing Spotify credentials";

#[derive(Debug, Default, Deserialize)]
pub struct CallbackRequest {
    pub code: Option<String>,
    #[serde(rename = "redirectUri")]
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

pub async fn callback(Extension(state): Extension<AppState>, body: Bytes) -> Response {
    let request: CallbackRequest = parse_body(&body);
    let (Some(code), Some(redirect_uri)) = (
        utils::non_empty(request.code),
        utils::non_empty(request.redirect_uri),
    ) else {
        tracing::warn!("callback request without code or redirectUri");
        return error_response(StatusCode::BAD_REQUEST, "Missing code or redirectUri");
    };

    match state.tokens.exchange_code(&code, &redirect_uri).await {
        Ok(grant) => {
            tracing::info!("token exchange successful");
            Json(grant).into_response()
        }
        Err(StatsError::Configuration(_)) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, CONFIGURATION_ERROR)
        }
        Err(e) => {
            tracing::error!(error = %e, "token exchange error");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Token exchange failed")
        }
    }
}

pub async fn refresh(Extension(state): Extension<AppState>, body: Bytes) -> Response {
    let request: RefreshRequest = parse_body(&body);
    let Some(refresh_token) = utils::non_empty(request.refresh_token) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing refresh_token");
    };

    match state.tokens.refresh(&refresh_token).await {
        Ok(grant) => Json(grant).into_response(),
        Err(StatsError::Configuration(_)) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, CONFIGURATION_ERROR)
        }
        Err(e) => {
            tracing::error!(error = %e, "token refresh error");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to refresh token")
        }
    }
}

// A body that is not a JSON object is treated like one with no fields, so
// it ends up in the same 400 as a request with missing fields.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}
