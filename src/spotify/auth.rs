use reqwest::{Client, Response};

use crate::{
    config::{ClientCredentials, Settings},
    error::StatsError,
    types::TokenGrant,
};

/// Exchanges an authorization code for a token grant using the
/// server-held client credentials.
///
/// # Errors
///
/// - `Configuration` if the client id or secret is not configured
/// - `UpstreamAuth` if the provider answers with a non-2xx status; the status
///   and body are kept in the error and logged
/// - `Upstream` on transport failures or an undecodable response
pub async fn exchange_code(
    http: &Client,
    settings: &Settings,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenGrant, StatsError> {
    let credentials = client_credentials(settings)?;

    tracing::info!("exchanging authorization code for token");
    let res = http
        .post(&settings.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ])
        .send()
        .await?;

    read_grant(res, "token exchange failed").await
}

/// Posts a `refresh_token` grant. Same failure taxonomy as
/// [`exchange_code`]. The grant is returned as the provider sent it, so
/// `refresh_token` may be absent.
pub async fn refresh_token(
    http: &Client,
    settings: &Settings,
    refresh_token: &str,
) -> Result<TokenGrant, StatsError> {
    let credentials = client_credentials(settings)?;

    tracing::info!("refreshing access token");
    let res = http
        .post(&settings.token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ])
        .send()
        .await?;

    read_grant(res, "token refresh failed").await
}

fn client_credentials(settings: &Settings) -> Result<&ClientCredentials, StatsError> {
    settings.credentials.as_ref().ok_or_else(|| {
        tracing::error!("SPOTIFY_CLIENT_ID or SPOTIFY_CLIENT_SECRET is not set");
        StatsError::Configuration("missing Spotify client credentials".to_string())
    })
}

async fn read_grant(res: Response, failure: &str) -> Result<TokenGrant, StatsError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), %body, "{}", failure);
        return Err(StatsError::UpstreamAuth {
            status: status.as_u16(),
            body,
        });
    }

    res.json::<TokenGrant>()
        .await
        .map_err(|e| StatsError::Upstream {
            status: Some(status.as_u16()),
            body: format!("malformed token response: {}", e),
        })
}
