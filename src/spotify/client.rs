use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::{config::Settings, error::StatsError};

/// Builds the shared HTTP client. Every upstream call, token endpoint
/// included, is bounded by the configured timeout.
pub fn http_client(settings: &Settings) -> Result<Client, StatsError> {
    Client::builder()
        .timeout(settings.request_timeout)
        .build()
        .map_err(|e| StatsError::Configuration(format!("cannot build HTTP client: {}", e)))
}

/// Bearer-authenticated reads against the Web API.
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
}

impl SpotifyClient {
    pub fn new(settings: &Settings) -> Result<Self, StatsError> {
        Ok(Self::with_http(http_client(settings)?, &settings.api_url))
    }

    pub fn with_http(http: Client, api_url: &str) -> Self {
        SpotifyClient {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Issues `GET {api_url}{endpoint}` and decodes the JSON body.
    ///
    /// A 401 maps to `UpstreamAuth` so the caller can decide whether to
    /// refresh. Every other non-2xx, rate limiting included, maps to
    /// `Upstream`; the body is logged but kept out of client responses.
    pub async fn get<T: DeserializeOwned>(
        &self,
        token: &str,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, StatsError> {
        let url = format!("{}{}", self.api_url, endpoint);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(endpoint, error = %e, "Spotify API request failed");
                StatsError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED {
                tracing::warn!(endpoint, %body, "Spotify API rejected access token");
                return Err(StatsError::UpstreamAuth {
                    status: status.as_u16(),
                    body,
                });
            }

            tracing::error!(status = status.as_u16(), endpoint, %body, "Spotify API error");
            return Err(StatsError::Upstream {
                status: Some(status.as_u16()),
                body,
            });
        }

        response.json::<T>().await.map_err(|e| StatsError::Upstream {
            status: Some(status.as_u16()),
            body: format!("malformed response from {}: {}", endpoint, e),
        })
    }
}
