use std::{collections::HashMap, sync::Arc};

use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    config::Settings,
    error::StatsError,
    management::{CredentialStore, credentials::FailedRefresh},
    spotify,
    types::TokenGrant,
};

type RefreshFlight = Shared<BoxFuture<'static, Result<TokenGrant, StatsError>>>;

/// Exchanges authorization codes and refreshes access tokens.
///
/// Refreshes are single-flight per refresh token: while one is in flight,
/// every other caller presenting the same refresh token awaits that same
/// upstream call. The entry is dropped once the call settles, successfully
/// or not, so a later genuine need starts a new one. Different refresh
/// tokens never wait on each other.
#[derive(Clone)]
pub struct TokenManager {
    http: Client,
    settings: Arc<Settings>,
    in_flight: Arc<Mutex<HashMap<String, RefreshFlight>>>,
}

impl TokenManager {
    /// Creates a manager with an empty in-flight table.
    ///
    /// # Arguments
    ///
    /// * `http` - Client used for token endpoint calls, already bounded by
    ///   the request timeout
    /// * `settings` - Shared settings holding the client credentials and the
    ///   token endpoint url
    pub fn new(http: Client, settings: Arc<Settings>) -> Self {
        TokenManager {
            http,
            settings,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Trades an authorization code for a token grant.
    ///
    /// Exchanges are never coalesced: a code is single-use at the provider.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code from the redirect
    /// * `redirect_uri` - Must match the uri used for the authorize request
    ///
    /// # Errors
    ///
    /// - `Configuration` when client credentials are missing
    /// - `UpstreamAuth` when the provider rejects the code
    /// - `Upstream` on transport failures or an unreadable response
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use echostats::{config::Settings, management::TokenManager, spotify::client::http_client};
    ///
    /// # async fn run() -> Result<(), echostats::error::StatsError> {
    /// let settings = Arc::new(Settings::from_env());
    /// let tokens = TokenManager::new(http_client(&settings)?, settings);
    /// let grant = tokens
    ///     .exchange_code("code-from-redirect", "http://localhost:5173/callback")
    ///     .await?;
    /// println!("{}", grant.access_token);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenGrant, StatsError> {
        spotify::auth::exchange_code(&self.http, &self.settings, code, redirect_uri).await
    }

    /// Refreshes `refresh_token`, joining an identical refresh if one is
    /// already running.
    ///
    /// The returned grant always carries a refresh token: when the provider
    /// does not rotate it, the caller's token is kept.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank refresh token, without an upstream call
    /// - `Configuration` when client credentials are missing
    /// - `UpstreamAuth` when the provider rejects the refresh token
    /// - `Upstream` on transport failures
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, StatsError> {
        if refresh_token.trim().is_empty() {
            return Err(StatsError::Validation("missing refresh token".to_string()));
        }

        let flight = {
            let mut flights = self.in_flight.lock().await;
            match flights.get(refresh_token) {
                Some(flight) => {
                    tracing::debug!("joining in-flight token refresh");
                    flight.clone()
                }
                None => {
                    let flight = self.start_refresh(refresh_token.to_string());
                    flights.insert(refresh_token.to_string(), flight.clone());
                    flight
                }
            }
        };

        flight.await
    }

    /// Refreshes the session behind `store` after `stale` was rejected.
    ///
    /// If the store already holds a newer access token, another caller has
    /// refreshed in the meantime and that token is returned without an
    /// upstream call. Likewise, if the previous attempt for `stale` failed,
    /// its error is returned again.
    ///
    /// # Errors
    ///
    /// - `UpstreamAuth` when the session has no refresh token, or the
    ///   provider rejects it
    /// - `Configuration` when client credentials are missing
    /// - `Upstream` on transport failures
    pub async fn refresh_session(
        &self,
        store: &CredentialStore,
        stale: &str,
    ) -> Result<String, StatsError> {
        let mut gate = store.refresh_gate().await;
        let current = store.pair().await;
        if current.access_token != stale {
            return Ok(current.access_token);
        }
        if let Some(failed) = gate.as_ref().filter(|f| f.stale == stale) {
            tracing::debug!("reusing failed refresh outcome of this session");
            return Err(failed.error.clone());
        }

        let Some(refresh_token) = current.refresh_token else {
            return Err(StatsError::UpstreamAuth {
                status: 401,
                body: "access token rejected and no refresh token available".to_string(),
            });
        };

        match self.refresh(&refresh_token).await {
            Ok(grant) => {
                *gate = None;
                Ok(store.replace_if_current(stale, grant.credentials()).await)
            }
            Err(error) => {
                *gate = Some(FailedRefresh {
                    stale: stale.to_string(),
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Number of refreshes currently in flight.
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    // The upstream call runs on its own task so it settles, and clears its
    // map entry, even if every waiter is dropped.
    fn start_refresh(&self, refresh_token: String) -> RefreshFlight {
        let manager = self.clone();
        let task = tokio::spawn(async move {
            let result =
                spotify::auth::refresh_token(&manager.http, &manager.settings, &refresh_token)
                    .await
                    .map(|mut grant| {
                        if grant.refresh_token.is_none() {
                            grant.refresh_token = Some(refresh_token.clone());
                        }
                        grant
                    });

            manager.in_flight.lock().await.remove(&refresh_token);
            result
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(StatsError::Upstream {
                    status: None,
                    body: format!("token refresh task failed: {}", e),
                })
            })
        }
        .boxed()
        .shared()
    }
}
