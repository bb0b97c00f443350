use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    Res, api,
    config::Settings,
    error::StatsError,
    management::TokenManager,
    spotify::client::SpotifyClient,
};

/// Everything a request handler needs, cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub spotify: SpotifyClient,
    pub tokens: TokenManager,
}

impl AppState {
    pub fn new(settings: Arc<Settings>) -> Result<Self, StatsError> {
        let spotify = SpotifyClient::new(&settings)?;
        let tokens = TokenManager::new(spotify.http().clone(), Arc::clone(&settings));
        Ok(AppState {
            settings,
            spotify,
            tokens,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/auth/callback", post(api::callback))
        .route("/auth/refresh", post(api::refresh))
        .route("/stats/summary", get(api::summary))
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn start_api_server(state: AppState) -> Res<()> {
    let addr = SocketAddr::from_str(&format!(
        "{}:{}",
        state.settings.server_address, state.settings.port
    ))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
