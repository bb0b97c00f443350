use std::sync::Arc;

use crate::{
    config::Settings,
    error, info,
    management::TokenManager,
    spotify::client::http_client,
    success,
    types::TokenGrant,
};

/// Exchanges an authorization code by hand, e.g. one copied from the
/// redirect after consenting in the browser.
///
/// Falls back to `SPOTIFY_REDIRECT_URI` when no redirect uri is given; the
/// provider requires it to match the one used for the authorize request.
pub async fn exchange(code: String, redirect_uri: Option<String>) {
    let settings = Arc::new(Settings::from_env());
    let Some(redirect_uri) = redirect_uri.or_else(|| settings.redirect_uri.clone()) else {
        error!("No redirect uri. Pass --redirect-uri or set SPOTIFY_REDIRECT_URI.");
    };

    match manager(settings).exchange_code(&code, &redirect_uri).await {
        Ok(grant) => print_grant(&grant),
        Err(e) => error!("Token exchange failed. Err: {}", e),
    }
}

pub async fn refresh(refresh_token: String) {
    let settings = Arc::new(Settings::from_env());

    match manager(settings).refresh(&refresh_token).await {
        Ok(grant) => print_grant(&grant),
        Err(e) => error!("Failed to refresh token. Err: {}", e),
    }
}

fn manager(settings: Arc<Settings>) -> TokenManager {
    let http = match http_client(&settings) {
        Ok(http) => http,
        Err(e) => error!("Cannot create HTTP client. Err: {}", e),
    };
    TokenManager::new(http, settings)
}

fn print_grant(grant: &TokenGrant) {
    success!("Received access token");
    info!("Access token: {}", grant.access_token);
    if let Some(refresh_token) = &grant.refresh_token {
        info!("Refresh token: {}", refresh_token);
    }
    if let Some(expires_in) = grant.expires_in {
        info!("Expires in: {}s", expires_in);
    }
    if let Some(scope) = &grant.scope {
        info!("Scope: {}", scope);
    }
}
