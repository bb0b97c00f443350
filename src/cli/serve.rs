use tracing_subscriber::EnvFilter;

use crate::{
    config::Settings,
    error, info,
    server::{self, AppState},
    warning,
};

const DEFAULT_LOG_FILTER: &str = "echostats=info,tower_http=info";

pub async fn serve(port: Option<u16>) {
    init_tracing();

    let mut settings = Settings::from_env();
    if let Some(port) = port {
        settings.port = port;
    }

    if settings.credentials.is_none() {
        warning!(
            "SPOTIFY_CLIENT_ID or SPOTIFY_CLIENT_SECRET is not set; token endpoints will answer with a configuration error."
        );
    }

    info!(
        "Backend running on {}:{}",
        settings.server_address, settings.port
    );

    let state = match AppState::new(settings.shared()) {
        Ok(state) => state,
        Err(e) => error!("Cannot start server. Err: {}", e),
    };

    if let Err(e) = server::start_api_server(state).await {
        error!("Server stopped. Err: {}", e);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
