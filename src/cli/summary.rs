use std::{sync::Arc, time::Duration};

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config::Settings,
    error, info,
    management::{CredentialStore, TokenManager},
    success,
    spotify::{client::SpotifyClient, snapshot},
    stats::{self, AggregateOptions},
    types::{
        AlbumTableRow, CredentialPair, DailyTableRow, DerivedSummary, GenreTableRow, TimeRange,
    },
    warning,
};

/// Fetches and aggregates the listening summary for one access token and
/// prints it as tables, or as the same JSON the HTTP endpoint returns.
pub async fn summary(
    access_token: String,
    refresh_token: Option<String>,
    time_range: String,
    as_json: bool,
) {
    let settings = Arc::new(Settings::from_env());
    let client = match SpotifyClient::new(&settings) {
        Ok(c) => c,
        Err(e) => error!("Cannot create Spotify client. Err: {}", e),
    };
    let tokens = TokenManager::new(client.http().clone(), Arc::clone(&settings));
    let store = CredentialStore::new(CredentialPair {
        access_token,
        refresh_token,
    });
    let time_range = TimeRange::parse_lenient(&time_range);

    let pb = ProgressBar::new_spinner();
    pb.set_message("Fetching listening data...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let fetched =
        snapshot::fetch_snapshot(&client, &tokens, &store, time_range, settings.fetch_policy)
            .await;
    pb.finish_and_clear();

    let snapshot = match fetched {
        Ok(s) => s,
        Err(e) if e.is_auth() => {
            error!(
                "Spotify rejected the access token. Log in again to get a new one.\n Error: {}",
                e
            )
        }
        Err(e) => error!("Failed to fetch stats. Err: {}", e),
    };

    let summary = match stats::aggregate(
        &snapshot,
        Utc::now(),
        &AggregateOptions::from_settings(&settings),
    ) {
        Ok(s) => s,
        Err(e) => error!("Failed to aggregate stats. Err: {}", e),
    };

    if store.was_refreshed().await {
        let pair = store.pair().await;
        warning!("Access token was refreshed: {}", pair.access_token);
        if let Some(refresh_token) = pair.refresh_token {
            warning!("Refresh token: {}", refresh_token);
        }
    }

    if as_json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Cannot serialize summary. Err: {}", e),
        }
        return;
    }

    print_summary(&summary);
}

fn print_summary(summary: &DerivedSummary) {
    match summary.profile.get("display_name").and_then(|v| v.as_str()) {
        Some(name) => success!("Listening summary for {}", name),
        None => success!("Listening summary"),
    }
    info!("Time range: {}", summary.time_range.as_str());
    info!(
        "Recent listening: {} min in {} sessions",
        summary.listening_minutes_recent, summary.sessions_count
    );
    match summary.estimated_yearly_minutes {
        Some(minutes) => info!("Rough yearly projection: {} min", minutes),
        None => info!("Rough yearly projection: not enough recent listening"),
    }
    info!(
        "Today: {} min in {} sessions, last 7 days: {} min",
        summary.listening_minutes_today,
        summary.session_count_today,
        summary.listening_minutes_last_7_days
    );

    if let Some(features) = &summary.audio_feature_summary {
        info!(
            "Mood: {} BPM, {}% energy, {}% danceability",
            features.avg_tempo, features.avg_energy, features.avg_danceability
        );
    }

    if !summary.top_genres.is_empty() {
        let rows: Vec<GenreTableRow> = summary
            .top_genres
            .iter()
            .map(|g| GenreTableRow {
                genre: g.genre.clone(),
                artists: g.count,
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    if !summary.top_albums.is_empty() {
        let rows: Vec<AlbumTableRow> = summary
            .top_albums
            .iter()
            .map(|a| AlbumTableRow {
                name: a.name.clone(),
                plays: a.play_count,
                minutes: a.minutes,
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    if summary.daily_listening.is_empty() {
        warning!("Not enough history for a daily breakdown yet.");
    } else {
        let rows: Vec<DailyTableRow> = summary
            .daily_listening
            .iter()
            .map(|d| DailyTableRow {
                date: d.date.format("%Y-%m-%d").to_string(),
                minutes: d.minutes,
            })
            .collect();
        println!("{}", Table::new(rows));
    }
}
