mod common;

use std::sync::Arc;

use echostats::{
    config::Settings,
    error::StatsError,
    management::{CredentialStore, TokenManager},
    spotify::{
        client::{SpotifyClient, http_client},
        snapshot::{FetchPolicy, fetch_snapshot},
    },
    types::{CredentialPair, TimeRange},
};
use serde_json::json;

struct Fetcher {
    client: SpotifyClient,
    tokens: TokenManager,
}

fn fetcher(settings: Settings) -> Fetcher {
    let settings = Arc::new(settings);
    let http = http_client(&settings).unwrap();
    Fetcher {
        client: SpotifyClient::with_http(http.clone(), &settings.api_url),
        tokens: TokenManager::new(http, settings),
    }
}

fn session(access: &str, refresh: Option<&str>) -> CredentialStore {
    CredentialStore::new(CredentialPair {
        access_token: access.to_string(),
        refresh_token: refresh.map(str::to_string),
    })
}

#[tokio::test]
async fn gathers_every_source_for_the_requested_range() {
    let upstream = common::spawn().await;
    let f = fetcher(upstream.settings());
    let store = session(common::VALID_TOKEN, None);

    let snapshot = fetch_snapshot(
        &f.client,
        &f.tokens,
        &store,
        TimeRange::MediumTerm,
        FetchPolicy::AllOrNothing,
    )
    .await
    .unwrap();

    assert_eq!(snapshot.time_range, TimeRange::MediumTerm);
    assert_eq!(snapshot.profile["id"], "listener");
    assert_eq!(snapshot.top_tracks.items.len(), 2);
    assert_eq!(snapshot.top_artists.items.len(), 2);
    assert_eq!(snapshot.recently_played.items.len(), 2);
    assert_eq!(snapshot.playlists["items"][0]["name"], "Mix");
    // one entry per requested id, unknown ids come back null
    assert_eq!(snapshot.audio_features.len(), 2);
    assert!(snapshot.audio_features[0].is_some());
    assert!(snapshot.audio_features[1].is_none());

    assert_eq!(upstream.state.time_ranges(), vec!["medium_term"]);
    assert!(!store.was_refreshed().await);
}

#[tokio::test]
async fn skips_audio_features_without_track_ids() {
    let upstream = common::spawn().await;
    upstream.state.set_top_tracks(json!({ "items": [] }));
    let f = fetcher(upstream.settings());
    let store = session(common::VALID_TOKEN, None);

    let snapshot = fetch_snapshot(
        &f.client,
        &f.tokens,
        &store,
        TimeRange::ShortTerm,
        FetchPolicy::AllOrNothing,
    )
    .await
    .unwrap();

    assert!(snapshot.audio_features.is_empty());
    assert_eq!(upstream.state.audio_feature_calls(), 0);
}

#[tokio::test]
async fn expired_token_is_refreshed_once_and_retried() {
    let upstream = common::spawn().await;
    let f = fetcher(upstream.settings());
    let store = session("expired", Some(common::REFRESH_TOKEN));

    let snapshot = fetch_snapshot(
        &f.client,
        &f.tokens,
        &store,
        TimeRange::ShortTerm,
        FetchPolicy::AllOrNothing,
    )
    .await
    .unwrap();

    assert_eq!(snapshot.top_tracks.items.len(), 2);
    assert_eq!(upstream.state.refresh_calls(), 1);
    assert!(store.was_refreshed().await);
    assert_eq!(store.access_token().await, "fresh-1");
}

#[tokio::test]
async fn second_rejection_is_terminal() {
    let upstream = common::spawn().await;
    upstream.state.reject_all_tokens();
    let f = fetcher(upstream.settings());
    let store = session("expired", Some(common::REFRESH_TOKEN));

    let err = fetch_snapshot(
        &f.client,
        &f.tokens,
        &store,
        TimeRange::ShortTerm,
        FetchPolicy::AllOrNothing,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, StatsError::UpstreamAuth { status: 401, .. }));
    assert_eq!(upstream.state.refresh_calls(), 1);
}

#[tokio::test]
async fn rejection_without_refresh_token_is_an_auth_error() {
    let upstream = common::spawn().await;
    let f = fetcher(upstream.settings());
    let store = session("expired", None);

    let err = fetch_snapshot(
        &f.client,
        &f.tokens,
        &store,
        TimeRange::ShortTerm,
        FetchPolicy::AllOrNothing,
    )
    .await
    .unwrap_err();

    assert!(err.is_auth());
    assert_eq!(upstream.state.refresh_calls(), 0);
}

#[tokio::test]
async fn one_failing_read_fails_the_whole_snapshot() {
    let upstream = common::spawn().await;
    upstream.state.fail_playlists(500);
    let f = fetcher(upstream.settings());
    let store = session(common::VALID_TOKEN, Some(common::REFRESH_TOKEN));

    let err = fetch_snapshot(
        &f.client,
        &f.tokens,
        &store,
        TimeRange::ShortTerm,
        FetchPolicy::AllOrNothing,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, StatsError::Upstream { status: Some(500), .. }));
    // only a 401 triggers a refresh
    assert_eq!(upstream.state.refresh_calls(), 0);
}

#[tokio::test]
async fn rate_limiting_is_not_retried() {
    let upstream = common::spawn().await;
    upstream.state.fail_playlists(429);
    let f = fetcher(upstream.settings());
    let store = session(common::VALID_TOKEN, Some(common::REFRESH_TOKEN));

    let err = fetch_snapshot(
        &f.client,
        &f.tokens,
        &store,
        TimeRange::ShortTerm,
        FetchPolicy::AllOrNothing,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, StatsError::Upstream { status: Some(429), .. }));
    assert_eq!(upstream.state.refresh_calls(), 0);
}

#[tokio::test]
async fn best_effort_degrades_playlists() {
    let upstream = common::spawn().await;
    upstream.state.fail_playlists(503);
    let f = fetcher(upstream.settings());
    let store = session(common::VALID_TOKEN, None);

    let snapshot = fetch_snapshot(
        &f.client,
        &f.tokens,
        &store,
        TimeRange::ShortTerm,
        FetchPolicy::BestEffort,
    )
    .await
    .unwrap();

    assert_eq!(snapshot.playlists, json!({ "items": [] }));
    assert_eq!(snapshot.top_tracks.items.len(), 2);
}

#[tokio::test]
async fn unreachable_upstream_is_an_upstream_error() {
    let settings = Settings {
        api_url: "http://127.0.0.1:1".to_string(),
        ..Settings::default()
    };
    let f = fetcher(settings);
    let store = session(common::VALID_TOKEN, None);

    let err = fetch_snapshot(
        &f.client,
        &f.tokens,
        &store,
        TimeRange::ShortTerm,
        FetchPolicy::AllOrNothing,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, StatsError::Upstream { status: None, .. }));
}
