//! Fan-out fetcher: gathers every upstream response one summary needs.
//!
//! All reads run concurrently under the same access token and are joined
//! before anything is returned, so the aggregation never sees a partially
//! assembled snapshot. A 401 from any read triggers exactly one refresh of
//! the session followed by one full re-fetch; a second 401 is terminal.

use std::{future::Future, str::FromStr};

use serde_json::{Value, json};

use crate::{
    error::StatsError,
    management::{CredentialStore, TokenManager},
    spotify::client::SpotifyClient,
    types::{Artist, AudioFeaturesResponse, Paging, PlayHistory, RawSnapshot, TimeRange, Track},
};

const TOP_ITEMS_LIMIT: &str = "50";
const RECENTLY_PLAYED_LIMIT: &str = "50";
const PLAYLISTS_LIMIT: &str = "20";

/// How a failing read affects the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Any failing read fails the snapshot.
    #[default]
    AllOrNothing,
    /// Playlists and audio features degrade to empty on non-auth failures.
    /// Profile, top items and recently played stay mandatory.
    BestEffort,
}

impl FromStr for FetchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "all_or_nothing" => Ok(FetchPolicy::AllOrNothing),
            "best_effort" => Ok(FetchPolicy::BestEffort),
            other => Err(format!("unknown fetch policy: {}", other)),
        }
    }
}

/// Fetches a complete snapshot for the session held in `store`.
///
/// # Errors
///
/// - `UpstreamAuth` when the token is rejected again after the single
///   refresh, or when it is rejected and the session has no refresh token
/// - `Upstream` for any other failing read (subject to `policy`)
/// - whatever the token refresh reports when it fails
pub async fn fetch_snapshot(
    client: &SpotifyClient,
    tokens: &TokenManager,
    store: &CredentialStore,
    time_range: TimeRange,
    policy: FetchPolicy,
) -> Result<RawSnapshot, StatsError> {
    let token = store.access_token().await;

    match fetch_once(client, &token, time_range, policy).await {
        Err(err) if err.is_auth() => {
            tracing::info!("access token rejected, refreshing once before retrying");
            let fresh = tokens.refresh_session(store, &token).await?;
            fetch_once(client, &fresh, time_range, policy).await
        }
        result => result,
    }
}

async fn fetch_once(
    client: &SpotifyClient,
    token: &str,
    time_range: TimeRange,
    policy: FetchPolicy,
) -> Result<RawSnapshot, StatsError> {
    let top_query = [("limit", TOP_ITEMS_LIMIT), ("time_range", time_range.as_str())];

    let (profile, top_tracks, top_artists, recently_played, playlists) = tokio::try_join!(
        client.get::<Value>(token, "/me", &[]),
        client.get::<Paging<Track>>(token, "/me/top/tracks", &top_query),
        client.get::<Paging<Artist>>(token, "/me/top/artists", &top_query),
        client.get::<Paging<PlayHistory>>(
            token,
            "/me/player/recently-played",
            &[("limit", RECENTLY_PLAYED_LIMIT)],
        ),
        degrade(
            policy,
            "playlists",
            client.get::<Value>(token, "/me/playlists", &[("limit", PLAYLISTS_LIMIT)]),
            || json!({ "items": [] }),
        ),
    )?;

    let track_ids: Vec<&str> = top_tracks
        .items
        .iter()
        .filter_map(|t| t.id.as_deref())
        .filter(|id| !id.is_empty())
        .collect();

    let audio_features = if track_ids.is_empty() {
        Vec::new()
    } else {
        let ids = track_ids.join(",");
        degrade(
            policy,
            "audio features",
            client.get::<AudioFeaturesResponse>(token, "/audio-features", &[("ids", ids.as_str())]),
            AudioFeaturesResponse::default,
        )
        .await?
        .audio_features
    };

    Ok(RawSnapshot {
        time_range,
        profile,
        top_tracks,
        top_artists,
        recently_played,
        playlists,
        audio_features,
    })
}

async fn degrade<T>(
    policy: FetchPolicy,
    source: &str,
    read: impl Future<Output = Result<T, StatsError>>,
    fallback: impl FnOnce() -> T,
) -> Result<T, StatsError> {
    match read.await {
        Err(err) if policy == FetchPolicy::BestEffort && !err.is_auth() => {
            tracing::warn!(source, error = %err, "optional source failed, continuing without it");
            Ok(fallback())
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_policy_parses_both_spellings() {
        assert_eq!(
            "all_or_nothing".parse::<FetchPolicy>(),
            Ok(FetchPolicy::AllOrNothing)
        );
        assert_eq!("Best-Effort".parse::<FetchPolicy>(), Ok(FetchPolicy::BestEffort));
        assert!("partial".parse::<FetchPolicy>().is_err());
    }
}
