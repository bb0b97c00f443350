//! # Listening Summary Aggregation
//!
//! Turns one [`RawSnapshot`] into a [`DerivedSummary`]. Everything here is a
//! pure function of its inputs: `now` is always passed in, so the same
//! snapshot and instant give an identical summary.
//!
//! - [`genres`] - case-folded genre histogram over the top artists
//! - [`features`] - tempo/energy/danceability averages over the top tracks
//! - [`recency`] - recency windows, minute totals, sessions, hourly and
//!   daily buckets, yearly projection
//! - [`albums`] - top albums by play count over recently played items
//!
//! Missing optional upstream fields degrade the matching output to empty or
//! `None`; they never fail the aggregation.

pub mod albums;
pub mod features;
pub mod genres;
pub mod recency;

use chrono::{DateTime, Duration, FixedOffset, Utc};

pub use albums::{TOP_ALBUM_LIMIT, top_albums};
pub use features::audio_feature_summary;
pub use genres::{TOP_GENRE_LIMIT, top_genres};
pub use recency::{
    RecencyWindow, count_sessions, daily_listening, estimate_yearly_minutes, hourly_listening,
    total_minutes, window_plays,
};

use crate::{
    config::Settings,
    error::StatsError,
    types::{DerivedSummary, PlayHistory, RawSnapshot},
};

pub const SESSION_GAP_MINUTES: i64 = 30;
pub const DAILY_HISTORY_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOptions {
    /// Window behind `listeningMinutesRecent`, `sessionsCount` and the
    /// yearly projection.
    pub recent_window: RecencyWindow,
    pub session_gap: Duration,
    /// Local offset for hour-of-day and calendar-date buckets.
    pub utc_offset: FixedOffset,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl AggregateOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        AggregateOptions {
            recent_window: settings.recent_window,
            session_gap: Duration::minutes(SESSION_GAP_MINUTES),
            utc_offset: settings.utc_offset,
        }
    }

    pub fn with_utc_offset(mut self, utc_offset: FixedOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }
}

/// Builds the summary for `snapshot` as seen at `now`.
///
/// # Errors
///
/// Returns `StatsError::Aggregation` only for unusable options (a
/// non-positive session gap or an empty recent window). Snapshot contents
/// never cause an error.
pub fn aggregate(
    snapshot: &RawSnapshot,
    now: DateTime<Utc>,
    options: &AggregateOptions,
) -> Result<DerivedSummary, StatsError> {
    if options.session_gap <= Duration::zero() {
        return Err(StatsError::Aggregation(
            "session gap must be positive".to_string(),
        ));
    }
    if options.recent_window.length_days() <= 0.0 {
        return Err(StatsError::Aggregation(
            "recent window must not be empty".to_string(),
        ));
    }

    let plays = &snapshot.recently_played.items;
    let offset = options.utc_offset;

    let recent = window_plays(plays, options.recent_window, now, offset);
    let today = window_plays(plays, RecencyWindow::Today, now, offset);
    let last_week = window_plays(plays, RecencyWindow::Days(DAILY_HISTORY_DAYS), now, offset);

    let listening_minutes_recent = total_minutes(&recent);

    Ok(DerivedSummary {
        profile: snapshot.profile.clone(),
        time_range: snapshot.time_range,
        top_tracks: snapshot.top_tracks.clone(),
        top_artists: snapshot.top_artists.clone(),
        playlists: snapshot.playlists.clone(),
        recent_tracks: newest_first(&recent),
        listening_minutes_recent,
        estimated_yearly_minutes: estimate_yearly_minutes(
            listening_minutes_recent,
            options.recent_window.length_days(),
        ),
        sessions_count: count_sessions(recent.iter().map(|p| p.played_at), options.session_gap),
        listening_minutes_today: total_minutes(&today),
        session_count_today: count_sessions(today.iter().map(|p| p.played_at), options.session_gap),
        listening_minutes_last_7_days: total_minutes(&last_week),
        audio_feature_summary: audio_feature_summary(&snapshot.audio_features),
        top_genres: top_genres(&snapshot.top_artists.items, TOP_GENRE_LIMIT),
        top_albums: top_albums(plays, TOP_ALBUM_LIMIT),
        hourly_listening: hourly_listening(&today, offset),
        daily_listening: daily_listening(&last_week, offset, DAILY_HISTORY_DAYS as usize),
    })
}

// Display order only; session counting sorts its own copy ascending.
fn newest_first(plays: &[&PlayHistory]) -> Vec<PlayHistory> {
    let mut sorted: Vec<PlayHistory> = plays.iter().map(|p| (*p).clone()).collect();
    sorted.sort_by(|a, b| b.played_at.cmp(&a.played_at));
    sorted
}
