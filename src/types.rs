use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tabled::Tabled;

/// Reads an explicit JSON `null` as the type's default. Paired with
/// `#[serde(default)]`, which only covers absent fields.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Access/refresh token pair held by one client session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Token endpoint response. Unknown fields are kept so the grant can be
/// handed back to the client unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenGrant {
    pub fn credentials(&self) -> CredentialPair {
        CredentialPair {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    #[default]
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TimeRange {
    /// Anything outside the known set falls back to `ShortTerm`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw {
            "medium_term" => TimeRange::MediumTerm,
            "long_term" => TimeRange::LongTerm,
            _ => TimeRange::ShortTerm,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifiedArtist {
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Album {
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub release_date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Track {
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub uri: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub duration_ms: u64,
    pub popularity: Option<u32>,
    pub album: Option<Album>,
    #[serde(deserialize_with = "null_as_default")]
    pub artists: Vec<SimplifiedArtist>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Artist {
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub genres: Vec<String>,
    pub popularity: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayHistory {
    pub played_at: DateTime<Utc>,
    #[serde(default)]
    pub track: Option<Track>,
}

impl PlayHistory {
    pub fn duration_ms(&self) -> u64 {
        self.track.as_ref().map_or(0, |t| t.duration_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paging<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl<T> Default for Paging<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: None,
        }
    }
}

impl<T> Paging<T> {
    pub fn of(items: Vec<T>) -> Self {
        Self { items, total: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioFeatures {
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub tempo: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub energy: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub danceability: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioFeaturesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub audio_features: Vec<Option<AudioFeatures>>,
}

/// Every upstream response gathered for one summary request. Built once by
/// the fetcher and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSnapshot {
    pub time_range: TimeRange,
    pub profile: Value,
    pub top_tracks: Paging<Track>,
    pub top_artists: Paging<Artist>,
    pub recently_played: Paging<PlayHistory>,
    pub playlists: Value,
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFeatureSummary {
    pub avg_tempo: i64,
    pub avg_energy: i64,
    pub avg_danceability: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumStat {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub play_count: u32,
    pub minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyListening {
    pub date: NaiveDate,
    pub minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedSummary {
    pub profile: Value,
    pub time_range: TimeRange,
    pub top_tracks: Paging<Track>,
    pub top_artists: Paging<Artist>,
    pub playlists: Value,
    pub recent_tracks: Vec<PlayHistory>,
    pub listening_minutes_recent: u64,
    /// Rough linear projection of the recent window onto a year. Not an
    /// estimator anyone should rely on.
    pub estimated_yearly_minutes: Option<u64>,
    pub sessions_count: u32,
    pub listening_minutes_today: u64,
    pub session_count_today: u32,
    pub listening_minutes_last_7_days: u64,
    pub audio_feature_summary: Option<AudioFeatureSummary>,
    pub top_genres: Vec<GenreCount>,
    pub top_albums: Vec<AlbumStat>,
    pub hourly_listening: [u64; 24],
    pub daily_listening: Vec<DailyListening>,
}

#[derive(Tabled)]
pub struct GenreTableRow {
    pub genre: String,
    pub artists: u32,
}

#[derive(Tabled)]
pub struct AlbumTableRow {
    pub name: String,
    pub plays: u32,
    pub minutes: u64,
}

#[derive(Tabled)]
pub struct DailyTableRow {
    pub date: String,
    pub minutes: u64,
}
