#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU16, AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use echostats::config::{ClientCredentials, Settings};
use serde_json::{Value, json};

pub const VALID_TOKEN: &str = "access-1";
pub const REFRESH_TOKEN: &str = "refresh-1";
pub const GOOD_CODE: &str = "good-code";

/// Shared knobs and counters of the fake Spotify accounts and Web API.
#[derive(Clone)]
pub struct MockState {
    inner: Arc<Inner>,
}

struct Inner {
    valid_token: Mutex<String>,
    refresh_calls: AtomicUsize,
    exchange_calls: AtomicUsize,
    audio_feature_calls: AtomicUsize,
    refresh_delay_ms: AtomicU64,
    rotate_refresh_token: AtomicBool,
    reject_all_tokens: AtomicBool,
    playlists_status: AtomicU16,
    top_tracks: Mutex<Value>,
    recently_played: Mutex<Value>,
    time_ranges: Mutex<Vec<String>>,
}

impl MockState {
    fn new() -> Self {
        MockState {
            inner: Arc::new(Inner {
                valid_token: Mutex::new(VALID_TOKEN.to_string()),
                refresh_calls: AtomicUsize::new(0),
                exchange_calls: AtomicUsize::new(0),
                audio_feature_calls: AtomicUsize::new(0),
                refresh_delay_ms: AtomicU64::new(0),
                rotate_refresh_token: AtomicBool::new(false),
                reject_all_tokens: AtomicBool::new(false),
                playlists_status: AtomicU16::new(200),
                top_tracks: Mutex::new(default_top_tracks()),
                recently_played: Mutex::new(default_recently_played()),
                time_ranges: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn refresh_calls(&self) -> usize {
        self.inner.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn exchange_calls(&self) -> usize {
        self.inner.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn audio_feature_calls(&self) -> usize {
        self.inner.audio_feature_calls.load(Ordering::SeqCst)
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        self.inner
            .refresh_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn rotate_refresh_token(&self, rotate: bool) {
        self.inner.rotate_refresh_token.store(rotate, Ordering::SeqCst);
    }

    /// Every data call answers 401, whatever token it carries.
    pub fn reject_all_tokens(&self) {
        self.inner.reject_all_tokens.store(true, Ordering::SeqCst);
    }

    pub fn fail_playlists(&self, status: u16) {
        self.inner.playlists_status.store(status, Ordering::SeqCst);
    }

    pub fn set_top_tracks(&self, body: Value) {
        *self.inner.top_tracks.lock().unwrap() = body;
    }

    pub fn time_ranges(&self) -> Vec<String> {
        self.inner.time_ranges.lock().unwrap().clone()
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        if self.inner.reject_all_tokens.load(Ordering::SeqCst) {
            return false;
        }
        let expected = format!("Bearer {}", self.inner.valid_token.lock().unwrap());
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }
}

pub struct MockUpstream {
    pub addr: SocketAddr,
    pub state: MockState,
}

impl MockUpstream {
    /// Settings pointing both the Web API and the token endpoint at the mock.
    pub fn settings(&self) -> Settings {
        Settings {
            credentials: Some(ClientCredentials {
                client_id: "client-id".to_string(),
                client_secret: "client-secret".to_string(),
            }),
            api_url: format!("http://{}", self.addr),
            token_url: format!("http://{}/api/token", self.addr),
            ..Settings::default()
        }
    }

    pub fn settings_without_credentials(&self) -> Settings {
        Settings {
            credentials: None,
            ..self.settings()
        }
    }
}

pub async fn spawn() -> MockUpstream {
    let state = MockState::new();
    let app = Router::new()
        .route("/api/token", post(token))
        .route("/me", get(profile))
        .route("/me/top/tracks", get(top_tracks))
        .route("/me/top/artists", get(top_artists))
        .route("/me/player/recently-played", get(recently_played))
        .route("/me/playlists", get(playlists))
        .route("/audio-features", get(audio_features))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream { addr, state }
}

fn invalid_grant() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "invalid_grant" })),
    )
        .into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "status": 401, "message": "The access token expired" } })),
    )
        .into_response()
}

async fn token(State(mock): State<MockState>, Form(form): Form<HashMap<String, String>>) -> Response {
    if form.get("client_id").map(String::as_str) != Some("client-id") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid_client" }))).into_response();
    }

    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") => {
            mock.inner.exchange_calls.fetch_add(1, Ordering::SeqCst);
            if form.get("code").map(String::as_str) != Some(GOOD_CODE) {
                return invalid_grant();
            }
            Json(json!({
                "access_token": VALID_TOKEN,
                "token_type": "Bearer",
                "scope": "user-top-read user-read-recently-played",
                "expires_in": 3600,
                "refresh_token": REFRESH_TOKEN,
            }))
            .into_response()
        }
        Some("refresh_token") => {
            let call = mock.inner.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
            let delay = mock.inner.refresh_delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            if form.get("refresh_token").map(String::as_str) != Some(REFRESH_TOKEN) {
                return invalid_grant();
            }

            let access_token = format!("fresh-{}", call);
            *mock.inner.valid_token.lock().unwrap() = access_token.clone();

            let mut body = json!({
                "access_token": access_token,
                "token_type": "Bearer",
                "expires_in": 3600,
            });
            if mock.inner.rotate_refresh_token.load(Ordering::SeqCst) {
                body["refresh_token"] = json!("rotated-refresh");
            }
            Json(body).into_response()
        }
        _ => invalid_grant(),
    }
}

async fn profile(State(mock): State<MockState>, headers: HeaderMap) -> Response {
    if !mock.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "id": "listener", "display_name": "Listener" })).into_response()
}

async fn top_tracks(
    State(mock): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !mock.authorized(&headers) {
        return unauthorized();
    }
    if let Some(range) = query.get("time_range") {
        mock.inner.time_ranges.lock().unwrap().push(range.clone());
    }
    Json(mock.inner.top_tracks.lock().unwrap().clone()).into_response()
}

async fn top_artists(State(mock): State<MockState>, headers: HeaderMap) -> Response {
    if !mock.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "items": [
            { "id": "a1", "name": "One", "genres": ["Indie Pop", "dream pop"] },
            { "id": "a2", "name": "Two", "genres": ["indie pop"] },
        ],
        "total": 2,
    }))
    .into_response()
}

async fn recently_played(State(mock): State<MockState>, headers: HeaderMap) -> Response {
    if !mock.authorized(&headers) {
        return unauthorized();
    }
    Json(mock.inner.recently_played.lock().unwrap().clone()).into_response()
}

async fn playlists(State(mock): State<MockState>, headers: HeaderMap) -> Response {
    if !mock.authorized(&headers) {
        return unauthorized();
    }
    let status = mock.inner.playlists_status.load(Ordering::SeqCst);
    if status != 200 {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "playlists unavailable").into_response();
    }
    Json(json!({ "items": [{ "id": "p1", "name": "Mix" }], "total": 1 })).into_response()
}

async fn audio_features(
    State(mock): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !mock.authorized(&headers) {
        return unauthorized();
    }
    mock.inner.audio_feature_calls.fetch_add(1, Ordering::SeqCst);

    let features: Vec<Value> = query
        .get("ids")
        .map(|ids| ids.split(',').collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
        .map(|id| match id {
            "t1" => json!({ "id": "t1", "tempo": 120.0, "energy": 0.5, "danceability": 0.6 }),
            _ => Value::Null,
        })
        .collect();
    Json(json!({ "audio_features": features })).into_response()
}

fn default_top_tracks() -> Value {
    json!({
        "items": [
            { "id": "t1", "name": "First", "duration_ms": 200000 },
            { "id": "t2", "name": "Second", "duration_ms": 180000 },
        ],
        "total": 2,
    })
}

fn default_recently_played() -> Value {
    let now = chrono::Utc::now();
    json!({
        "items": [
            {
                "played_at": (now - chrono::Duration::minutes(10)).to_rfc3339(),
                "track": {
                    "id": "t1",
                    "name": "First",
                    "duration_ms": 240000,
                    "album": { "id": "al1", "name": "Album One", "images": [] },
                },
            },
            {
                "played_at": (now - chrono::Duration::minutes(5)).to_rfc3339(),
                "track": {
                    "id": "t2",
                    "name": "Second",
                    "duration_ms": 180000,
                    "album": { "id": "al1", "name": "Album One", "images": [] },
                },
            },
        ],
    })
}
