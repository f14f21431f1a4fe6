#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    path::Path,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use spotify_ingest::{
    Res,
    config::Settings,
    spotify::{
        auth::CredentialProvider,
        transport::{RawResponse, Transport},
    },
    types::{Credential, TrackRecord},
};

pub const API_URL: &str = "https://api.test/v1";
pub const TOKEN_URL: &str = "https://accounts.test/api/token";

/// Settings rooted at `root`, pointed at the fake endpoints, without pacing.
pub fn test_settings(root: &Path) -> Settings {
    let mut settings = Settings::new("client-id", "client-secret", root);
    settings.api_url = API_URL.to_string();
    settings.token_url = TOKEN_URL.to_string();
    settings.pacing = Duration::ZERO;
    settings
}

pub fn ok(body: Value) -> RawResponse {
    RawResponse::new(StatusCode::OK, body.to_string())
}

pub fn status(code: u16) -> RawResponse {
    RawResponse::new(StatusCode::from_u16(code).unwrap(), "")
}

pub fn token_body(token: &str, expires_in: i64) -> RawResponse {
    ok(json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": expires_in,
    }))
}

pub fn track_json(id: &str, artists: &[&str]) -> Value {
    json!({
        "id": id,
        "name": format!("Song {id}"),
        "duration_ms": 210_000,
        "popularity": 55,
        "artists": artists
            .iter()
            .map(|a| json!({ "id": a, "name": format!("Artist {a}") }))
            .collect::<Vec<_>>(),
    })
}

pub fn features_json(id: &str) -> Value {
    json!({
        "id": id,
        "acousticness": 0.12,
        "danceability": 0.7,
        "energy": 0.8,
        "instrumentalness": 0.0,
        "key": 5,
        "liveness": 0.1,
        "loudness": -5.5,
        "mode": 1,
        "speechiness": 0.04,
        "tempo": 120.0,
        "time_signature": 4,
        "valence": 0.6,
    })
}

pub fn artist_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Artist {id}"),
        "genres": ["indie", "pop"],
        "popularity": 42,
        "followers": { "href": null, "total": 1200 },
    })
}

pub fn track_record(id: &str) -> TrackRecord {
    TrackRecord {
        track_id: id.to_string(),
        duration_ms: Some(180_000),
        track_name: Some(format!("Song {id}")),
        track_popularity: Some(10),
        artist_ids: vec!["A1".to_string()],
        acousticness: Some(0.5),
        danceability: Some(0.5),
        energy: Some(0.5),
        instrumentalness: Some(0.0),
        key: Some(1),
        liveness: Some(0.1),
        loudness: Some(-7.0),
        mode: Some(0),
        speechiness: Some(0.05),
        tempo: Some(100.0),
        time_signature: Some(4),
        valence: Some(0.3),
    }
}

pub fn write_lines(path: &Path, lines: &[&str]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut content = lines.join("\n");
    if !lines.is_empty() {
        content.push('\n');
    }
    std::fs::write(path, content).unwrap();
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub url: String,
    pub bearer: String,
}

/// Transport that answers from per-URL-fragment queues.
///
/// A queue hands out its responses in order and keeps repeating the last one. Requests to
/// an unscripted URL get a 404. Token requests are answered from the token queue, or with
/// a generated `token-N` credential once it is empty.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<(String, VecDeque<RawResponse>)>>,
    tokens: Mutex<VecDeque<RawResponse>>,
    issued: AtomicUsize,
    requests: Mutex<Vec<Request>>,
    token_requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, fragment: &str, responses: Vec<RawResponse>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((fragment.to_string(), responses.into()));
        self
    }

    pub fn token_response(self, response: RawResponse) -> Self {
        self.tokens.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// `(authorization header, form body)` of every token request.
    pub fn token_requests(&self) -> Vec<(String, String)> {
        self.token_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, bearer: &str) -> Res<RawResponse> {
        self.requests.lock().unwrap().push(Request {
            url: url.to_string(),
            bearer: bearer.to_string(),
        });

        let mut routes = self.routes.lock().unwrap();
        let response = routes
            .iter_mut()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .and_then(|(_, queue)| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            });
        Ok(response.unwrap_or_else(|| status(404)))
    }

    async fn post_form(
        &self,
        _url: &str,
        authorization: &str,
        form: &[(&str, &str)],
    ) -> Res<RawResponse> {
        let body = form
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        self.token_requests
            .lock()
            .unwrap()
            .push((authorization.to_string(), body));

        if let Some(response) = self.tokens.lock().unwrap().pop_front() {
            return Ok(response);
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(token_body(&format!("token-{n}"), 3600))
    }
}

/// Credential provider handing out `token-<generation>`; every refresh bumps the generation.
#[derive(Default)]
pub struct CountingCredentials {
    generation: AtomicUsize,
    refreshes: AtomicUsize,
}

impl CountingCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    fn credential(&self) -> Credential {
        let generation = self.generation.load(Ordering::SeqCst);
        Credential::new(format!("token-{generation}"), 3600)
    }
}

#[async_trait]
impl CredentialProvider for CountingCredentials {
    async fn current(&self) -> Res<Credential> {
        Ok(self.credential())
    }

    async fn refresh(&self) -> Res<Credential> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(self.credential())
    }
}

/// An in-memory Spotify catalogue answering the four endpoints the pipeline uses.
///
/// Playlist listings are paged `page_size` items at a time. Any URL containing one of the
/// `failing` fragments is answered with the configured status instead.
pub struct FakeSpotify {
    playlists: HashMap<String, Vec<Option<String>>>,
    artists_of: HashMap<String, Vec<String>>,
    failing: Vec<(String, u16)>,
    page_size: usize,
    requests: Mutex<Vec<String>>,
}

impl FakeSpotify {
    pub fn new(page_size: usize) -> Self {
        Self {
            playlists: HashMap::new(),
            artists_of: HashMap::new(),
            failing: Vec::new(),
            page_size,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn playlist(mut self, id: &str, tracks: &[&str]) -> Self {
        self.playlists.insert(
            id.to_string(),
            tracks.iter().map(|t| Some(t.to_string())).collect(),
        );
        self
    }

    /// Adds an item without a track id, like a local file.
    pub fn local_item(mut self, playlist: &str) -> Self {
        self.playlists
            .entry(playlist.to_string())
            .or_default()
            .push(None);
        self
    }

    pub fn track(mut self, id: &str, artists: &[&str]) -> Self {
        self.artists_of.insert(
            id.to_string(),
            artists.iter().map(|a| a.to_string()).collect(),
        );
        self
    }

    pub fn failing(mut self, fragment: &str, code: u16) -> Self {
        self.failing.push((fragment.to_string(), code));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, fragment: &str) -> usize {
        self.requests()
            .iter()
            .filter(|url| url.contains(fragment))
            .count()
    }

    fn ids(url: &str) -> Vec<String> {
        url.split("ids=")
            .nth(1)
            .unwrap_or_default()
            .split(',')
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn playlist_page(&self, url: &str) -> RawResponse {
        let rest = url.trim_start_matches(API_URL).trim_start_matches("/playlists/");
        let id = rest.split('/').next().unwrap_or_default();
        let Some(items) = self.playlists.get(id) else {
            return status(404);
        };

        let offset = url
            .split("offset=")
            .nth(1)
            .and_then(|v| v.split('&').next())
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let end = (offset + self.page_size).min(items.len());
        let page: Vec<Value> = items[offset.min(end)..end]
            .iter()
            .map(|item| match item {
                Some(id) => json!({ "track": { "id": id } }),
                None => json!({ "track": { "id": null } }),
            })
            .collect();
        let next = (end < items.len()).then(|| {
            format!(
                "{API_URL}/playlists/{id}/tracks?offset={end}&limit={}",
                self.page_size
            )
        });

        ok(json!({ "items": page, "next": next }))
    }
}

#[async_trait]
impl Transport for FakeSpotify {
    async fn get(&self, url: &str, _bearer: &str) -> Res<RawResponse> {
        self.requests.lock().unwrap().push(url.to_string());

        if let Some((_, code)) = self.failing.iter().find(|(f, _)| url.contains(f.as_str())) {
            return Ok(status(*code));
        }

        let response = if url.contains("/playlists/") {
            self.playlist_page(url)
        } else if url.contains("/audio-features?ids=") {
            let features: Vec<Value> = Self::ids(url).iter().map(|id| features_json(id)).collect();
            ok(json!({ "audio_features": features }))
        } else if url.contains("/tracks?ids=") {
            let tracks: Vec<Value> = Self::ids(url)
                .iter()
                .map(|id| {
                    let artists: Vec<&str> = self
                        .artists_of
                        .get(id)
                        .map(|a| a.iter().map(String::as_str).collect())
                        .unwrap_or_default();
                    track_json(id, &artists)
                })
                .collect();
            ok(json!({ "tracks": tracks }))
        } else if url.contains("/artists?ids=") {
            let artists: Vec<Value> = Self::ids(url).iter().map(|id| artist_json(id)).collect();
            ok(json!({ "artists": artists }))
        } else {
            status(404)
        };
        Ok(response)
    }

    async fn post_form(
        &self,
        _url: &str,
        _authorization: &str,
        _form: &[(&str, &str)],
    ) -> Res<RawResponse> {
        Ok(token_body("fake-token", 3600))
    }
}
