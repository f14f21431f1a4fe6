use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize, Serializer, ser::Error as _};
use tabled::Tabled;

/// Seconds before expiry at which a credential is treated as unusable.
pub const CREDENTIAL_SAFETY_MARGIN_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(rename = "expires")]
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(access_token: String, lifetime_secs: i64) -> Self {
        Self {
            access_token,
            expires_at: Utc::now() + Duration::seconds(lifetime_secs),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Utc::now())
    }

    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at - Duration::seconds(CREDENTIAL_SAFETY_MARGIN_SECS)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracksPage {
    pub items: Vec<PlaylistItem>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<PlaylistTrack>,
}

/// Local files and podcast episodes come back without an id.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTrack {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeveralTracksResponse {
    pub tracks: Vec<Option<Track>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub id: String,
    pub duration_ms: Option<u64>,
    pub name: Option<String>,
    pub popularity: Option<u32>,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackArtist {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeatures {
    pub acousticness: Option<f64>,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub key: Option<i32>,
    pub liveness: Option<f64>,
    pub loudness: Option<f64>,
    pub mode: Option<i32>,
    pub speechiness: Option<f64>,
    pub tempo: Option<f64>,
    pub time_signature: Option<i32>,
    pub valence: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeveralArtistsResponse {
    pub artists: Vec<Option<Artist>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub popularity: Option<u32>,
    pub followers: Option<Followers>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Followers {
    pub total: Option<u64>,
}

/// One row of the track feature dataset: track metadata merged with its audio features.
///
/// Field order is the column order of the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub track_id: String,
    pub duration_ms: Option<u64>,
    pub track_name: Option<String>,
    pub track_popularity: Option<u32>,
    #[serde(serialize_with = "as_json_list", deserialize_with = "from_json_list")]
    pub artist_ids: Vec<String>,
    pub acousticness: Option<f64>,
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub key: Option<i32>,
    pub liveness: Option<f64>,
    pub loudness: Option<f64>,
    pub mode: Option<i32>,
    pub speechiness: Option<f64>,
    pub tempo: Option<f64>,
    pub time_signature: Option<i32>,
    pub valence: Option<f64>,
}

impl TrackRecord {
    pub fn from_parts(track: Track, features: AudioFeatures) -> Self {
        let artist_ids = track.artists.into_iter().filter_map(|a| a.id).collect();
        Self {
            track_id: track.id,
            duration_ms: track.duration_ms,
            track_name: track.name,
            track_popularity: track.popularity,
            artist_ids,
            acousticness: features.acousticness,
            danceability: features.danceability,
            energy: features.energy,
            instrumentalness: features.instrumentalness,
            key: features.key,
            liveness: features.liveness,
            loudness: features.loudness,
            mode: features.mode,
            speechiness: features.speechiness,
            tempo: features.tempo,
            time_signature: features.time_signature,
            valence: features.valence,
        }
    }
}

/// One row of the artist feature dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub artist_id: String,
    pub artist_name: Option<String>,
    #[serde(serialize_with = "as_json_list", deserialize_with = "from_json_list")]
    pub artist_genres: Vec<String>,
    pub artist_popularity: Option<u32>,
    pub artist_followers: u64,
}

impl From<Artist> for ArtistRecord {
    fn from(artist: Artist) -> Self {
        Self {
            artist_followers: artist.followers.and_then(|f| f.total).unwrap_or(0),
            artist_id: artist.id,
            artist_name: artist.name,
            artist_genres: artist.genres,
            artist_popularity: artist.popularity,
        }
    }
}

/// Minimal view of a record row, used when only the id column matters.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackIdRow {
    pub track_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistIdRow {
    pub artist_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct DatasetTableRow {
    pub dataset: String,
    pub ledger_ids: usize,
    pub records: usize,
    pub ledger_without_record: usize,
}

fn as_json_list<S: Serializer>(ids: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    let json = serde_json::to_string(ids).map_err(S::Error::custom)?;
    serializer.serialize_str(&json)
}

fn from_json_list<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    use serde::de::Error as _;
    let raw = String::deserialize(deserializer)?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&raw).map_err(D::Error::custom)
}
