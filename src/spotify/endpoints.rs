use std::fmt;

/// Page size requested from the playlist listing endpoint.
pub const PLAYLIST_PAGE_LIMIT: u32 = 50;

/// The Web API endpoints the ingestion pipeline talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET /playlists/{id}/tracks` - paginated listing
    PlaylistTracks,
    /// `GET /tracks?ids=` - batch track metadata
    Tracks,
    /// `GET /audio-features?ids=` - batch audio features
    AudioFeatures,
    /// `GET /artists?ids=` - batch artist metadata
    Artists,
}

impl Endpoint {
    /// Builds the request URL for a payload of one or more comma-joined ids.
    pub fn url(&self, api_url: &str, ids: &str) -> String {
        match self {
            Endpoint::PlaylistTracks => format!(
                "{api_url}/playlists/{ids}/tracks?limit={limit}",
                limit = PLAYLIST_PAGE_LIMIT
            ),
            Endpoint::Tracks => format!("{api_url}/tracks?ids={ids}"),
            Endpoint::AudioFeatures => format!("{api_url}/audio-features?ids={ids}"),
            Endpoint::Artists => format!("{api_url}/artists?ids={ids}"),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Endpoint::PlaylistTracks => "playlists",
            Endpoint::Tracks => "tracks",
            Endpoint::AudioFeatures => "audio-features",
            Endpoint::Artists => "artists",
        };
        f.write_str(name)
    }
}
