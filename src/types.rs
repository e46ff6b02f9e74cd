use chrono::Utc;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// A catalog-confirmed track, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTrack {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub release_year: Option<i32>,
    pub artwork_url: Option<String>,
    pub preview_url: Option<String>,
}

/// An unvalidated (title, artist) pair suggested by the generative model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub artist: String,
}

impl Candidate {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt_text: String,
    pub requested_count: usize,
}

/// Per-invocation accumulator state. Only playable tracks ever enter
/// `collected`, in the order they were resolved.
#[derive(Debug, Default)]
pub struct AccumulationState {
    pub collected: Vec<ResolvedTrack>,
    pub rounds_attempted: u32,
}

/// Derived from a single 429 response; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSignal {
    pub retry_after_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Token {
    pub fn new(access_token: impl Into<String>, expires_in: u64) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            expires_in,
            obtained_at: Utc::now().timestamp() as u64,
        }
    }

    /// True once the token is within `buffer_secs` of its expiry.
    pub fn expires_within(&self, buffer_secs: u64) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + buffer_secs >= self.obtained_at + self.expires_in
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<Paging<TrackObject>>,
    pub artists: Option<Paging<ArtistObject>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackObject {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    pub album: AlbumObject,
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimpleArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumObject {
    pub name: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistObject {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreSeedsResponse {
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub preview: String,
}

impl From<&ResolvedTrack> for TrackTableRow {
    fn from(track: &ResolvedTrack) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            year: track
                .release_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "-".to_string()),
            preview: track.preview_url.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    pub name: String,
    pub id: String,
}
