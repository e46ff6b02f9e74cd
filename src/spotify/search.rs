use std::{collections::BTreeSet, sync::Arc};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    Res,
    config::Config,
    error::{Error, Service},
    http::{ApiRequest, RateLimitedRequester},
    types::{ArtistRef, GenreSeedsResponse, ResolvedTrack, SearchResponse, Token, TrackObject},
    utils,
};

const ARTIST_SEARCH_LIMIT: u32 = 10;

/// Resolves free text to the catalog's best matching track.
#[async_trait]
pub trait TrackSearch: Send + Sync {
    /// `Ok(None)` means the catalog had no match, which is not an error.
    async fn search_best_track(&self, token: &Token, query: &str) -> Res<Option<ResolvedTrack>>;
}

pub struct CatalogSearchClient {
    requester: Arc<RateLimitedRequester>,
    api_url: String,
}

impl CatalogSearchClient {
    pub fn new(requester: Arc<RateLimitedRequester>, api_url: impl Into<String>) -> Self {
        Self {
            requester,
            api_url: api_url.into(),
        }
    }

    pub fn from_config(requester: Arc<RateLimitedRequester>, config: &Config) -> Self {
        Self::new(requester, &config.spotify_api_url)
    }

    /// Artist lookup, at most ten results in catalog ranking order.
    pub async fn search_artists(&self, token: &Token, query: &str) -> Res<Vec<ArtistRef>> {
        let request = ApiRequest::get(format!("{}/search", self.api_url))
            .bearer_auth(&token.access_token)
            .query("q", query)
            .query("type", "artist")
            .query("limit", ARTIST_SEARCH_LIMIT.to_string());

        let response: SearchResponse = self.fetch(&request).await?;
        Ok(response
            .artists
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .map(|artist| ArtistRef {
                id: artist.id,
                name: artist.name,
            })
            .collect())
    }

    pub async fn list_genres(&self, token: &Token) -> Res<BTreeSet<String>> {
        let request = ApiRequest::get(format!(
            "{}/recommendations/available-genre-seeds",
            self.api_url
        ))
        .bearer_auth(&token.access_token);

        let response: GenreSeedsResponse = self.fetch(&request).await?;
        Ok(response.genres.into_iter().collect())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: &ApiRequest) -> Res<T> {
        let json: Value = self.requester.send(Service::Catalog, request).await?;
        serde_json::from_value(json).map_err(|e| Error::Transport {
            service: Service::Catalog,
            message: format!("unexpected response shape: {}", e),
        })
    }
}

#[async_trait]
impl TrackSearch for CatalogSearchClient {
    async fn search_best_track(&self, token: &Token, query: &str) -> Res<Option<ResolvedTrack>> {
        let request = ApiRequest::get(format!("{}/search", self.api_url))
            .bearer_auth(&token.access_token)
            .query("q", query)
            .query("type", "track")
            .query("limit", "1");

        let response: SearchResponse = self.fetch(&request).await?;
        let best = response
            .tracks
            .and_then(|page| page.items.into_iter().next())
            .map(map_track);

        if best.is_none() {
            tracing::debug!(query, "no catalog match");
        }
        Ok(best)
    }
}

/// Maps a catalog track into a [`ResolvedTrack`]: first listed performer,
/// first artwork image, and the year taken from the album release date.
pub fn map_track(track: TrackObject) -> ResolvedTrack {
    let release_year = track
        .album
        .release_date
        .as_deref()
        .and_then(utils::release_year);

    ResolvedTrack {
        title: track.name,
        artist: track
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_default(),
        album: track.album.name,
        release_year,
        artwork_url: track.album.images.into_iter().next().map(|i| i.url),
        preview_url: track.preview_url,
    }
}
