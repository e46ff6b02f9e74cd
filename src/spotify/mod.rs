//! # Spotify Integration Module
//!
//! Client for the parts of the Spotify Web API that promptlist needs.
//!
//! ## Modules
//!
//! - [`auth`] - OAuth2 client-credentials token source ([`auth::TokenSource`],
//!   [`auth::ClientCredentials`])
//! - [`search`] - Catalog search: best track for a free-text query, artist
//!   lookup and the list of genre seeds
//!
//! ## Rate Limiting
//!
//! Every call goes through [`crate::http::RateLimitedRequester`], which waits
//! out `429 Too Many Requests` responses using the `Retry-After` header and
//! retries the identical request. Other failure statuses surface as
//! [`crate::error::Error::Upstream`] tagged with the service that failed.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - client-credentials grant
//! - `GET /search?type=track&limit=1` - best track match
//! - `GET /search?type=artist&limit=10` - artist lookup
//! - `GET /recommendations/available-genre-seeds` - genre seeds
//!
//! All catalog endpoints take the bearer token explicitly; nothing here holds
//! an implicit shared token.

pub mod auth;
pub mod search;

pub use auth::{ClientCredentials, TokenSource};
pub use search::{CatalogSearchClient, TrackSearch};
