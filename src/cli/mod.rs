//! # CLI Module
//!
//! User-facing commands of promptlist. Each command receives a [`Services`]
//! bundle wired from the loaded [`Config`] and only deals with presentation:
//! progress bars, tables and colored status lines.
//!
//! ## Commands
//!
//! - [`playlist`] - Resolves a prompt into playable tracks
//! - [`artists`] - Searches the catalog for artists
//! - [`genres`] - Lists the catalog's genre seeds
//!
//! ## Usage
//!
//! ```bash
//! promptlist playlist "Give me a playlist of pop music from the 70s"
//! promptlist playlist "rainy day jazz" --count 15 --per-round 20 --max-rounds 5
//! promptlist artists --search "abba"
//! promptlist genres
//! ```

mod artists;
mod genres;
mod playlist;

use std::sync::Arc;

use crate::{
    config::Config,
    generator::{OpenAiClient, PlaylistGenerator},
    http::{HttpTransport, RateLimitedRequester, ReqwestTransport},
    management::{ResolutionAccumulator, ResolveOptions, TokenManager},
    spotify::{CatalogSearchClient, ClientCredentials},
};

pub use artists::artists;
pub use genres::genres;
pub use playlist::playlist;

/// Components wired together from one [`Config`].
pub struct Services {
    pub tokens: Arc<TokenManager>,
    pub catalog: Arc<CatalogSearchClient>,
    pub accumulator: ResolutionAccumulator,
}

impl Services {
    pub fn from_config(config: &Config) -> Self {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new());
        let requester = Arc::new(
            RateLimitedRequester::new(Arc::clone(&transport))
                .with_max_retries(config.max_rate_limit_retries),
        );

        let credentials = ClientCredentials::from_config(Arc::clone(&requester), config);
        let tokens = Arc::new(TokenManager::new(Arc::new(credentials)));
        let catalog = Arc::new(CatalogSearchClient::from_config(
            Arc::clone(&requester),
            config,
        ));

        let llm = OpenAiClient::from_config(transport, config);
        let generator = PlaylistGenerator::from_config(Arc::new(llm), config);

        let accumulator = ResolutionAccumulator::new(
            tokens.clone(),
            Arc::new(generator),
            catalog.clone(),
        )
        .with_options(ResolveOptions {
            max_rounds: config.max_rounds,
        });

        Self {
            tokens,
            catalog,
            accumulator,
        }
    }
}
