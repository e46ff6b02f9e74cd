use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    Res,
    config::Config,
    error::{Error, Service},
    http::{ApiRequest, RateLimitedRequester},
    types::{Token, TokenResponse},
};

/// Source of bearer credentials for the catalog API.
///
/// Implementations may or may not cache; callers treat the token as opaque
/// and ask again for every unit of work.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Res<Token>;
}

/// OAuth2 client-credentials flow against the Spotify accounts service.
pub struct ClientCredentials {
    requester: Arc<RateLimitedRequester>,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    pub fn new(
        requester: Arc<RateLimitedRequester>,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            requester,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn from_config(requester: Arc<RateLimitedRequester>, config: &Config) -> Self {
        Self::new(
            requester,
            &config.spotify_token_url,
            &config.spotify_client_id,
            &config.spotify_client_secret,
        )
    }
}

#[async_trait]
impl TokenSource for ClientCredentials {
    async fn fetch_token(&self) -> Res<Token> {
        let request = ApiRequest::post(&self.token_url)
            .basic_auth(&self.client_id, &self.client_secret)
            .form("grant_type", "client_credentials");

        let json = self
            .requester
            .send(Service::Auth, &request)
            .await
            .map_err(|e| match e {
                Error::Upstream {
                    status, message, ..
                } => Error::Auth(format!(
                    "token endpoint rejected the credentials ({}): {}",
                    status, message
                )),
                Error::Transport { message, .. } => {
                    Error::Auth(format!("token endpoint unreachable: {}", message))
                }
                other => other,
            })?;

        let response: TokenResponse = serde_json::from_value(json)
            .map_err(|e| Error::Auth(format!("malformed token response: {}", e)))?;

        let access_token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Auth("token response has no access_token".to_string()))?;

        let mut token = Token::new(access_token, response.expires_in.unwrap_or(3600));
        if let Some(token_type) = response.token_type {
            token.token_type = token_type;
        }

        tracing::debug!(expires_in = token.expires_in, "obtained catalog access token");
        Ok(token)
    }
}
