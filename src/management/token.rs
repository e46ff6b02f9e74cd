use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{Res, spotify::TokenSource, types::Token};

/// Tokens are refreshed this many seconds before they actually expire.
const EXPIRY_BUFFER_SECS: u64 = 240;

/// In-memory token cache in front of any [`TokenSource`].
pub struct TokenManager {
    source: Arc<dyn TokenSource>,
    token: Mutex<Option<Token>>,
}

impl TokenManager {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        TokenManager {
            source,
            token: Mutex::new(None),
        }
    }

    pub async fn get_valid_token(&self) -> Res<Token> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if !token.expires_within(EXPIRY_BUFFER_SECS) {
                return Ok(token.clone());
            }
            tracing::debug!("cached token about to expire, refreshing");
        }

        let token = self.source.fetch_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    pub async fn current_token(&self) -> Option<Token> {
        self.token.lock().await.clone()
    }
}

#[async_trait]
impl TokenSource for TokenManager {
    async fn fetch_token(&self) -> Res<Token> {
        self.get_valid_token().await
    }
}
