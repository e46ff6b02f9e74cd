//! Configuration management for promptlist.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file in the local data directory. They are collected once into an explicit
//! [`Config`] value which is handed to each component's constructor.

use std::{env, path::PathBuf, str::FromStr};

use crate::{Res, error::Error};

pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_TEMPERATURE: f32 = 1.0;
pub const DEFAULT_OPENAI_MAX_TOKENS: u32 = 400;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives at `<data_local_dir>/promptlist/.env`:
/// - Linux: `~/.local/share/promptlist/.env`
/// - macOS: `~/Library/Application Support/promptlist/.env`
/// - Windows: `%LOCALAPPDATA%/promptlist/.env`
///
/// The directory is created when missing. A missing `.env` file is not an
/// error; variables may just as well come from the environment.
pub async fn load_env() -> Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if let Err(e) = dotenv::from_path(&path) {
        tracing::debug!(path = %path.display(), error = %e, "no .env file loaded");
    }
    Ok(())
}

pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("promptlist/.env");
    path
}

#[derive(Debug, Clone)]
pub struct Config {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_api_url: String,
    pub spotify_token_url: String,
    pub openai_api_key: String,
    pub openai_api_url: String,
    pub openai_model: String,
    pub openai_temperature: f32,
    pub openai_max_tokens: u32,
    /// Upper bound on generation rounds per resolution; `None` never gives up.
    pub max_rounds: Option<u32>,
    /// Upper bound on 429 retries per request; `None` never gives up.
    pub max_rate_limit_retries: Option<u32>,
}

impl Config {
    pub fn from_env() -> Res<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Res<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| Error::Config(format!("{} must be set", key)));

        Ok(Self {
            spotify_client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            spotify_client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            spotify_api_url: trim_base(
                get("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_SPOTIFY_API_URL.to_string()),
            ),
            spotify_token_url: get("SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_SPOTIFY_TOKEN_URL.to_string()),
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_api_url: trim_base(
                get("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),
            ),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_temperature: parse_or("OPENAI_TEMPERATURE", get("OPENAI_TEMPERATURE"), DEFAULT_OPENAI_TEMPERATURE)?,
            openai_max_tokens: parse_or("OPENAI_MAX_TOKENS", get("OPENAI_MAX_TOKENS"), DEFAULT_OPENAI_MAX_TOKENS)?,
            max_rounds: parse_optional("PROMPTLIST_MAX_ROUNDS", get("PROMPTLIST_MAX_ROUNDS"))?,
            max_rate_limit_retries: parse_optional(
                "PROMPTLIST_MAX_RATE_LIMIT_RETRIES",
                get("PROMPTLIST_MAX_RATE_LIMIT_RETRIES"),
            )?,
        })
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Res<T> {
    Ok(parse_optional(key, value)?.unwrap_or(default))
}

fn parse_optional<T: FromStr>(key: &str, value: Option<String>) -> Res<Option<T>> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, raw)))
        })
        .transpose()
}
