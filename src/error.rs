//! Error types shared by every component of the resolution pipeline.
//!
//! Every fatal error names the dependency that failed (auth, catalog or
//! generation) so that an operator can tell a credential problem from a quota
//! problem or a misbehaving model. Rate limiting never shows up here unless a
//! retry cap was configured and exhausted.

use std::fmt;

use thiserror::Error;

/// The upstream dependency an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Auth,
    Catalog,
    Generation,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Auth => "auth",
            Service::Catalog => "catalog",
            Service::Generation => "generation",
        };
        f.write_str(name)
    }
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("auth: {0}")]
    Auth(String),

    #[error("{service}: upstream returned status {status}: {message}")]
    Upstream {
        service: Service,
        status: u16,
        message: String,
    },

    #[error("{service}: request failed: {message}")]
    Transport { service: Service, message: String },

    #[error("generation: could not parse model output: {0}")]
    GenerationParse(String),

    #[error("{service}: still rate limited after {retries} retries")]
    RateLimitExhausted { service: Service, retries: u32 },

    #[error("gave up after {rounds} rounds with {collected} of {target} playable tracks")]
    RoundsExhausted {
        rounds: u32,
        collected: usize,
        target: usize,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("configuration: {0}")]
    Config(String),
}

impl Error {
    /// The dependency responsible for the failure, if any.
    pub fn service(&self) -> Option<Service> {
        match self {
            Error::Auth(_) => Some(Service::Auth),
            Error::Upstream { service, .. }
            | Error::Transport { service, .. }
            | Error::RateLimitExhausted { service, .. } => Some(*service),
            Error::GenerationParse(_) => Some(Service::Generation),
            Error::RoundsExhausted { .. } | Error::InvalidRequest(_) | Error::Config(_) => None,
        }
    }
}

/// Failure of the underlying HTTP exchange, before any status code exists.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError(err.to_string())
    }
}
