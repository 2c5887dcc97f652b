//! Typed errors surfaced to callers of the cache and the authorized client.

pub mod codes;

use thiserror::Error;

pub use codes::{ApiErrorKind, AuthErrorKind};

/// Failures of `TokenCache::get_token`. Neither is retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The fetcher produced no usable token.
    #[error("token fetch failed: {0}")]
    TokenFetchFailed(String),

    /// No valid token is held after a fetch attempt.
    #[error("token unavailable")]
    TokenUnavailable,
}

/// Failures of requests sent through `AuthorizedClient`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Token(#[from] CacheError),

    #[error("api responded {kind:?}: {body}")]
    Status { kind: ApiErrorKind, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("invalid path segment: {0:?}")]
    InvalidPath(String),
}

impl ApiError {
    pub fn kind(&self) -> Option<&ApiErrorKind> {
        match self {
            ApiError::Status { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Status { kind, .. } => kind.is_retryable(),
            ApiError::Transport(e) => e.is_timeout() || e.is_connect(),
            ApiError::Token(_) | ApiError::Decode(_) | ApiError::InvalidPath(_) => false,
        }
    }
}
