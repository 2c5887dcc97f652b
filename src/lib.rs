//! # Credential Cache Library
//!
//! Serves a valid credential from a lazy, expiry-aware cache, fetching a new
//! one from the token authority only when the held one is stale or absent.
//!
//! Modules:
//! - `cache` — credential record and the single-flight token cache
//! - `fetcher` — token fetcher contract, HTTP and email/password fetchers
//! - `parser` — extracting token and expiration from token responses
//! - `client` — authorized JSON API client and the lectures API
//! - `errors` — cache/API errors and error-code mapping
//! - `config` — service configuration, loading and validation

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod helpers;
pub mod observability;
pub mod parser;
pub mod resilience;
pub mod server;
pub mod utils;

#[cfg(test)]
pub mod tests;

pub use crate::cache::credential::Credential;
pub use crate::cache::token_cache::TokenCache;
pub use crate::config::types::ServiceConfig;
pub use crate::errors::{ApiError, CacheError};
pub use crate::fetcher::TokenFetcher;
