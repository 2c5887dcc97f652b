//! Token fetchers
//!
//! A fetcher is the only boundary between the cache and the authority that
//! issues credentials. Fetchers never retry and never cache.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;

use crate::cache::credential::Credential;
use crate::config::fetcher::FetcherConfig;
use crate::utils::constants::DEFAULT_HTTP_TIMEOUT_MS;

pub mod http;
pub mod password;
pub mod values;

use self::http::HttpFetcher;
use self::password::PasswordFetcher;

pub trait TokenFetcher: Send + Sync {
    /// label used in logs and metrics
    fn name(&self) -> &str;

    /// Produce a fresh credential. `token: None` signals a failed fetch.
    fn fetch_token(&self) -> impl Future<Output = Result<Credential>> + Send;
}

#[derive(Debug)]
pub enum FetcherKind {
    Http(HttpFetcher),
    Password(PasswordFetcher),
}

impl TokenFetcher for FetcherKind {
    fn name(&self) -> &str {
        match self {
            FetcherKind::Http(f) => f.name(),
            FetcherKind::Password(f) => f.name(),
        }
    }

    async fn fetch_token(&self) -> Result<Credential> {
        match self {
            FetcherKind::Http(f) => f.fetch_token().await,
            FetcherKind::Password(f) => f.fetch_token().await,
        }
    }
}

pub fn build_fetcher(cfg: &FetcherConfig) -> Result<FetcherKind> {
    let fetcher = match cfg {
        FetcherConfig::Http(http) => {
            let client = build_client(http.request.timeout_ms)?;
            FetcherKind::Http(HttpFetcher::new(cfg.kind().to_owned(), http.clone(), client))
        }
        FetcherConfig::Password(password) => {
            let client = build_client(password.timeout_ms)?;
            FetcherKind::Password(PasswordFetcher::new(cfg.kind().to_owned(), password.clone(), client))
        }
    };
    Ok(fetcher)
}

fn build_client(timeout_ms: Option<u64>) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_millis(timeout_ms.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS)))
        .build()?;
    Ok(client)
}
