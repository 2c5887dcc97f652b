use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::credential::Credential;
use crate::errors::CacheError;
use crate::fetcher::TokenFetcher;
use crate::helpers::time::{get_instant, Clock, SystemClock};
use crate::observability::metrics::get_metrics;

static FETCH_ERROR_MSG: &str = "error";
static FETCH_EMPTY_MSG: &str = "empty_token";

/// Lazy, expiry-aware cache in front of a `TokenFetcher`.
///
/// A stale or empty record is refreshed on demand. Refreshes are single-flight:
/// callers arriving while a fetch is running wait for it and reuse its result.
/// The fetch runs inside the calling future, so dropping `get_token` mid-fetch
/// abandons the fetch without touching the cached record.
pub struct TokenCache<F, C = SystemClock> {
    fetcher: F,
    clock: C,
    state: RwLock<Credential>,
    refresh_gate: Mutex<()>,
}

impl<F: TokenFetcher> TokenCache<F, SystemClock> {
    pub fn new(fetcher: F) -> Self {
        Self::with_clock(fetcher, SystemClock)
    }
}

impl<F: TokenFetcher, C: Clock> TokenCache<F, C> {
    pub fn with_clock(fetcher: F, clock: C) -> Self {
        Self {
            fetcher,
            clock,
            state: RwLock::new(Credential::empty()),
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Serve a valid token, fetching a fresh one only when the held one is stale.
    pub async fn get_token(&self) -> Result<String, CacheError> {
        let credential = self.get_credential().await?;
        credential.token.ok_or(CacheError::TokenUnavailable)
    }

    /// Like `get_token`, but hands back the whole record the token was served from.
    pub async fn get_credential(&self) -> Result<Credential, CacheError> {
        let metrics = get_metrics().await;

        if let Some(credential) = self.valid_credential().await {
            metrics.cache_hits.inc();
            return Ok(credential);
        }

        let _gate = self.refresh_gate.lock().await;

        // refreshed by another caller while we waited on the gate
        if let Some(credential) = self.valid_credential().await {
            metrics.cache_hits.inc();
            return Ok(credential);
        }

        metrics.cache_misses.inc();
        let fetched = self.fetch().await?;
        if let Some(expires_at_ms) = fetched.expires_at_ms {
            metrics.token_expiry_unix_ms.set(expires_at_ms);
        }
        info!(
            fetcher = self.fetcher.name(),
            expires_at = ?fetched.expires_at(),
            "cached token replaced"
        );

        let mut state = self.state.write().await;
        *state = fetched;
        if state.token.is_none() {
            return Err(CacheError::TokenUnavailable);
        }
        Ok(state.clone())
    }

    /// Snapshot of the held record without fetching.
    pub async fn current(&self) -> Credential {
        self.state.read().await.clone()
    }

    /// Drop the held record so the next `get_token` fetches.
    pub async fn invalidate(&self) {
        debug!(fetcher = self.fetcher.name(), "cached token invalidated");
        *self.state.write().await = Credential::empty();
    }

    async fn valid_credential(&self) -> Option<Credential> {
        let state = self.state.read().await;
        if state.is_stale(self.clock.now_ms()) || state.token.is_none() {
            return None;
        }
        Some(state.clone())
    }

    async fn fetch(&self) -> Result<Credential, CacheError> {
        let metrics = get_metrics().await;
        let name = self.fetcher.name();
        let start = get_instant();
        metrics.fetch_requests.with_label_values(&[name]).inc();

        let result = self.fetcher.fetch_token().await;
        metrics.fetch_duration.with_label_values(&[name]).observe(start.elapsed().as_secs_f64());

        match result {
            Ok(credential) if credential.token.is_some() => Ok(credential),
            Ok(_) => {
                warn!(fetcher = name, "fetcher returned no token");
                metrics.fetch_failures.with_label_values(&[name, FETCH_EMPTY_MSG]).inc();
                Err(CacheError::TokenFetchFailed(format!("fetcher '{}' returned no token", name)))
            }
            Err(e) => {
                warn!(fetcher = name, error = %e, "token fetch failed");
                metrics.fetch_failures.with_label_values(&[name, FETCH_ERROR_MSG]).inc();
                Err(CacheError::TokenFetchFailed(e.to_string()))
            }
        }
    }
}
