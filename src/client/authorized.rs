use std::sync::Arc;

use http::{Method, StatusCode};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::token_cache::TokenCache;
use crate::errors::{ApiError, ApiErrorKind};
use crate::fetcher::TokenFetcher;
use crate::helpers::time::{Clock, SystemClock};
use crate::observability::metrics::get_metrics;

static OK_MSG: &str = "ok";
static ERROR_MSG: &str = "error";

/// Thin JSON client that authorizes every request with the cached bearer token.
///
/// A 401 invalidates the cached token and the request is sent once more with
/// a freshly fetched one. Nothing else is retried.
pub struct AuthorizedClient<F, C = SystemClock> {
    http: Client,
    base_url: String,
    cache: Arc<TokenCache<F, C>>,
}

impl<F: TokenFetcher, C: Clock> AuthorizedClient<F, C> {
    pub fn new(http: Client, base_url: impl Into<String>, cache: Arc<TokenCache<F, C>>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { http, base_url, cache }
    }

    pub fn cache(&self) -> &Arc<TokenCache<F, C>> {
        &self.cache
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json::<(), T>(Method::GET, path, None).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, path, Some(body)).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let metrics = get_metrics().await;
        let url = self.url(path);

        let mut response = self.send_once(&method, &url, body).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            info!(%method, %url, "token rejected by api, refreshing");
            self.cache.invalidate().await;
            response = self.send_once(&method, &url, body).await?;
        }

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            metrics.api_requests.with_label_values(&[method.as_str(), ERROR_MSG]).inc();
            return Err(ApiError::Status { kind: ApiErrorKind::from_status(status), body: text });
        }

        metrics.api_requests.with_label_values(&[method.as_str(), OK_MSG]).inc();
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_once<B>(&self, method: &Method, url: &str, body: Option<&B>) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let token = self.cache.get_token().await?;
        let mut request = self.http.request(method.clone(), url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        debug!(%method, %url, "sending authorized request");
        Ok(request.send().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
