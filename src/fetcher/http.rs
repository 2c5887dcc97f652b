use anyhow::{anyhow, Result};
use reqwest::Client;
use tracing::debug;

use crate::cache::credential::Credential;
use crate::config::fetcher::HttpFetcherConfig;
use crate::errors::ApiErrorKind;
use crate::fetcher::values::{resolve_map, resolve_value};
use crate::fetcher::TokenFetcher;
use crate::helpers::time::now_ms;
use crate::parser::parser::parse_credential;

/// Fetches a credential from a configurable token endpoint.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    pub name: String,
    pub cfg: HttpFetcherConfig,
    client: Client,
}

impl HttpFetcher {
    pub fn new(name: String, cfg: HttpFetcherConfig, client: Client) -> Self {
        Self { name, cfg, client }
    }
}

impl TokenFetcher for HttpFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_token(&self) -> Result<Credential> {
        let req_cfg = &self.cfg.request;
        let mut request = self.client.request(req_cfg.method.clone(), &req_cfg.url);

        // Build headers dynamically
        if let Some(headers) = &req_cfg.headers {
            for (key, v) in headers {
                request = request.header(key, resolve_value(v).await?);
            }
        }
        if let Some(body) = &req_cfg.body {
            request = request.json(&resolve_map(body).await?);
        }
        if let Some(form) = &req_cfg.form {
            request = request.form(&resolve_map(form).await?);
        }

        debug!(fetcher = %self.name, url = %req_cfg.url, "requesting token");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "token endpoint responded {} ({:?})",
                status,
                ApiErrorKind::from_status(status)
            ));
        }
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(parse_credential(&headers, &body, &self.cfg.parse, now_ms()).await)
    }
}
