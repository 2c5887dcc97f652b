use anyhow::Result;
use http::StatusCode;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::json;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::credential::Credential;
use crate::config::fetcher::PasswordFetcherConfig;
use crate::errors::AuthErrorKind;
use crate::fetcher::values::resolve_value;
use crate::fetcher::TokenFetcher;
use crate::helpers::time::now_ms;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("identity authority rejected the request: {0:?}")]
    Rejected(AuthErrorKind),

    #[error("identity authority responded {0}")]
    Status(StatusCode),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("invalid identity response: {0}")]
    Decode(String),

    #[error("credential source: {0}")]
    Config(String),
}

/// Email/password sign-in, renewed through the refresh token it hands back.
///
/// The first fetch signs in; later fetches exchange the refresh token. A
/// refresh token the authority no longer accepts falls back to one sign-in.
pub struct PasswordFetcher {
    pub name: String,
    pub cfg: PasswordFetcherConfig,
    client: Client,
    refresh_token: Mutex<Option<String>>,
}

#[derive(Deserialize)]
struct SignInResponse {
    #[serde(rename = "idToken")]
    id_token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
    #[serde(rename = "expiresIn", deserialize_with = "seconds")]
    expires_in: i64,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(deserialize_with = "seconds")]
    expires_in: i64,
}

/// The authority encodes durations as strings (`"3600"`); accept numbers too.
fn seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(i64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Number(n) => Ok(n),
        Seconds::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl std::fmt::Debug for PasswordFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordFetcher")
            .field("name", &self.name)
            .field("sign_in_url", &self.cfg.sign_in_url)
            .field("refresh_url", &self.cfg.refresh_url)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl PasswordFetcher {
    pub fn new(name: String, cfg: PasswordFetcherConfig, client: Client) -> Self {
        Self { name, cfg, client, refresh_token: Mutex::new(None) }
    }

    /// Whether a refresh token is held for the next renewal.
    pub async fn has_session(&self) -> bool {
        self.refresh_token.lock().await.is_some()
    }

    pub async fn sign_out(&self) {
        *self.refresh_token.lock().await = None;
    }

    async fn sign_in(&self) -> Result<Credential, IdentityError> {
        let email = resolve_value(&self.cfg.email).await.map_err(|e| IdentityError::Config(e.to_string()))?;
        let password = resolve_value(&self.cfg.password).await.map_err(|e| IdentityError::Config(e.to_string()))?;

        debug!(fetcher = %self.name, "signing in with email and password");
        let response = self
            .client
            .post(&self.cfg.sign_in_url)
            .json(&json!({ "email": email, "password": password, "returnSecureToken": true }))
            .send()
            .await?;
        let body: SignInResponse = read_json(response).await?;

        *self.refresh_token.lock().await = Some(body.refresh_token);
        info!(fetcher = %self.name, "signed in");
        Ok(Credential::new(body.id_token, expires_at(body.expires_in)))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Credential, IdentityError> {
        debug!(fetcher = %self.name, "renewing token with refresh token");
        let response = self
            .client
            .post(&self.cfg.refresh_url)
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await?;
        let body: RefreshResponse = read_json(response).await?;

        *self.refresh_token.lock().await = Some(body.refresh_token);
        Ok(Credential::new(body.id_token, expires_at(body.expires_in)))
    }
}

impl TokenFetcher for PasswordFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_token(&self) -> Result<Credential> {
        let stored = self.refresh_token.lock().await.clone();

        if let Some(refresh_token) = stored {
            match self.refresh(&refresh_token).await {
                Ok(credential) => return Ok(credential),
                Err(IdentityError::Rejected(kind)) if kind.requires_sign_in() => {
                    warn!(fetcher = %self.name, reason = ?kind, "refresh token rejected, signing in again");
                    self.sign_out().await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(self.sign_in().await?)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, IdentityError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(match AuthErrorKind::from_body(&text) {
            Some(kind) => IdentityError::Rejected(kind),
            None => IdentityError::Status(status),
        });
    }
    serde_json::from_str(&text).map_err(|e| IdentityError::Decode(e.to_string()))
}

fn expires_at(expires_in_secs: i64) -> i64 {
    now_ms().saturating_add(expires_in_secs.saturating_mul(1000))
}
