use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::cache::token_cache::TokenCache;
use crate::errors::CacheError;
use crate::fetcher::FetcherKind;
use crate::server::server::AppState;

pub type SharedCache = Arc<TokenCache<FetcherKind>>;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at_ms: Option<i64>,
}

#[derive(Clone)]
pub struct TokenState {
    pub cache: SharedCache,
}

impl TokenState {
    pub fn new(cache: SharedCache) -> Self {
        Self { cache }
    }

    pub fn router(&self, path: &str) -> Router<AppState> {
        Router::new().route(path, get(handle_token_request))
    }
}

async fn handle_token_request(State(state): State<AppState>) -> Response {
    let served = state.token_state.cache.get_credential().await.and_then(|credential| {
        let expires_at_ms = credential.expires_at_ms;
        credential
            .token
            .map(|token| TokenResponse { token, expires_at_ms })
            .ok_or(CacheError::TokenUnavailable)
    });

    match served {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            warn!(error = %e, "token request failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}
