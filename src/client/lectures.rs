use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::authorized::AuthorizedClient;
use crate::errors::ApiError;
use crate::fetcher::TokenFetcher;
use crate::helpers::time::{Clock, SystemClock};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
}

/// Typed access to the lectures endpoints.
pub struct LecturesApi<F, C = SystemClock> {
    client: AuthorizedClient<F, C>,
}

impl<F: TokenFetcher, C: Clock> LecturesApi<F, C> {
    pub fn new(client: AuthorizedClient<F, C>) -> Self {
        Self { client }
    }

    pub async fn list_lectures(&self) -> Result<Vec<Lecture>, ApiError> {
        self.client.get_json("/lectures").await
    }

    pub async fn get_lecture(&self, id: &str) -> Result<Lecture, ApiError> {
        let segment = path_segment(id)?;
        self.client.get_json(&format!("/lectures/{}", segment)).await
    }
}

/// Encode `raw` as a single path segment; dot segments would be resolved away by the URL parser.
fn path_segment(raw: &str) -> Result<String, ApiError> {
    if raw.is_empty() || raw == "." || raw == ".." {
        return Err(ApiError::InvalidPath(raw.to_owned()));
    }
    Ok(urlencoding::encode(raw).into_owned())
}
