use chrono::{DateTime, Utc};

/// A token paired with its expiration instant (milliseconds since epoch).
///
/// `token: None` means no credential was obtained. `expires_at_ms: None` means
/// the expiration is unknown, which is treated as already expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: Option<String>,
    pub expires_at_ms: Option<i64>,
}

impl Credential {
    pub fn new(token: String, expires_at_ms: i64) -> Self {
        Self { token: Some(token), expires_at_ms: Some(expires_at_ms) }
    }

    /// State of a cache that has never fetched.
    pub fn empty() -> Self {
        Self { token: None, expires_at_ms: Some(0) }
    }

    /// Record returned by a fetcher that could not obtain a token.
    pub fn missing() -> Self {
        Self { token: None, expires_at_ms: None }
    }

    pub fn is_stale(&self, now_ms: i64) -> bool {
        match self.expires_at_ms {
            Some(expires_at_ms) => now_ms >= expires_at_ms,
            None => true,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at_ms.and_then(DateTime::from_timestamp_millis)
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::empty()
    }
}
