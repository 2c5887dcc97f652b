use http::StatusCode;
use serde::Deserialize;

/// Identity authority error codes, as returned in `{"error": {"message": CODE}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorKind {
    UserNotFound,
    InvalidCredentials,
    UserDisabled,
    TooManyRequests,
    EmailInUse,
    WeakPassword,
    InvalidEmail,
    SessionExpired,
    Unknown(String),
}

impl AuthErrorKind {
    /// Map a raw code. Codes may carry a `" : detail"` suffix which is ignored.
    pub fn from_code(raw: &str) -> Self {
        let code = raw.split(':').next().unwrap_or_default().trim();
        match code {
            "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => AuthErrorKind::UserNotFound,
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthErrorKind::InvalidCredentials,
            "USER_DISABLED" => AuthErrorKind::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthErrorKind::TooManyRequests,
            "EMAIL_EXISTS" => AuthErrorKind::EmailInUse,
            "INVALID_EMAIL" => AuthErrorKind::InvalidEmail,
            "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "INVALID_ID_TOKEN" => AuthErrorKind::SessionExpired,
            c if c.starts_with("WEAK_PASSWORD") => AuthErrorKind::WeakPassword,
            c => AuthErrorKind::Unknown(c.to_owned()),
        }
    }

    /// Extract and map the code from an error response body. `None` when the
    /// body does not carry one.
    pub fn from_body(body: &str) -> Option<Self> {
        #[derive(Deserialize)]
        struct Envelope {
            error: ErrorBody,
        }
        #[derive(Deserialize)]
        struct ErrorBody {
            message: String,
        }

        serde_json::from_str::<Envelope>(body)
            .ok()
            .map(|envelope| Self::from_code(&envelope.error.message))
    }

    /// Whether signing in again from scratch can recover.
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, AuthErrorKind::SessionExpired | AuthErrorKind::UserNotFound)
    }
}

/// JSON API status classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Timeout,
    Conflict,
    TooManyRequests,
    Server,
    Unexpected(u16),
}

impl ApiErrorKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => ApiErrorKind::BadRequest,
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            408 | 504 => ApiErrorKind::Timeout,
            409 => ApiErrorKind::Conflict,
            429 => ApiErrorKind::TooManyRequests,
            500..=599 => ApiErrorKind::Server,
            other => ApiErrorKind::Unexpected(other),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiErrorKind::Timeout | ApiErrorKind::TooManyRequests | ApiErrorKind::Server
        )
    }
}
